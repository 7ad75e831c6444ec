//! nsprobe - Audit device object access in the NT object manager namespace.
//!
//! Usage:
//!   nsprobe [NAMES...]                 Probe devices in the named directories
//!   nsprobe -r \Device                 Recurse into sub-directories
//!   nsprobe -p 1234 --readonly \Device Probe read access as process 1234
//!   nsprobe --filter-namespace-only    Only show namespace-only access
//!   nsprobe --help                     Show help

use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};

use nsprobe_scan::{
    AccessIntent, DEFAULT_SUFFIX, ImpersonationLevel, OpenMode, ScanConfig, ScanError, ScanReport,
    merge_seed_names,
};

#[derive(Parser)]
#[command(
    name = "nsprobe",
    version,
    about = "Audit which device objects can be opened by a security identity",
    long_about = "nsprobe opens every device found in the given object directories twice: \
                  once through its direct path and once with an extra trailing path \
                  component. Devices whose access differs between the two forms are \
                  reported.\n\n\
                  NAMES may be object directories (e.g. \\Device) or device paths."
)]
struct Cli {
    /// Object directories or device paths to check
    names: Vec<String>,

    /// Recurse into sub-directories
    #[arg(short, long)]
    recursive: bool,

    /// Show the symbolic link that points at each device
    #[arg(short = 'l', long)]
    map_symlinks: bool,

    /// Impersonate the token of this process
    #[arg(short, long)]
    pid: Option<u32>,

    /// Trailing component appended for the namespace probe
    #[arg(long, default_value = DEFAULT_SUFFIX)]
    suffix: String,

    /// Read additional names from a file, one per line
    #[arg(long, value_name = "FILE")]
    namelist: Option<PathBuf>,

    /// Print unexpected open failures
    #[arg(long)]
    show_errors: bool,

    /// Impersonate at identification level only
    #[arg(long)]
    identify_only: bool,

    /// Open devices with directory semantics
    #[arg(long)]
    open_as_directory: bool,

    /// Only report devices accessible through the namespace but not directly
    #[arg(long)]
    filter_namespace_only: bool,

    /// Check read access instead of read/write access
    #[arg(long)]
    readonly: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    /// Build the scan configuration from the parsed options.
    fn scan_config(&self) -> Result<ScanConfig, ScanError> {
        ScanConfig::builder()
            .recursive(self.recursive)
            .map_symlinks(self.map_symlinks)
            .pid(self.pid)
            .suffix(self.suffix.clone())
            .show_errors(self.show_errors)
            .filter_namespace_only(self.filter_namespace_only)
            .impersonation_level(if self.identify_only {
                ImpersonationLevel::Identification
            } else {
                ImpersonationLevel::Impersonation
            })
            .open_mode(if self.open_as_directory {
                OpenMode::Directory
            } else {
                OpenMode::File
            })
            .access(if self.readonly {
                AccessIntent::Read
            } else {
                AccessIntent::ReadWrite
            })
            .build()
            .map_err(|e| ScanError::InvalidConfig {
                message: e.to_string(),
            })
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nsprobe=warn".parse()?),
        )
        .init();

    // Failures are reported to the user but never change the exit status
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            println!("{err}");
            return Ok(());
        }
    };

    if let Err(err) = run(cli) {
        println!("{err:#}");
    }

    Ok(())
}

/// Seed names from the command line and the name list, or `None` when
/// there is nothing to scan.
fn seed_names(cli: &Cli) -> Result<Option<Vec<String>>> {
    let names = merge_seed_names(cli.names.clone(), cli.namelist.as_deref())?;
    Ok((!names.is_empty()).then_some(names))
}

fn run(cli: Cli) -> Result<()> {
    let Some(names) = seed_names(&cli)? else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = cli.scan_config()?;
    tracing::debug!(seeds = names.len(), ?config, "starting scan");
    let report = scan(&names, &config)?;

    for warning in &report.warnings {
        eprintln!("{warning}");
    }

    match cli.format {
        OutputFormat::Text => println!("{report}"),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).context("Cannot serialize report")?);
        }
    }

    Ok(())
}

/// Scan the live object namespace.
#[cfg(windows)]
fn scan(names: &[String], config: &ScanConfig) -> Result<ScanReport> {
    use nsprobe_nt::{NtNamespace, TokenContext};
    use nsprobe_scan::ScanOrchestrator;

    let context = TokenContext::open(config.pid, config.impersonation_level).map_err(ScanError::from)?;
    let namespace = NtNamespace::new();

    Ok(ScanOrchestrator::new(&namespace, &context, config).run(names))
}

#[cfg(not(windows))]
fn scan(_names: &[String], _config: &ScanConfig) -> Result<ScanReport> {
    Err(ScanError::from(nsprobe_nt::NtError::Unsupported).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_no_names_shows_help() {
        let cli = Cli::try_parse_from(["nsprobe", "-r", "--readonly"]).unwrap();
        assert!(seed_names(&cli).unwrap().is_none());

        // Nothing is scanned, so even an unsupported platform succeeds
        assert!(run(cli).is_ok());
    }

    #[test]
    fn test_blank_namelist_shows_help() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# nothing here").unwrap();
        writeln!(file).unwrap();
        let path = file.path().to_str().unwrap();

        let cli = Cli::try_parse_from(["nsprobe", "--namelist", path]).unwrap();
        assert!(seed_names(&cli).unwrap().is_none());
    }

    #[test]
    fn test_namelist_only_invocation() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "\\Device").unwrap();
        writeln!(file, "\\GLOBAL??").unwrap();
        let path = file.path().to_str().unwrap();

        let cli = Cli::try_parse_from(["nsprobe", "--namelist", path]).unwrap();
        assert_eq!(
            seed_names(&cli).unwrap(),
            Some(vec!["\\Device".to_string(), "\\GLOBAL??".to_string()])
        );
    }

    #[test]
    fn test_flags_map_to_config() {
        let cli = Cli::try_parse_from([
            "nsprobe",
            "--readonly",
            "--identify-only",
            "--open-as-directory",
            "--suffix",
            "abc",
            "\\Device",
        ])
        .unwrap();
        let config = cli.scan_config().unwrap();

        assert_eq!(config.access, AccessIntent::Read);
        assert_eq!(config.impersonation_level, ImpersonationLevel::Identification);
        assert_eq!(config.open_mode, OpenMode::Directory);
        assert_eq!(config.suffix, "abc");
    }

    #[test]
    fn test_bad_suffix_is_config_error() {
        let cli = Cli::try_parse_from(["nsprobe", "--suffix", "a\\b", "\\Device"]).unwrap();
        assert!(matches!(cli.scan_config(), Err(ScanError::InvalidConfig { .. })));
    }
}
