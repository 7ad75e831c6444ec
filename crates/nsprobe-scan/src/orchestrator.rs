//! Drives discovery, probing and reporting for one scan.

use std::collections::HashSet;
use std::time::Instant;

use tracing::info;

use nsprobe_core::path;
use nsprobe_core::{ObjectNamespace, ScanConfig, SecurityContext};

use crate::probe::AccessProbe;
use crate::report::{ReportSection, ScanReport, NAMESPACE_ONLY_TITLE};
use crate::symlinks::SymlinkIndex;
use crate::walker::NamespaceWalker;

/// Devices that granted access, by path form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessSets {
    /// Devices opened through their direct path.
    pub direct: Vec<String>,
    /// Devices opened with the suffix component appended.
    pub namespace: Vec<String>,
}

impl AccessSets {
    /// Devices reachable through the namespace but not directly,
    /// compared case-insensitively, in namespace order.
    pub fn namespace_only(&self) -> Vec<String> {
        let direct: HashSet<String> = self.direct.iter().map(|p| path::normalize(p)).collect();
        self.namespace
            .iter()
            .filter(|p| !direct.contains(&path::normalize(p)))
            .cloned()
            .collect()
    }
}

/// Runs a complete scan over a namespace under a security context.
pub struct ScanOrchestrator<'a, N: ?Sized, S: ?Sized> {
    namespace: &'a N,
    context: &'a S,
    config: &'a ScanConfig,
}

impl<'a, N, S> ScanOrchestrator<'a, N, S>
where
    N: ObjectNamespace + ?Sized,
    S: SecurityContext + ?Sized,
{
    /// Create an orchestrator.
    pub fn new(namespace: &'a N, context: &'a S, config: &'a ScanConfig) -> Self {
        Self {
            namespace,
            context,
            config,
        }
    }

    /// Discover devices below `seeds`, probe them and build the report.
    pub fn run<T: AsRef<str>>(&self, seeds: &[T]) -> ScanReport {
        let start = Instant::now();
        let discovery = NamespaceWalker::new(self.namespace, self.config).discover_devices(seeds);
        let mut warnings = discovery.warnings;

        if discovery.devices.is_empty() {
            info!("no device names found");
            return ScanReport {
                warnings,
                ..ScanReport::default()
            };
        }

        let probe = AccessProbe::new(self.namespace, self.context, self.config);
        let mut sets = AccessSets::default();

        for device in &discovery.devices {
            let direct = probe.probe(device);
            warnings.extend(direct.warning(device, self.config.show_errors));
            if direct.is_granted() {
                sets.direct.push(device.clone());
            }

            let suffixed = path::with_suffix(device, &self.config.suffix);
            let namespace = probe.probe(&suffixed);
            warnings.extend(namespace.warning(&suffixed, self.config.show_errors));
            if namespace.is_granted() {
                sets.namespace.push(device.clone());
            }
        }

        let symlinks = SymlinkIndex::new(self.namespace).build();
        let display = self.config.map_symlinks.then_some(&symlinks);

        let sections = if self.config.filter_namespace_only {
            vec![ReportSection::new(
                NAMESPACE_ONLY_TITLE,
                &sets.namespace_only(),
                display,
            )]
        } else {
            vec![
                ReportSection::new(self.config.direct_label(), &sets.direct, display),
                ReportSection::new(self.config.namespace_label(), &sets.namespace, display),
            ]
        };

        info!(
            devices = discovery.devices.len(),
            direct = sets.direct.len(),
            namespace = sets.namespace.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scan complete"
        );

        ScanReport {
            devices_scanned: discovery.devices.len(),
            sections,
            warnings,
        }
    }
}
