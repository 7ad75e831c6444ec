//! Access probing of individual device paths.

use serde::Serialize;
use tracing::debug;

use nsprobe_core::{ObjectNamespace, ScanConfig, ScanWarning, SecurityContext};

/// Classified result of one open attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ProbeOutcome {
    /// The object was opened with the requested access.
    Granted,
    /// The open was refused by the access check, or the object has no
    /// create handler. Never reported.
    ExpectedDenial,
    /// The open failed for any other reason.
    UnexpectedFailure(String),
}

impl ProbeOutcome {
    /// Check if access was granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, ProbeOutcome::Granted)
    }

    /// Diagnostic for this outcome, if it should be reported.
    pub fn warning(&self, path: &str, show_errors: bool) -> Option<ScanWarning> {
        match self {
            ProbeOutcome::UnexpectedFailure(message) if show_errors => {
                Some(ScanWarning::probe(path, message.clone()))
            }
            _ => None,
        }
    }
}

/// Opens candidate paths under a security context.
pub struct AccessProbe<'a, N: ?Sized, S: ?Sized> {
    namespace: &'a N,
    context: &'a S,
    config: &'a ScanConfig,
}

impl<'a, N, S> AccessProbe<'a, N, S>
where
    N: ObjectNamespace + ?Sized,
    S: SecurityContext + ?Sized,
{
    /// Create a probe.
    pub fn new(namespace: &'a N, context: &'a S, config: &'a ScanConfig) -> Self {
        Self {
            namespace,
            context,
            config,
        }
    }

    /// Try to open `path` with the configured access and open mode.
    ///
    /// The security context is held only for the open call and is
    /// released before this returns, whether or not the open succeeded.
    pub fn probe(&self, path: &str) -> ProbeOutcome {
        let result = self.context.impersonate().and_then(|_guard| {
            self.namespace
                .open_object(path, self.config.access, self.config.open_mode)
        });

        let outcome = match result {
            Ok(()) => ProbeOutcome::Granted,
            Err(err) if err.is_expected_denial() => ProbeOutcome::ExpectedDenial,
            Err(err) => ProbeOutcome::UnexpectedFailure(err.to_string()),
        };
        debug!(path, ?outcome, "probed");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryAccess, MemoryContext, MemoryNamespace};
    use nsprobe_core::WarningKind;

    fn namespace() -> MemoryNamespace {
        MemoryNamespace::new()
            .device("\\Device\\Open")
            .device_with("\\Device\\Denied", MemoryAccess::Denied, MemoryAccess::Denied)
            .device_with("\\Device\\NoHandler", MemoryAccess::NoHandler, MemoryAccess::NoHandler)
            .device_with(
                "\\Device\\Broken",
                MemoryAccess::Fail("STATUS_SHARING_VIOLATION".into()),
                MemoryAccess::Granted,
            )
    }

    #[test]
    fn test_classification() {
        let ns = namespace();
        let context = MemoryContext::new();
        let config = ScanConfig::default();
        let probe = AccessProbe::new(&ns, &context, &config);

        assert_eq!(probe.probe("\\Device\\Open"), ProbeOutcome::Granted);
        assert_eq!(probe.probe("\\Device\\Denied"), ProbeOutcome::ExpectedDenial);
        assert_eq!(probe.probe("\\Device\\NoHandler"), ProbeOutcome::ExpectedDenial);
        assert_eq!(
            probe.probe("\\Device\\Broken"),
            ProbeOutcome::UnexpectedFailure("STATUS_SHARING_VIOLATION".into())
        );
        assert!(probe.probe("\\Device\\Broken\\xyzzy").is_granted());
    }

    #[test]
    fn test_context_released_on_every_path() {
        let ns = namespace();
        let context = MemoryContext::new();
        let config = ScanConfig::default();
        let probe = AccessProbe::new(&ns, &context, &config);

        for path in ["\\Device\\Open", "\\Device\\Denied", "\\Device\\Broken", "\\Device\\Missing"] {
            probe.probe(path);
            assert_eq!(context.active(), 0);
        }
        assert_eq!(context.acquired(), 4);
    }

    #[test]
    fn test_impersonation_failure_is_unexpected() {
        let ns = namespace();
        let context = MemoryContext::failing();
        let config = ScanConfig::default();
        let probe = AccessProbe::new(&ns, &context, &config);

        let outcome = probe.probe("\\Device\\Open");
        assert!(matches!(outcome, ProbeOutcome::UnexpectedFailure(_)));
        // The object is never opened without the context
        assert!(ns.opens().is_empty());
    }

    #[test]
    fn test_warning_only_for_unexpected_failures() {
        let denied = ProbeOutcome::ExpectedDenial;
        assert!(denied.warning("\\Device\\A", true).is_none());
        assert!(denied.warning("\\Device\\A", false).is_none());

        let failed = ProbeOutcome::UnexpectedFailure("boom".into());
        assert!(failed.warning("\\Device\\A", false).is_none());
        let warning = failed.warning("\\Device\\A", true).unwrap();
        assert_eq!(warning.kind, WarningKind::Probe);
        assert_eq!(warning.path, "\\Device\\A");
    }
}
