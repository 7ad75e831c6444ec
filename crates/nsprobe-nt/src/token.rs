//! Process token impersonation.

use std::marker::PhantomData;

use tracing::{debug, warn};
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::Security::{
    DuplicateTokenEx, ImpersonateLoggedOnUser, RevertToSelf, SecurityIdentification,
    SecurityImpersonation, TokenImpersonation, SECURITY_IMPERSONATION_LEVEL, TOKEN_DUPLICATE,
    TOKEN_IMPERSONATE, TOKEN_QUERY,
};
use windows::Win32::System::Threading::{
    GetCurrentProcess, OpenProcess, OpenProcessToken, PROCESS_QUERY_LIMITED_INFORMATION,
};

use nsprobe_core::{ImpersonationLevel, ObjectError, SecurityContext};

use crate::error::NtError;

fn token_error(operation: &'static str) -> impl FnOnce(windows::core::Error) -> NtError {
    move |err| NtError::Token {
        operation,
        message: err.to_string(),
    }
}

fn native_level(level: ImpersonationLevel) -> SECURITY_IMPERSONATION_LEVEL {
    match level {
        ImpersonationLevel::Identification => SecurityIdentification,
        ImpersonationLevel::Impersonation => SecurityImpersonation,
    }
}

/// An impersonation token duplicated from a process.
#[derive(Debug)]
pub struct TokenContext {
    token: HANDLE,
}

impl TokenContext {
    /// Duplicate the primary token of `pid` (or of the current process)
    /// as an impersonation token at `level`.
    pub fn open(pid: Option<u32>, level: ImpersonationLevel) -> Result<Self, NtError> {
        unsafe {
            let process = match pid {
                Some(pid) => OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid)
                    .map_err(token_error("OpenProcess"))?,
                None => GetCurrentProcess(),
            };

            let mut primary = HANDLE::default();
            let opened = OpenProcessToken(process, TOKEN_DUPLICATE | TOKEN_QUERY, &mut primary);
            if pid.is_some() {
                let _ = CloseHandle(process);
            }
            opened.map_err(token_error("OpenProcessToken"))?;

            let mut token = HANDLE::default();
            let duplicated = DuplicateTokenEx(
                primary,
                TOKEN_IMPERSONATE | TOKEN_QUERY,
                None,
                native_level(level),
                TokenImpersonation,
                &mut token,
            );
            let _ = CloseHandle(primary);
            duplicated.map_err(token_error("DuplicateTokenEx"))?;

            debug!(?pid, %level, "prepared impersonation token");
            Ok(Self { token })
        }
    }
}

impl Drop for TokenContext {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.token);
        }
    }
}

/// Reverts the current thread to its own identity when dropped.
#[derive(Debug)]
pub struct TokenGuard<'a> {
    _context: PhantomData<&'a TokenContext>,
}

impl Drop for TokenGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = unsafe { RevertToSelf() } {
            warn!(%err, "cannot revert impersonation, thread keeps the probing token");
        }
    }
}

impl SecurityContext for TokenContext {
    type Guard<'a> = TokenGuard<'a>;

    fn impersonate(&self) -> Result<Self::Guard<'_>, ObjectError> {
        unsafe { ImpersonateLoggedOnUser(self.token) }
            .map_err(|err| ObjectError::failed("", format!("ImpersonateLoggedOnUser failed: {err}")))?;
        Ok(TokenGuard {
            _context: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use windows::Win32::System::Threading::{GetCurrentThread, OpenThreadToken};

    fn thread_is_impersonating() -> bool {
        let mut token = HANDLE::default();
        let opened = unsafe { OpenThreadToken(GetCurrentThread(), TOKEN_QUERY, true, &mut token) };
        if opened.is_ok() {
            unsafe {
                let _ = CloseHandle(token);
            }
        }
        opened.is_ok()
    }

    #[test]
    fn test_guard_reverts_on_drop() {
        let context = TokenContext::open(None, ImpersonationLevel::Impersonation).unwrap();
        assert!(!thread_is_impersonating());

        {
            let _guard = context.impersonate().unwrap();
            assert!(thread_is_impersonating());
        }

        assert!(!thread_is_impersonating());
    }

    #[test]
    fn test_open_unknown_process_fails() {
        let err = TokenContext::open(Some(u32::MAX - 2), ImpersonationLevel::Identification).unwrap_err();
        assert!(matches!(err, NtError::Token { operation: "OpenProcess", .. }));
    }
}
