//! NT object manager backend for nsprobe.
//!
//! On Windows this crate provides [`NtNamespace`], which implements the
//! namespace primitives with the native `ntdll` directory, symbolic link
//! and file APIs, and [`TokenContext`], which impersonates a process
//! token around each probe. Status code classification in [`status`] is
//! available on every platform.

mod error;
#[cfg_attr(not(windows), allow(dead_code))]
mod name;
pub mod status;

#[cfg(windows)]
mod namespace;
#[cfg(windows)]
mod ntdll;
#[cfg(windows)]
mod token;

pub use error::NtError;

#[cfg(windows)]
pub use namespace::NtNamespace;
#[cfg(windows)]
pub use token::{TokenContext, TokenGuard};
