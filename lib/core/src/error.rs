//! Shared result type.
//!
//! Domain errors stay local to the crate that raises them (`GraphError`,
//! `PreviewError`, `TransportError`, ...). Fallible I/O paths wrap them in a
//! rootcause [`Report`] so the studio can print the whole chain.

use rootcause::Report;

/// Result whose error is a [`Report`] over context `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
