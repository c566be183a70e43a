#![deny(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! Bootstrap plumbing shared by the clibones binaries.

pub mod common;
pub use common::*;
