//! vs-core: shared foundation for vortstream.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)
//! - timing (opt-in wall-clock accounting for the hot paths)

pub mod error;
pub mod numeric;
pub mod timing;

pub use error::{VsError, VsResult};
pub use numeric::*;
