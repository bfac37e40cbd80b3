//! Compression-side helpers
//!
//! Codecs live elsewhere; this module only finds the sparse regions a codec
//! can skip instead of storing literal zeros.

pub mod holes;

pub use holes::{summarize, HoleEvent, HoleSummary, HolesFinder};
