//! Logtally Common - Shared metrics types and access-log parsing

pub mod metrics;
pub mod parse;

pub use metrics::*;
pub use parse::*;
