//! Probes servers for the TLS protocol versions they will negotiate.
#[cfg(feature = "cli")]
pub mod cli;
pub mod engine;
pub mod input;
pub mod model;
pub mod output;
pub mod probe;
pub mod util;

pub use engine::{scan, Scanner};
