//! Process output observer: spawn a command, drain stdout/stderr concurrently
//! and hand timestamped lines to a consumer through a timeout-based queue.

pub mod config;
pub mod error;
pub mod runner;
pub mod util;

pub use error::ObserverError;
pub use runner::{CommandSpec, LineStream, Observer, OutputRecord, OutputSink};
pub use util::ReString;
