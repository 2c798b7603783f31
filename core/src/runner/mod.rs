mod io_pump;
mod observer;
mod session;
mod sink;
mod traits;
pub mod types;

pub use io_pump::{pump_stderr, pump_stdout};
pub use observer::Observer;
pub use session::ProcessSpawner;
pub use sink::OutputSink;
pub use traits::{BoxedReader, ChildSession, Spawner};
pub use types::{CommandSpec, LineStream, OutputRecord};
