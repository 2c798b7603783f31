use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::ObserverError;

use super::types::CommandSpec;

pub type BoxedReader = Box<dyn AsyncRead + Unpin + Send>;

/// A running child whose output pipes can be taken once.
#[async_trait]
pub trait ChildSession: Send {
    fn id(&self) -> Option<u32>;
    fn stdout(&mut self) -> Option<BoxedReader>;
    fn stderr(&mut self) -> Option<BoxedReader>;
    /// Non-blocking exit check. `Some(code)` once the child is gone.
    fn try_wait(&mut self) -> anyhow::Result<Option<i32>>;
    async fn kill(&mut self) -> anyhow::Result<()>;
    async fn wait(&mut self) -> anyhow::Result<i32>;
}

pub trait Spawner: Send + Sync {
    fn name(&self) -> &str;
    fn spawn(&self, spec: &CommandSpec) -> Result<Box<dyn ChildSession>, ObserverError>;
}
