use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::error::ObserverError;

use super::traits::{BoxedReader, ChildSession, Spawner};
use super::types::CommandSpec;

/// Spawns real OS processes through `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    fn name(&self) -> &str {
        "process"
    }

    fn spawn(&self, spec: &CommandSpec) -> Result<Box<dyn ChildSession>, ObserverError> {
        let mut cmd = Command::new(&spec.cmd);
        cmd.args(&spec.args)
            .envs(&spec.envs)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|source| ObserverError::Spawn {
            command: spec.to_string(),
            source,
        })?;
        Ok(Box::new(ProcessSession { child }))
    }
}

struct ProcessSession {
    child: Child,
}

#[async_trait]
impl ChildSession for ProcessSession {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn stdout(&mut self) -> Option<BoxedReader> {
        self.child
            .stdout
            .take()
            .map(|s| Box::new(s) as BoxedReader)
    }

    fn stderr(&mut self) -> Option<BoxedReader> {
        self.child
            .stderr
            .take()
            .map(|s| Box::new(s) as BoxedReader)
    }

    fn try_wait(&mut self) -> anyhow::Result<Option<i32>> {
        Ok(self.child.try_wait()?.map(|s| s.code().unwrap_or(-1)))
    }

    async fn kill(&mut self) -> anyhow::Result<()> {
        // start_kill + wait so the zombie is reaped; already-exited is not an error.
        match self.child.start_kill() {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => {}
            Err(e) => return Err(e.into()),
        }
        self.child.wait().await?;
        Ok(())
    }

    async fn wait(&mut self) -> anyhow::Result<i32> {
        let status = self.child.wait().await?;
        Ok(status.code().unwrap_or(-1))
    }
}
