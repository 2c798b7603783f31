use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::ObserverConfig;
use crate::error::ObserverError;

use super::io_pump;
use super::session::ProcessSpawner;
use super::sink::OutputSink;
use super::traits::{ChildSession, Spawner};
use super::types::{CommandSpec, OutputRecord};

type ReaderHandle = JoinHandle<Result<u64, ObserverError>>;

/// Per-run state; present only between `start` and `stop`.
struct ActiveRun {
    session: Box<dyn ChildSession>,
    cancel_tx: watch::Sender<bool>,
    readers: Vec<ReaderHandle>,
}

/// Launches a command and exposes its stdout/stderr lines as timestamped records.
///
/// `start` must be called from within a tokio runtime. Records stay in the
/// sink across `stop`/`start` cycles unless `clear_on_start` is configured.
pub struct Observer {
    command: CommandSpec,
    config: ObserverConfig,
    spawner: Arc<dyn Spawner>,
    sink: Arc<OutputSink>,
    active: Option<ActiveRun>,
    last_exit: Option<i32>,
}

impl Observer {
    pub fn new(command: CommandSpec) -> Self {
        Self::with_config(command, ObserverConfig::default())
    }

    pub fn with_config(command: CommandSpec, config: ObserverConfig) -> Self {
        Self::with_spawner(command, config, Arc::new(ProcessSpawner))
    }

    pub fn with_spawner(
        command: CommandSpec,
        config: ObserverConfig,
        spawner: Arc<dyn Spawner>,
    ) -> Self {
        Self {
            command,
            config,
            spawner,
            sink: OutputSink::new(),
            active: None,
            last_exit: None,
        }
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    /// Shared handle so another task can consume records while this one supervises.
    pub fn sink(&self) -> Arc<OutputSink> {
        self.sink.clone()
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.sink.is_empty()
    }

    pub async fn get(&self, timeout: Duration) -> Option<OutputRecord> {
        self.sink.get(timeout).await
    }

    pub async fn get_default(&self) -> Option<OutputRecord> {
        self.sink.get(self.config.poll_timeout()).await
    }

    /// Spawn the child and both stream readers. Returns without waiting for the child.
    pub fn start(&mut self) -> Result<(), ObserverError> {
        if self.active.is_some() {
            return Err(ObserverError::AlreadyRunning(self.command.to_string()));
        }
        if self.config.clear_on_start {
            self.sink.clear();
        }

        let mut session = self.spawner.spawn(&self.command)?;
        let (stdout, stderr) = match (session.stdout(), session.stderr()) {
            (Some(out), Some(err)) => (out, err),
            (out, _) => {
                let missing = if out.is_none() { "stdout" } else { "stderr" };
                // kill_on_drop reaps whatever was started
                drop(session);
                return Err(ObserverError::MissingPipe(missing));
            }
        };

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let readers = vec![
            io_pump::pump_stdout(stdout, self.sink.clone(), cancel_rx.clone()),
            io_pump::pump_stderr(stderr, self.sink.clone(), cancel_rx),
        ];

        tracing::info!(
            stage = "observer.start",
            spawner = self.spawner.name(),
            pid = ?session.id(),
            command = %self.command,
            "observer started"
        );
        self.last_exit = None;
        self.active = Some(ActiveRun {
            session,
            cancel_tx,
            readers,
        });
        Ok(())
    }

    /// Cancel the readers, wait for them, then kill the child if it is still alive.
    /// Calling it on a stopped observer does nothing.
    pub async fn stop(&mut self) {
        let Some(mut run) = self.active.take() else {
            return;
        };

        let _ = run.cancel_tx.send(true);
        join_readers(&mut run.readers, self.config.stop_timeout()).await;

        let code = match run.session.try_wait() {
            Ok(Some(code)) => Some(code),
            Ok(None) => {
                tracing::debug!(stage = "observer.stop", pid = ?run.session.id(), "killing child");
                match run.session.kill().await {
                    Ok(()) => run.session.try_wait().ok().flatten(),
                    Err(e) => {
                        tracing::warn!(stage = "observer.stop", error = %e, "kill failed");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(stage = "observer.stop", error = %e, "exit check failed");
                None
            }
        };

        tracing::info!(stage = "observer.stop", command = %self.command, exit_code = ?code, "observer stopped");
        self.last_exit = code;
    }

    /// Whether the child has exited on its own. Does not stop the readers.
    pub fn has_exited(&mut self) -> bool {
        let Some(run) = self.active.as_mut() else {
            return true;
        };
        match run.session.try_wait() {
            Ok(Some(code)) => {
                self.last_exit = Some(code);
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "exit check failed");
                false
            }
        }
    }

    /// Whether the child has exited and both readers reached end of stream.
    pub fn is_finished(&mut self) -> bool {
        let drained = self
            .active
            .as_ref()
            .map_or(true, |run| run.readers.iter().all(JoinHandle::is_finished));
        drained && self.has_exited()
    }

    /// Exit code of the child, once known.
    pub fn exit_code(&self) -> Option<i32> {
        self.last_exit
    }
}

async fn join_readers(readers: &mut Vec<ReaderHandle>, limit: Duration) {
    let joined = tokio::time::timeout(limit, futures::future::join_all(readers.iter_mut())).await;
    match joined {
        Ok(results) => {
            for res in results {
                match res {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => tracing::warn!(error = %e, "reader ended with error"),
                    Err(e) => tracing::warn!(error = %e, "reader task failed"),
                }
            }
        }
        Err(_) => {
            tracing::warn!(timeout_ms = limit.as_millis() as u64, "readers did not stop in time, aborting");
            for handle in readers.iter() {
                handle.abort();
            }
        }
    }
    readers.clear();
}

impl Drop for Observer {
    fn drop(&mut self) {
        if let Some(run) = self.active.take() {
            let _ = run.cancel_tx.send(true);
            for handle in &run.readers {
                handle.abort();
            }
        }
    }
}
