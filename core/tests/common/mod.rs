use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nekobend_core::{Observer, OutputRecord};

/// Pull records until `quiet` passes without a new one.
pub async fn drain_until_quiet(obs: &Observer, quiet: Duration) -> Vec<OutputRecord> {
    let mut out = Vec::new();
    while let Some(rec) = obs.get(quiet).await {
        out.push(rec);
    }
    out
}

/// Poll until the child exited and both readers hit EOF, then collect everything.
pub async fn run_to_completion(obs: &mut Observer) -> Vec<OutputRecord> {
    let mut out = Vec::new();
    for _ in 0..200 {
        while let Some(rec) = obs.get(Duration::from_millis(10)).await {
            out.push(rec);
        }
        if obs.is_finished() {
            break;
        }
    }
    out.extend(obs.sink().drain());
    obs.stop().await;
    out
}

/// `tracing` writer that keeps everything in memory for assertions.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
