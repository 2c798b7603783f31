use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use super::types::OutputRecord;

/// Unbounded FIFO shared between the stream readers and the consumer.
#[derive(Default)]
pub struct OutputSink {
    queue: Mutex<VecDeque<OutputRecord>>,
    notify: Notify,
}

impl OutputSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<OutputRecord>> {
        // A reader panicking mid-push cannot leave the deque half-written.
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn put(&self, record: OutputRecord) {
        self.lock().push_back(record);
        self.notify.notify_one();
    }

    fn pop(&self) -> Option<OutputRecord> {
        self.lock().pop_front()
    }

    /// Wait up to `timeout` for the oldest record. `None` means nothing arrived in time.
    pub async fn get(&self, timeout: Duration) -> Option<OutputRecord> {
        let deadline = Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(record) = self.pop() {
                return Some(record);
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.pop();
            }
        }
    }

    pub fn try_get(&self) -> Option<OutputRecord> {
        self.pop()
    }

    /// Racy by nature; only a hint.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Take everything queued right now, oldest first.
    pub fn drain(&self) -> Vec<OutputRecord> {
        self.lock().drain(..).collect()
    }
}
