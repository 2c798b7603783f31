use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ObserverError;

use super::sink::OutputSink;
use super::types::{LineStream, OutputRecord};

pub fn pump_stdout<R>(
    rd: R,
    sink: Arc<OutputSink>,
    cancel: watch::Receiver<bool>,
) -> JoinHandle<Result<u64, ObserverError>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    pump(rd, sink, cancel, LineStream::Stdout)
}

/// Like [`pump_stdout`], but every captured line is also logged as a warning.
pub fn pump_stderr<R>(
    rd: R,
    sink: Arc<OutputSink>,
    cancel: watch::Receiver<bool>,
) -> JoinHandle<Result<u64, ObserverError>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    pump(rd, sink, cancel, LineStream::Stderr)
}

fn pump<R>(
    mut rd: R,
    sink: Arc<OutputSink>,
    mut cancel: watch::Receiver<bool>,
    stream: LineStream,
) -> JoinHandle<Result<u64, ObserverError>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; 16 * 1024];
        let mut line_buf: Vec<u8> = Vec::with_capacity(8 * 1024);
        let mut published = 0u64;

        loop {
            let read = tokio::select! {
                biased;
                // Sender dropped counts as cancelled too.
                _ = cancel.wait_for(|stop| *stop) => {
                    tracing::debug!(stream = stream.as_str(), "reader cancelled");
                    break;
                }
                read = rd.read(&mut buf) => read,
            };

            let n = match read {
                Ok(n) => n,
                Err(source) => {
                    return Err(ObserverError::StreamIo {
                        stream: stream.as_str(),
                        source,
                    });
                }
            };
            if n == 0 {
                break;
            }

            line_buf.extend_from_slice(&buf[..n]);
            while let Some(pos) = line_buf.iter().position(|&b| b == b'\n') {
                let one = line_buf.drain(..=pos).collect::<Vec<u8>>();
                if publish(&sink, stream, &one) {
                    published += 1;
                }
            }
        }

        // Deliver the last partial line if it doesn't end with '\n'.
        if !line_buf.is_empty() && publish(&sink, stream, &line_buf) {
            published += 1;
        }

        tracing::debug!(stream = stream.as_str(), lines = published, "reader finished");
        Ok(published)
    })
}

fn publish(sink: &OutputSink, stream: LineStream, raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(trim_newline(raw));
    if text.trim_end().is_empty() {
        return false;
    }

    let record = OutputRecord::new(stream, text.into_owned());
    if stream == LineStream::Stderr {
        tracing::warn!(stream = "stderr", "{}", record.text);
    }
    sink.put(record);
    true
}

fn trim_newline(mut buf: &[u8]) -> &[u8] {
    if let [rest @ .., b'\n'] = buf {
        buf = rest;
    }
    if let [rest @ .., b'\r'] = buf {
        buf = rest;
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn splits_lines_and_drops_blank_ones() {
        let (mut wr, rd) = tokio::io::duplex(1024);
        let sink = OutputSink::new();
        let (_cancel_tx, cancel_rx) = watch::channel(false);

        let task = pump_stdout(rd, sink.clone(), cancel_rx);

        wr.write_all(b"one\r\n\n   \t\ntwo\nthr").await.unwrap();
        wr.write_all(b"ee").await.unwrap();
        drop(wr);

        assert_eq!(task.await.unwrap().unwrap(), 3);
        let texts: Vec<String> = sink.drain().into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn stderr_records_are_tagged() {
        let (mut wr, rd) = tokio::io::duplex(64);
        let sink = OutputSink::new();
        let (_cancel_tx, cancel_rx) = watch::channel(false);

        let task = pump_stderr(rd, sink.clone(), cancel_rx);
        wr.write_all(b"oops\n").await.unwrap();
        drop(wr);
        task.await.unwrap().unwrap();

        let rec = sink.try_get().expect("one record");
        assert_eq!(rec.text, "oops");
        assert!(rec.is_stderr());
    }

    #[tokio::test]
    async fn cancel_unblocks_a_silent_stream() {
        // writer half stays open, so read() would block forever
        let (_wr, rd) = tokio::io::duplex(64);
        let sink = OutputSink::new();
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let task = pump_stdout(rd, sink.clone(), cancel_rx);
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel_tx.send(true).unwrap();

        let res = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("reader must stop promptly");
        assert_eq!(res.unwrap().unwrap(), 0);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn invalid_utf8_is_decoded_lossily() {
        let (mut wr, rd) = tokio::io::duplex(64);
        let sink = OutputSink::new();
        let (_cancel_tx, cancel_rx) = watch::channel(false);

        let task = pump_stdout(rd, sink.clone(), cancel_rx);
        wr.write_all(b"ok \xff\n").await.unwrap();
        drop(wr);
        task.await.unwrap().unwrap();

        assert_eq!(sink.try_get().unwrap().text, "ok \u{fffd}");
    }
}
