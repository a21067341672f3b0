//! Piped input: the append-only data buffer and the feeder that fills it.
//!
//! The feeder is the only writer. Everyone else reads consistent snapshots and
//! learns about new data through [`IngestEvent`]s.

use std::io;
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Read size for a single append.
const CHUNK_SIZE: usize = 16 * 1024;

/// Shared, append-only byte buffer.
#[derive(Debug, Clone, Default)]
pub struct DataBuffer {
    inner: Arc<RwLock<Vec<u8>>>,
}

impl DataBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the current contents out under the read lock.
    pub fn snapshot(&self) -> Bytes {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Bytes::copy_from_slice(&guard)
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn append(&self, chunk: &[u8]) -> usize {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.extend_from_slice(chunk);
        guard.len()
    }
}

/// Progress reported by the feeder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestEvent {
    /// A chunk was appended; `total` is the buffer length afterwards.
    Appended { total: usize },
    /// End of stream. The buffer will not change again.
    Finished { total: usize },
    /// Reading failed; the buffer may be incomplete.
    Failed(String),
}

/// Spawns the feeder on the current tokio runtime.
pub fn spawn_feeder<R>(
    reader: R,
    buffer: DataBuffer,
    events: mpsc::UnboundedSender<IngestEvent>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(feed(reader, buffer, events))
}

/// Copies `reader` into `buffer` until end of stream or the first read error.
pub async fn feed<R>(mut reader: R, buffer: DataBuffer, events: mpsc::UnboundedSender<IngestEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => {
                let total = buffer.len();
                tracing::debug!(total, "input finished");
                let _ = events.send(IngestEvent::Finished { total });
                return;
            }
            Ok(n) => {
                let total = buffer.append(&chunk[..n]);
                let _ = events.send(IngestEvent::Appended { total });
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => {
                tracing::warn!(error = %err, "reading input failed");
                let _ = events.send(IngestEvent::Failed(err.to_string()));
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use tokio::io::{AsyncWriteExt, ReadBuf};

    use super::*;

    /// Yields `prefix`, then fails.
    struct BrokenReader {
        prefix: Option<&'static [u8]>,
    }

    impl AsyncRead for BrokenReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.prefix.take() {
                Some(prefix) => {
                    buf.put_slice(prefix);
                    Poll::Ready(Ok(()))
                }
                None => Poll::Ready(Err(io::Error::other("pipe closed unexpectedly"))),
            }
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<IngestEvent>) -> Vec<IngestEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    #[tokio::test]
    async fn test_feed_copies_everything_then_finishes() {
        let buffer = DataBuffer::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        feed(&b"{\"a\":1}"[..], buffer.clone(), tx).await;

        assert_eq!(buffer.snapshot(), Bytes::from_static(b"{\"a\":1}"));
        assert_eq!(
            drain(&mut rx),
            vec![
                IngestEvent::Appended { total: 7 },
                IngestEvent::Finished { total: 7 },
            ]
        );
    }

    #[tokio::test]
    async fn test_feed_empty_input() {
        let buffer = DataBuffer::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        feed(&b""[..], buffer.clone(), tx).await;

        assert!(buffer.is_empty());
        assert_eq!(drain(&mut rx), vec![IngestEvent::Finished { total: 0 }]);
    }

    #[tokio::test]
    async fn test_feed_reports_each_streamed_chunk() {
        let buffer = DataBuffer::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (mut writer, reader) = tokio::io::duplex(64);
        let feeder = spawn_feeder(reader, buffer.clone(), tx);

        writer.write_all(b"a: 1\n").await.unwrap();
        let first = rx.recv().await.unwrap();
        assert_eq!(first, IngestEvent::Appended { total: 5 });
        assert_eq!(buffer.snapshot(), Bytes::from_static(b"a: 1\n"));

        writer.write_all(b"b: 2\n").await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(second, IngestEvent::Appended { total: 10 });

        drop(writer);
        assert_eq!(
            rx.recv().await.unwrap(),
            IngestEvent::Finished { total: 10 }
        );
        feeder.await.unwrap();
        assert_eq!(buffer.snapshot(), Bytes::from_static(b"a: 1\nb: 2\n"));
    }

    #[tokio::test]
    async fn test_feed_read_error_is_reported() {
        let buffer = DataBuffer::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        feed(
            BrokenReader {
                prefix: Some(b"partial"),
            },
            buffer.clone(),
            tx,
        )
        .await;

        let events = drain(&mut rx);
        assert_eq!(events[0], IngestEvent::Appended { total: 7 });
        assert!(matches!(&events[1], IngestEvent::Failed(msg) if msg.contains("pipe closed")));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_appends() {
        let buffer = DataBuffer::new();
        buffer.append(b"one");
        let snapshot = buffer.snapshot();

        buffer.append(b" two");

        assert_eq!(snapshot, Bytes::from_static(b"one"));
        assert_eq!(buffer.snapshot(), Bytes::from_static(b"one two"));
    }
}
