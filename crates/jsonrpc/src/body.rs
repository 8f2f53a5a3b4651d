//! Streaming request bodies.
//!
//! In streaming mode the envelope is serialized on a blocking worker straight
//! into a bounded channel of chunks, so a request carrying a large argument is
//! never held in memory as one buffer. The channel bound also throttles the
//! serializer to the speed the connection drains it.

use std::io::{self, Write};

use bytes::{Bytes, BytesMut};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::transport::BodyStream;

const CHUNK_SIZE: usize = 64 * 1024;
const CHANNEL_DEPTH: usize = 4;

/// Serializes `value` as JSON into a stream of chunks.
///
/// Must be called from within a Tokio runtime. A serialization failure is
/// delivered as the final `Err` item of the stream.
pub(crate) fn json_stream<T>(value: T) -> BodyStream
where
    T: Serialize + Send + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);

    tokio::task::spawn_blocking(move || {
        let mut writer = ChunkWriter {
            tx,
            buf: BytesMut::with_capacity(CHUNK_SIZE),
        };
        let outcome = serde_json::to_writer(&mut writer, &value)
            .map_err(io::Error::from)
            .and_then(|()| writer.flush());
        if let Err(e) = outcome {
            // The receiver may already be gone; nothing left to tell.
            let _ = writer.tx.blocking_send(Err(e));
        }
    });

    Box::pin(ReceiverStream::new(rx))
}

struct ChunkWriter {
    tx: mpsc::Sender<io::Result<Bytes>>,
    buf: BytesMut,
}

impl ChunkWriter {
    fn send_chunk(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = self.buf.split().freeze();
        self.tx
            .blocking_send(Ok(chunk))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "request body was dropped"))
    }
}

impl Write for ChunkWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        if self.buf.len() >= CHUNK_SIZE {
            self.send_chunk()?;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send_chunk()
    }
}

#[cfg(test)]
mod tests {
    use futures_util::TryStreamExt;

    use super::*;

    #[tokio::test]
    async fn streamed_bytes_equal_buffered_bytes() {
        let big: Vec<String> = (0..20_000).map(|i| format!("feature_{i}")).collect();
        let expected = serde_json::to_vec(&big).unwrap();

        let chunks: Vec<Bytes> = json_stream(big).try_collect().await.unwrap();
        assert!(chunks.len() > 1, "payload should span several chunks");
        assert!(chunks.iter().all(|c| c.len() <= CHUNK_SIZE + 64));
        assert_eq!(chunks.concat(), expected);
    }

    #[tokio::test]
    async fn serialization_failure_ends_the_stream_with_an_error() {
        use std::collections::HashMap;

        // Non-string map keys cannot be written as JSON object keys.
        let mut bad: HashMap<Vec<u8>, i32> = HashMap::new();
        bad.insert(vec![1, 2], 3);

        let result: io::Result<Vec<Bytes>> = json_stream(bad).try_collect().await;
        assert!(result.is_err());
    }
}
