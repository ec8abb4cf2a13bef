//! Buffered SSE frame decoder and cancellable event stream

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use super::event::StreamEvent;
use crate::error::ChatResult;

/// Boxed stream of decoded events, as handed to the coordinator
pub type EventStream = Pin<Box<dyn Stream<Item = ChatResult<StreamEvent>> + Send>>;

/// Buffered decoder for `data: <json>` framed lines.
///
/// Transport chunks are appended to a carry-over buffer and only complete
/// lines are consumed; the trailing (possibly incomplete) line stays buffered
/// until the next read. Because splitting happens on `\n`, a multi-byte UTF-8
/// character broken across two chunks is re-buffered whole and never decoded
/// partially.
#[derive(Debug, Default)]
pub struct SseFrameDecoder {
    buffer: Vec<u8>,
}

impl SseFrameDecoder {
    const DATA_PREFIX: &'static str = "data: ";

    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk and extract every complete event in it.
    ///
    /// Lines that fail to parse as an event payload are dropped with a
    /// diagnostic; a malformed individual event never aborts the sequence.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        // Single forward scan; consumed lines are drained in one move at the
        // end so a frame carrying many events stays linear.
        let mut events = Vec::new();
        let mut consumed = 0;
        while let Some(pos) = self.buffer[consumed..].iter().position(|&b| b == b'\n') {
            let end = consumed + pos;
            let line = String::from_utf8_lossy(&self.buffer[consumed..end]);
            let line = line.trim_end_matches('\r');
            consumed = end + 1;

            if line.trim().is_empty() {
                continue;
            }

            let Some(payload) = line.strip_prefix(Self::DATA_PREFIX) else {
                continue;
            };

            match serde_json::from_str::<StreamEvent>(payload) {
                Ok(event) => events.push(event),
                Err(error) => {
                    tracing::debug!(%payload, %error, "dropping malformed stream event");
                }
            }
        }
        self.buffer.drain(..consumed);

        events
    }

    /// Whether unconsumed bytes remain buffered
    pub fn has_remaining(&self) -> bool {
        !self.buffer.is_empty()
    }
}

/// Lazy, single-pass, non-restartable sequence of [`StreamEvent`]s.
///
/// Wraps a raw byte stream and a per-run cancellation token. The token is
/// checked on every poll and also wakes the stream while it is waiting on a
/// silent connection; once it trips, the sequence ends immediately even if
/// decoded events are still queued.
pub struct SseEventStream<S> {
    inner: S,
    decoder: SseFrameDecoder,
    pending: VecDeque<StreamEvent>,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    done: bool,
}

impl<S> SseEventStream<S> {
    /// Wrap a byte stream with the given cancellation token
    pub fn new(inner: S, cancel: CancellationToken) -> Self {
        Self {
            inner,
            decoder: SseFrameDecoder::new(),
            pending: VecDeque::new(),
            cancelled: Box::pin(cancel.cancelled_owned()),
            done: false,
        }
    }
}

impl<S> Stream for SseEventStream<S>
where
    S: Stream<Item = ChatResult<Bytes>> + Unpin,
{
    type Item = ChatResult<StreamEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        // Polling the cancellation future registers a waker, so a cancel
        // request interrupts a read that is blocked on the transport.
        if self.cancelled.as_mut().poll(cx).is_ready() {
            self.done = true;
            return Poll::Ready(None);
        }

        loop {
            if let Some(event) = self.pending.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }

            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    let decoded = self.decoder.feed(&chunk);
                    self.pending.extend(decoded);
                }
                Poll::Ready(Some(Err(error))) => {
                    self.done = true;
                    return Poll::Ready(Some(Err(error)));
                }
                Poll::Ready(None) => {
                    self.done = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::CompletionMeta;
    use futures::StreamExt;

    fn bytes_stream(chunks: Vec<&[u8]>) -> impl Stream<Item = ChatResult<Bytes>> + Unpin {
        futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect::<Vec<_>>(),
        )
    }

    async fn collect_events(chunks: Vec<&[u8]>) -> Vec<StreamEvent> {
        let stream = SseEventStream::new(bytes_stream(chunks), CancellationToken::new());
        stream.map(|e| e.unwrap()).collect().await
    }

    const WIRE: &[u8] = b"data: {\"type\": \"start\"}\n\
        data: {\"type\": \"chunk\", \"content\": \"Sure\"}\n\
        data: {\"type\": \"chunk\", \"content\": \", I'll\"}\n\
        data: {\"type\": \"chunk\", \"content\": \" help.\"}\n\
        data: {\"type\": \"complete\"}\n";

    #[tokio::test]
    async fn test_single_chunk_decodes_all_events() {
        let events = collect_events(vec![WIRE]).await;
        assert_eq!(events.len(), 5);
        assert_eq!(events[0], StreamEvent::Start);
        assert!(matches!(events.last(), Some(StreamEvent::Complete { .. })));
    }

    #[tokio::test]
    async fn test_chunking_invariance() {
        let whole = collect_events(vec![WIRE]).await;

        // Split the same bytes at every boundary; the decoded sequence must
        // not change.
        for split in 1..WIRE.len() {
            let (a, b) = WIRE.split_at(split);
            let events = collect_events(vec![a, b]).await;
            assert_eq!(events, whole, "split at byte {} diverged", split);
        }
    }

    #[tokio::test]
    async fn test_byte_at_a_time() {
        let chunks: Vec<&[u8]> = WIRE.chunks(1).collect();
        let events = collect_events(chunks).await;
        assert_eq!(events.len(), 5);
    }

    #[tokio::test]
    async fn test_multibyte_utf8_across_chunks() {
        let wire = "data: {\"type\": \"chunk\", \"content\": \"señal ñ\"}\n".as_bytes();
        // Split inside the two-byte 'ñ'.
        let pos = wire.iter().position(|&b| b == 0xc3).unwrap() + 1;
        let (a, b) = wire.split_at(pos);
        let events = collect_events(vec![a, b]).await;
        assert_eq!(
            events,
            vec![StreamEvent::Chunk {
                content: Some("señal ñ".to_string())
            }]
        );
    }

    #[tokio::test]
    async fn test_malformed_line_is_dropped_not_fatal() {
        let wire = b"data: {\"type\": \"start\"}\n\
            data: {not json at all\n\
            data: {\"type\": \"chunk\", \"content\": \"ok\"}\n";
        let events = collect_events(vec![wire]).await;
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            StreamEvent::Chunk {
                content: Some("ok".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_non_data_lines_are_ignored() {
        let wire = b"event: ping\n\
            \n\
            data: {\"type\": \"start\"}\n";
        let events = collect_events(vec![wire]).await;
        assert_eq!(events, vec![StreamEvent::Start]);
    }

    #[tokio::test]
    async fn test_incomplete_trailing_line_stays_buffered() {
        let mut decoder = SseFrameDecoder::new();
        let events = decoder.feed(b"data: {\"type\": \"sta");
        assert!(events.is_empty());
        assert!(decoder.has_remaining());

        let events = decoder.feed(b"rt\"}\n");
        assert_eq!(events, vec![StreamEvent::Start]);
        assert!(!decoder.has_remaining());
    }

    #[tokio::test]
    async fn test_many_events_in_one_frame() {
        let mut wire = Vec::new();
        for i in 0..500 {
            wire.extend_from_slice(
                format!("data: {{\"type\": \"chunk\", \"content\": \"{}\"}}\n", i).as_bytes(),
            );
        }
        wire.extend_from_slice(b"data: {\"type\": \"comp");

        let mut decoder = SseFrameDecoder::new();
        let events = decoder.feed(&wire);
        assert_eq!(events.len(), 500);
        assert_eq!(
            events[499],
            StreamEvent::Chunk {
                content: Some("499".to_string())
            }
        );
        // The partial trailing line stays buffered.
        assert!(decoder.has_remaining());
        assert_eq!(decoder.feed(b"lete\"}\n"), vec![StreamEvent::Complete {
            meta: CompletionMeta::default()
        }]);
    }

    #[tokio::test]
    async fn test_cancellation_suppresses_buffered_events() {
        let token = CancellationToken::new();
        let mut stream = SseEventStream::new(bytes_stream(vec![WIRE]), token.clone());

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first, StreamEvent::Start);

        token.cancel();
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_crlf_line_endings() {
        let wire = b"data: {\"type\": \"start\"}\r\ndata: {\"type\": \"complete\"}\r\n";
        let events = collect_events(vec![wire]).await;
        assert_eq!(events.len(), 2);
    }
}
