//! Streaming protocol decoding
//!
//! Turns the raw byte frames of a streamed chat response into a lazy sequence
//! of [`StreamEvent`]s. The transport delivers arbitrarily-sized chunks that
//! do not respect event boundaries; the decoder re-frames them so that the
//! same logical bytes produce the same event sequence regardless of how the
//! network split them.

mod decoder;
mod event;

pub use decoder::{EventStream, SseEventStream, SseFrameDecoder};
pub use event::{CompletionMeta, StreamEvent};
