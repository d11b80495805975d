//! # Codec interface
//!
//! The decode stage drives exactly one codec instance at a time through the
//! [`Codec`] trait: compressed packets go in through [`Codec::feed`], decoded
//! frames come out of [`Codec::try_read_frame`], and out-of-band requests use
//! [`Codec::control`].
//!
//! Concrete decoders are resolved once, when the stage (re)initializes, into a
//! [`DecoderBackend`] variant. The set of variants is closed; new decoders plug
//! in through [`CodecRegistry`].
//!
//! ```rust
//! use vdkdec::av::CodecParams;
//! use vdkdec::codec::{CodecRegistry, PassthroughCodec};
//!
//! let mut registry = CodecRegistry::new();
//! registry.register_passthrough("ac3");
//!
//! let params = CodecParams::audio("ac3", 48000, 2);
//! let entries = registry.select(&params, &[], &["ac3".to_string()]);
//! assert_eq!(entries.len(), 1);
//! # let _ = PassthroughCodec::new(&params);
//! ```

use crate::av::{Frame, Packet, StreamKind};
use crate::error::Result;

mod passthrough;
mod registry;

pub use passthrough::PassthroughCodec;
pub use registry::{CodecEntry, CodecFactory, CodecRegistry};

/// Advisory hint telling a video codec how much work it may skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum FramedropHint {
    /// Decode everything.
    #[default]
    None,
    /// The consumer is behind; skipping non-reference frames is fine.
    Soft,
    /// The unit precedes the seek target; its output will be thrown away.
    Hard,
}

/// Out-of-band requests to a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Applies to the next unit fed.
    SetFramedrop(FramedropHint),
    /// Maximum number of frames the codec holds back for reordering.
    QueryReorderDelay,
}

/// Reply to a [`ControlCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlResult {
    /// Request applied.
    Ok,
    /// Reply to [`ControlCommand::QueryReorderDelay`], in frames.
    ReorderDelay(i32),
    /// The codec does not implement the request.
    Unsupported,
}

/// A decoder as seen by the decode stage.
///
/// All methods must return immediately.
pub trait Codec {
    /// Whether the codec accepts another input unit now.
    fn needs_input(&self) -> bool;

    /// Hands one unit to the codec. `None` starts draining: the codec returns
    /// all buffered frames followed by a single [`Frame::EndOfStream`].
    fn feed(&mut self, packet: Option<Packet>) -> Result<()>;

    /// Next decoded frame, if one is ready.
    fn try_read_frame(&mut self) -> Option<Frame>;

    /// Handles an out-of-band request. Unsupported by default.
    fn control(&mut self, _cmd: ControlCommand) -> ControlResult {
        ControlResult::Unsupported
    }

    /// Drops all buffered input and output, ready for new data.
    fn reset(&mut self);
}

/// The codec instance a wrapper owns, resolved at initialization.
pub enum DecoderBackend {
    /// Native video decoder.
    Video(Box<dyn Codec>),
    /// Native audio decoder.
    Audio(Box<dyn Codec>),
    /// Compressed audio forwarded undecoded.
    Passthrough(PassthroughCodec),
}

impl DecoderBackend {
    /// Wraps a native codec into the variant matching the stream kind.
    pub fn native(kind: StreamKind, codec: Box<dyn Codec>) -> Self {
        match kind {
            StreamKind::Video => DecoderBackend::Video(codec),
            StreamKind::Audio => DecoderBackend::Audio(codec),
        }
    }

    /// Whether framedrop hints apply.
    pub fn is_video(&self) -> bool {
        matches!(self, DecoderBackend::Video(_))
    }

    /// The codec behind the variant.
    pub fn codec_mut(&mut self) -> &mut dyn Codec {
        match self {
            DecoderBackend::Video(codec) | DecoderBackend::Audio(codec) => codec.as_mut(),
            DecoderBackend::Passthrough(codec) => codec,
        }
    }

    /// The codec behind the variant.
    pub fn codec(&self) -> &dyn Codec {
        match self {
            DecoderBackend::Video(codec) | DecoderBackend::Audio(codec) => codec.as_ref(),
            DecoderBackend::Passthrough(codec) => codec,
        }
    }
}

impl std::fmt::Debug for DecoderBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            DecoderBackend::Video(_) => "video",
            DecoderBackend::Audio(_) => "audio",
            DecoderBackend::Passthrough(_) => "passthrough",
        };
        f.debug_tuple("DecoderBackend").field(&kind).finish()
    }
}
