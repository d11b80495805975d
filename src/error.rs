use thiserror::Error;

/// Errors raised by the decode stage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// A packet from the demuxer failed validation and was dropped.
    #[error("invalid packet: {0}")]
    InvalidPacket(String),

    /// Timestamps went backwards, jumped or were missing.
    #[error("timestamp anomaly: {0}")]
    TimestampAnomaly(String),

    /// No registered decoder could be opened.
    #[error("failed to initialize a decoder for codec '{codec}'")]
    CodecInit {
        /// Codec name from the stream parameters.
        codec: String,
    },

    /// A frame did not fit into the reversal queue.
    #[error("reversal queue overflow ({size} of {capacity} bytes used), discarding frame")]
    ReversalQueueOverflow {
        /// Bytes queued when the frame arrived.
        size: usize,
        /// Configured queue capacity in bytes.
        capacity: usize,
    },

    /// A component produced a frame the stage cannot handle.
    #[error("unknown frame type from {0}")]
    UnknownFrameType(String),

    /// Error reported by the codec itself.
    #[error("codec error: {0}")]
    Codec(String),

    /// Bad option name or value.
    #[error("config error: {0}")]
    Config(String),
}

impl DecodeError {
    /// Whether this error ends the pipeline instance.
    ///
    /// Everything else is absorbed where it happens: logged, counted, and
    /// decoding continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DecodeError::CodecInit { .. } | DecodeError::UnknownFrameType(_) | DecodeError::Codec(_)
        )
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, DecodeError>;
