use std::sync::Arc;

/// Kind of elementary stream a decoder wrapper serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Video stream.
    Video,
    /// Audio stream.
    Audio,
}

/// Codec parameters as reported by the container.
///
/// Two packets belong to the same codec configuration iff their parameters
/// compare equal; a difference on a segment boundary forces the codec to be
/// recreated.
#[derive(Debug, Clone, PartialEq)]
pub struct CodecParams {
    /// Stream kind.
    pub kind: StreamKind,
    /// Codec name, e.g. `"h264"` or `"aac"`.
    pub codec: String,
    /// Container frame rate; 0 when unknown.
    pub fps: f64,
    /// Container pixel aspect ratio; `(0, 0)` when unknown.
    pub par_w: u32,
    /// Vertical part of the container pixel aspect.
    pub par_h: u32,
    /// Container rotation in degrees.
    pub rotate: u32,
    /// Audio sample rate, 0 for video.
    pub sample_rate: u32,
    /// Audio channel count, 0 for video.
    pub channels: u16,
    /// The container stores decode-order timestamps in the pts field (AVI
    /// style); decoded pts need the reorder delay subtracted.
    pub decode_order_pts: bool,
    /// Codec-specific initialization data.
    pub extra_data: Option<Vec<u8>>,
}

impl CodecParams {
    /// Parameters of a video stream with the given container frame rate.
    pub fn video(codec: &str, fps: f64) -> Self {
        Self {
            kind: StreamKind::Video,
            codec: codec.to_string(),
            fps,
            par_w: 0,
            par_h: 0,
            rotate: 0,
            sample_rate: 0,
            channels: 0,
            decode_order_pts: false,
            extra_data: None,
        }
    }

    /// Parameters of an audio stream.
    pub fn audio(codec: &str, sample_rate: u32, channels: u16) -> Self {
        Self {
            kind: StreamKind::Audio,
            codec: codec.to_string(),
            fps: 0.0,
            par_w: 0,
            par_h: 0,
            rotate: 0,
            sample_rate,
            channels,
            decode_order_pts: false,
            extra_data: None,
        }
    }

    /// Sets the container pixel aspect.
    pub fn with_pixel_aspect(mut self, par_w: u32, par_h: u32) -> Self {
        self.par_w = par_w;
        self.par_h = par_h;
        self
    }

    /// Sets the container rotation, in degrees.
    pub fn with_rotation(mut self, rotate: u32) -> Self {
        self.rotate = rotate % 360;
        self
    }

    /// Marks the pts field as holding decode-order timestamps.
    pub fn with_decode_order_pts(mut self, enabled: bool) -> Self {
        self.decode_order_pts = enabled;
        self
    }

    /// Sets codec initialization data.
    pub fn with_extra_data(mut self, data: Vec<u8>) -> Self {
        self.extra_data = Some(data);
        self
    }
}

/// Static description of the stream a wrapper decodes.
#[derive(Debug, Clone)]
pub struct StreamHeader {
    /// Stream kind, same as the codec's.
    pub kind: StreamKind,
    /// Codec parameters from the container.
    pub codec: Arc<CodecParams>,
    /// The stream is a single embedded picture (cover art).
    pub attached_picture: bool,
    /// The source is known to carry no timestamps at all.
    pub missing_timestamps: bool,
}

impl StreamHeader {
    /// Header of a plain stream decoded with `codec`.
    pub fn new(codec: CodecParams) -> Self {
        Self {
            kind: codec.kind,
            codec: Arc::new(codec),
            attached_picture: false,
            missing_timestamps: false,
        }
    }

    /// Marks the stream as cover art.
    pub fn with_attached_picture(mut self, attached: bool) -> Self {
        self.attached_picture = attached;
        self
    }

    /// Marks the source as timestamp-less.
    pub fn with_missing_timestamps(mut self, missing: bool) -> Self {
        self.missing_timestamps = missing;
        self
    }
}
