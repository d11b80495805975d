use super::CodecParams;
use crate::error::{DecodeError, Result};
use bytes::Bytes;
use std::sync::Arc;

/// Segment a packet belongs to when playing a timeline (EDL, ordered chapters).
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentInfo {
    /// Inclusive start of the segment window, in seconds.
    pub start: Option<f64>,
    /// Exclusive end of the segment window, in seconds.
    pub end: Option<f64>,
    /// Codec configuration used by the segment's source.
    pub codec: Arc<CodecParams>,
}

impl SegmentInfo {
    /// Creates segment info for a `[start, end)` window.
    pub fn new(start: Option<f64>, end: Option<f64>, codec: Arc<CodecParams>) -> Self {
        Self { start, end, codec }
    }
}

/// A compressed unit read from the demuxer. Timestamps are in seconds.
#[derive(Debug, Clone)]
pub struct Packet {
    /// Compressed payload.
    pub data: Bytes,
    /// Presentation timestamp.
    pub pts: Option<f64>,
    /// Decode timestamp.
    pub dts: Option<f64>,
    /// Index of the stream in the demuxer.
    pub stream_index: usize,
    /// The packet starts a keyframe.
    pub is_key: bool,
    /// Duration in seconds, if the container knows it.
    pub duration: Option<f64>,
    /// Set when the packet comes from a timeline segment.
    pub segment: Option<SegmentInfo>,
    /// Backward playback: decoder warm-up data whose output must be discarded.
    pub back_preroll: bool,
    /// Backward playback: first packet of a new backstep.
    pub back_restart: bool,
}

impl Packet {
    /// Creates a packet without timestamps or flags.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            pts: None,
            dts: None,
            stream_index: 0,
            is_key: false,
            duration: None,
            segment: None,
            back_preroll: false,
            back_restart: false,
        }
    }

    /// Sets the presentation timestamp.
    pub fn with_pts(mut self, pts: f64) -> Self {
        self.pts = Some(pts);
        self
    }

    /// Sets the decode timestamp.
    pub fn with_dts(mut self, dts: f64) -> Self {
        self.dts = Some(dts);
        self
    }

    /// Sets the stream index.
    pub fn with_stream_index(mut self, index: usize) -> Self {
        self.stream_index = index;
        self
    }

    /// Marks the packet as keyframe.
    pub fn with_key_flag(mut self, is_key: bool) -> Self {
        self.is_key = is_key;
        self
    }

    /// Sets the duration in seconds.
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Attaches timeline segment information.
    pub fn with_segment(mut self, segment: SegmentInfo) -> Self {
        self.segment = Some(segment);
        self
    }

    /// Marks the packet as backward-playback preroll.
    pub fn with_back_preroll(mut self, preroll: bool) -> Self {
        self.back_preroll = preroll;
        self
    }

    /// Marks the packet as start of a new backstep.
    pub fn with_back_restart(mut self, restart: bool) -> Self {
        self.back_restart = restart;
        self
    }

    /// Whether the packet carries segment (timeline) information.
    pub fn is_segmented(&self) -> bool {
        self.segment.is_some()
    }

    /// Best known timestamp: pts, falling back to dts.
    pub fn pdts(&self) -> Option<f64> {
        self.pts.or(self.dts)
    }

    /// Rejects packets whose metadata cannot be processed.
    pub fn validate(&self) -> Result<()> {
        for (name, ts) in [("pts", self.pts), ("dts", self.dts), ("duration", self.duration)] {
            if let Some(value) = ts {
                if !value.is_finite() {
                    return Err(DecodeError::InvalidPacket(format!("non-finite {}: {}", name, value)));
                }
            }
        }

        if let Some(segment) = &self.segment {
            if let (Some(start), Some(end)) = (segment.start, segment.end) {
                if !start.is_finite() || !end.is_finite() || end < start {
                    return Err(DecodeError::InvalidPacket(format!(
                        "bad segment window [{}, {})",
                        start, end
                    )));
                }
            }
        }

        Ok(())
    }
}
