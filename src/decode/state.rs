use super::segment::SegmentCoordinator;
use super::timestamp::{PacketPtsHealth, VideoPtsRepair};
use crate::av::Packet;

/// Input staged for the codec but not yet accepted by it.
#[derive(Debug, Clone)]
pub enum PendingInput {
    /// A packet the codec did not take yet.
    Packet(Packet),
    /// Drain request: either the source ended or a new segment waits.
    EndOfStream,
}

/// Per-decoder bookkeeping, cleared whenever the codec is reset.
#[derive(Debug, Default)]
pub struct DecodeState {
    /// pts (or dts) of the first packet fed since the last reset.
    pub first_packet_pdts: Option<f64>,
    /// Hr-seek target; frames before it are wanted only to get there.
    pub start_pts: Option<f64>,
    /// Video timestamp repair state.
    pub video_pts: VideoPtsRepair,
    /// Survives resets; only a codec reinit restarts the warm-up.
    pub packet_pts: PacketPtsHealth,
    /// The most recent packet had no pts.
    pub packet_pts_missing: bool,
    /// Packets fed since the last decoded frame.
    pub packets_without_output: u32,
    /// Unit waiting for the codec.
    pub pending: Option<PendingInput>,
    /// Something was fed since the last reset.
    pub packet_fed: bool,
    /// Discard output until a frame with a pts shows up.
    pub preroll_discard: bool,
    /// The source's end was already forwarded.
    pub eof_fed: bool,
    /// Segment window and held-back packet.
    pub segment: SegmentCoordinator,
}

impl DecodeState {
    /// Fresh state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears everything tied to data inside the codec.
    pub fn reset(&mut self) {
        let packet_pts = self.packet_pts;
        *self = Self {
            packet_pts,
            ..Self::default()
        };
    }

    /// Seek target, or the segment start if later.
    pub fn effective_start_pts(&self) -> Option<f64> {
        match (self.start_pts, self.segment.start()) {
            (Some(seek), Some(seg)) => Some(seek.max(seg)),
            (seek, seg) => seek.or(seg),
        }
    }
}
