use crate::av::{AudioFrame, CodecParams, Packet};

/// Where the stage is with respect to timeline segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentPhase {
    /// Decoding the current segment.
    Active,
    /// A packet of the next segment is held back while the codec drains.
    Draining,
    /// The codec is being reset (and maybe replaced) for the next segment.
    Reinitializing,
}

/// Tracks the active segment window and the packet that starts the next one.
#[derive(Debug)]
pub struct SegmentCoordinator {
    start: Option<f64>,
    end: Option<f64>,
    next: Option<Packet>,
    reinitializing: bool,
}

impl Default for SegmentCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentCoordinator {
    /// Coordinator without a window.
    pub fn new() -> Self {
        Self {
            start: None,
            end: None,
            next: None,
            reinitializing: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SegmentPhase {
        if self.reinitializing {
            SegmentPhase::Reinitializing
        } else if self.next.is_some() {
            SegmentPhase::Draining
        } else {
            SegmentPhase::Active
        }
    }

    /// Start of the active window.
    pub fn start(&self) -> Option<f64> {
        self.start
    }

    /// End of the active window.
    pub fn end(&self) -> Option<f64> {
        self.end
    }

    /// Sets the active window.
    pub fn set_window(&mut self, start: Option<f64>, end: Option<f64>) {
        self.start = start;
        self.end = end;
    }

    /// Whether `packet` cannot be fed to the current codec instance: it
    /// belongs to another segment, or (backward playback) starts a new
    /// backstep after data was already fed.
    pub fn is_new_segment(&self, packet: &Packet, codec: &CodecParams, backward: bool, packet_fed: bool) -> bool {
        let other_segment = packet
            .segment
            .as_ref()
            .is_some_and(|seg| seg.start != self.start || seg.end != self.end || *seg.codec != *codec);

        other_segment || (backward && packet.back_restart && packet_fed)
    }

    /// Whether a next-segment packet is held back.
    pub fn is_draining(&self) -> bool {
        self.next.is_some()
    }

    /// Holds back the first packet of the next segment until the codec drained.
    pub fn begin_drain(&mut self, packet: Packet) {
        debug_assert!(self.next.is_none());
        self.next = Some(packet);
    }

    /// Takes the held packet once the current segment has ended.
    pub fn take_next(&mut self) -> Option<Packet> {
        self.next.take()
    }

    /// Marks the codec switch as in progress or done.
    pub fn set_reinitializing(&mut self, reinitializing: bool) {
        self.reinitializing = reinitializing;
    }

    /// Checks a video pts against the window. Returns `(discard, ended)`.
    pub fn check_video(&self, pts: Option<f64>) -> (bool, bool) {
        let Some(pts) = pts else { return (false, false) };
        let ended = self.end.is_some_and(|end| pts >= end);
        let early = self.start.is_some_and(|start| pts < start);
        (early || ended, ended)
    }

    /// Clips audio to the window. Returns whether the segment has ended.
    pub fn clip_audio(&self, frame: &mut AudioFrame) -> bool {
        frame.clip_timestamps(self.start, self.end);
        match (frame.pts, self.end) {
            (Some(pts), Some(end)) => pts >= end,
            _ => false,
        }
    }

    /// Forgets the window and any held packet.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
