//! # Decode stage
//!
//! [`DecoderWrapper`] sits between a demuxed packet stream and one codec
//! instance. Each call to [`DecoderWrapper::advance`] moves at most one unit
//! into the codec and at most one frame out of it, repairing timestamps,
//! clipping to the active segment, and reordering for backward playback on
//! the way.
//!
//! The stage never blocks and never spawns anything; it is driven by the
//! caller (see [`crate::runner`]).

mod coverart;
mod feed;
mod params;
mod reverse;
mod segment;
mod state;
mod timestamp;
mod wrapper;

pub use coverart::{CoverArtLatch, CoverArtState};
pub use feed::{framedrop_hint, FeedOutcome};
pub use params::ImageParamsFixer;
pub use reverse::ReversalQueue;
pub use segment::{SegmentCoordinator, SegmentPhase};
pub use state::{DecodeState, PendingInput};
pub use timestamp::{correct_audio_pts, AudioClock, PacketPtsHealth, VideoClock, VideoPtsRepair, PTS_WARMUP_FRAMES};
pub use wrapper::DecoderWrapper;

use crate::config::SharedOptions;

/// Result of one [`DecoderWrapper::advance`] step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Something moved; call again.
    Progressed,
    /// Waiting on the source, the codec or the consumer.
    NoDataYet,
    /// The instance hit a fatal error and must be replaced.
    Failed,
}

/// Everything a decode stage needs from its surroundings.
#[derive(Debug, Clone)]
pub struct DecoderContext {
    /// `log` target; defaults to `vdkdec::vd` or `vdkdec::ad` by stream kind.
    pub log_target: Option<String>,
    /// Options, re-read on every step.
    pub options: SharedOptions,
}

impl DecoderContext {
    /// Context with the default log target.
    pub fn new(options: SharedOptions) -> Self {
        Self {
            log_target: None,
            options,
        }
    }

    /// Overrides the `log` target.
    pub fn with_log_target(mut self, target: &str) -> Self {
        self.log_target = Some(target.to_string());
        self
    }
}
