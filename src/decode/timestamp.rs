//! Timestamp repair.
//!
//! Video decoders reorder frames and may drop or mangle timestamps; audio
//! containers round them. The repair here turns whatever the codec reports
//! into a clock that only moves forward.

use crate::av::{AudioFrame, VideoFrame};
use crate::error::DecodeError;
use log::warn;

/// Decoded frames observed before packet timestamps are trusted.
pub const PTS_WARMUP_FRAMES: u8 = 10;

/// Whether the demuxer's packet pts can be relied on (e.g. for hard
/// framedrop before a seek target).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketPtsHealth {
    /// Still watching; the count is the number of frames left.
    Undecided(u8),
    /// Trusted.
    Good,
    /// Seen problems; never trusted again until reinit.
    Broken,
}

impl PacketPtsHealth {
    /// Starts a new warm-up.
    pub fn warmup() -> Self {
        PacketPtsHealth::Undecided(PTS_WARMUP_FRAMES)
    }

    /// Whether packet pts can be trusted.
    pub fn is_good(&self) -> bool {
        *self == PacketPtsHealth::Good
    }

    /// Gives up on packet pts.
    pub fn mark_broken(&mut self) {
        *self = PacketPtsHealth::Broken;
    }

    fn observe_frame(&mut self, pts_problems: bool) {
        if let PacketPtsHealth::Undecided(left) = *self {
            *self = if left <= 1 {
                PacketPtsHealth::Good
            } else {
                PacketPtsHealth::Undecided(left - 1)
            };
        }
        if pts_problems {
            self.mark_broken();
        }
    }
}

impl Default for PacketPtsHealth {
    fn default() -> Self {
        Self::warmup()
    }
}

/// Per-decoder video timestamp bookkeeping.
#[derive(Debug, Default)]
pub struct VideoPtsRepair {
    codec_pts: Option<f64>,
    codec_dts: Option<f64>,
    pts_problems: u32,
    dts_problems: u32,
    missing_pts_warnings: u32,
}

/// Inputs for turning a repaired decoder pts into the output clock.
#[derive(Debug, Clone, Copy)]
pub struct VideoClock {
    /// Playback direction, 1 or -1.
    pub play_dir: i8,
    /// Timestamp repair enabled.
    pub correct_pts: bool,
    /// Nominal frame rate, 0 if unknown.
    pub fps: f64,
    /// Rate used when `fps` is unknown.
    pub default_fps: f64,
    /// Timestamp the made-up clock starts from.
    pub first_packet_pdts: Option<f64>,
}

impl VideoPtsRepair {
    /// Fresh state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Times the decoder pts went backwards.
    pub fn pts_problems(&self) -> u32 {
        self.pts_problems
    }

    /// Times the decoder dts went backwards.
    pub fn dts_problems(&self) -> u32 {
        self.dts_problems
    }

    /// Cleans up the timestamps of a frame straight out of the decoder.
    ///
    /// The pts is reordered, the dts is not; both must be monotonic. When the
    /// pts is missing or misbehaves more often than the dts, the dts is used.
    pub fn repair(&mut self, frame: &mut VideoFrame, health: &mut PacketPtsHealth) {
        if let Some(pts) = frame.pts {
            if self.codec_pts.is_some_and(|last| pts < last) {
                self.pts_problems += 1;
            }
            self.codec_pts = Some(pts);
        }

        if let Some(dts) = frame.dts {
            if self.codec_dts.is_some_and(|last| dts <= last) {
                self.dts_problems += 1;
            }
            self.codec_dts = Some(dts);
        }

        health.observe_frame(self.pts_problems > 0);

        if (self.pts_problems > self.dts_problems || frame.pts.is_none()) && frame.dts.is_some() {
            frame.pts = frame.dts;
        }
    }

    /// Undoes decode-order timestamps stored as pts: shifts back by the
    /// codec's reorder delay.
    pub fn compensate_reorder_delay(frame: &mut VideoFrame, delay: i32, fps: f64) {
        if fps <= 0.0 {
            return;
        }
        if let Some(pts) = frame.pts.as_mut() {
            *pts -= delay.max(0) as f64 / fps;
        }
    }

    /// Maps the frame onto the output clock, making up a pts when none is
    /// usable. `clock` is the pts of the previously emitted frame.
    pub fn correct_output(&mut self, frame: &mut VideoFrame, clock: &mut Option<f64>, params: &VideoClock, target: &str) {
        frame.pts = frame.pts.map(|pts| pts * params.play_dir as f64);

        if !params.correct_pts || frame.pts.is_none() {
            let fps = if params.fps > 0.0 { params.fps } else { params.default_fps };

            if params.correct_pts && self.missing_pts_warnings <= 1 {
                let anomaly = DecodeError::TimestampAnomaly(format!("no video PTS, making one up using {} FPS", fps));
                warn!(target: target, "{}", anomaly);
                if self.missing_pts_warnings == 1 {
                    warn!(target: target, "ignoring further missing PTS warnings");
                }
                self.missing_pts_warnings += 1;
            }

            frame.pts = Some(match *clock {
                Some(last) => last + 1.0 / fps,
                None => params.first_packet_pdts.unwrap_or(0.0),
            });
        }

        *clock = frame.pts;
    }
}

/// Thresholds and flags for audio pts correction.
#[derive(Debug, Clone, Copy)]
pub struct AudioClock {
    /// Playback direction, 1 or -1.
    pub play_dir: i8,
    /// Differences above this are reported.
    pub jump_threshold: f64,
    /// Differences of at least this raise a pts reset.
    pub reset_threshold: f64,
    /// Interpolated pts within this of the real one is kept.
    pub interp_tolerance: f64,
    /// The source never has timestamps; start the clock at 0.
    pub missing_timestamps: bool,
}

/// Sets the frame pts from the interpolated audio clock, resyncing the clock
/// when the reported pts drifts too far. Returns true if the jump is large
/// enough that the consumer should treat it as a timestamp reset.
pub fn correct_audio_pts(frame: &mut AudioFrame, clock: &mut Option<f64>, params: &AudioClock, target: &str) -> bool {
    let frame_len = frame.duration();
    let mut pts_reset = false;

    if let Some(mut frame_pts) = frame.pts {
        if params.play_dir < 0 {
            frame_pts = -(frame_pts + frame_len);
        }

        let diff = clock.map(|last| (last - frame_pts).abs());

        if let (Some(last), Some(diff)) = (*clock, diff) {
            if diff > params.jump_threshold {
                let anomaly = DecodeError::TimestampAnomaly(format!("invalid audio PTS: {} -> {}", last, frame_pts));
                warn!(target: target, "{}", anomaly);
                if diff >= params.reset_threshold {
                    pts_reset = true;
                }
            }
        }

        // keep the interpolated clock unless it is off by more than the
        // tolerance (container rounding)
        if diff.map_or(true, |d| d > params.interp_tolerance) {
            *clock = Some(frame_pts);
        }
    }

    if clock.is_none() && params.missing_timestamps {
        *clock = Some(0.0);
    }

    frame.pts = *clock;

    if let Some(c) = clock.as_mut() {
        *c += frame_len;
    }

    pts_reset
}
