use super::state::{DecodeState, PendingInput};
use crate::av::{CodecParams, PacketRecorder, PacketSource};
use crate::codec::{ControlCommand, DecoderBackend, FramedropHint};
use crate::config::DecoderOptions;
use crate::error::{DecodeError, Result};
use log::{trace, warn};

/// What a feed attempt did.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedOutcome {
    /// Nothing to do: the codec is busy or no input is available.
    Idle,
    /// One unit (packet or drain request) went to the codec.
    Fed,
    /// A malformed packet was read and dropped.
    Rejected(DecodeError),
}

/// Decides how much work the video codec may skip for the next unit.
///
/// `pts_trusted` must only be set once packet timestamps are known good;
/// hard drops rely on them.
pub fn framedrop_hint(
    start_pts: Option<f64>,
    packet_pts: Option<f64>,
    play_dir: i8,
    attempt_framedrops: u32,
    pts_trusted: bool,
    slack: f64,
) -> FramedropHint {
    let mut hint = FramedropHint::None;

    if attempt_framedrops > 0 {
        hint = FramedropHint::Soft;
    }

    if let (Some(start), Some(pts)) = (start_pts, packet_pts) {
        if play_dir > 0 && pts < start - slack && pts_trusted {
            hint = FramedropHint::Hard;
        }
    }

    hint
}

/// Moves at most one unit from the packet source into the codec.
pub struct Feeder<'a> {
    /// Codec receiving the unit.
    pub backend: &'a mut DecoderBackend,
    /// Where packets come from.
    pub source: &'a mut (dyn PacketSource + 'static),
    /// Optional copy of everything fed.
    pub recorder: Option<&'a mut (dyn PacketRecorder + 'static)>,
    /// Bookkeeping of the owning wrapper.
    pub state: &'a mut DecodeState,
    /// Parameters of the current codec configuration.
    pub codec: &'a CodecParams,
    /// Options snapshot of this step.
    pub options: &'a DecoderOptions,
    /// Playback direction, 1 or -1.
    pub play_dir: i8,
    /// Soft framedrops still requested.
    pub attempt_framedrops: u32,
    /// `log` target.
    pub target: &'a str,
}

impl Feeder<'_> {
    /// Codec errors returned from here are fatal.
    pub fn feed(self) -> Result<FeedOutcome> {
        let Feeder {
            backend,
            source,
            recorder,
            state,
            codec,
            options,
            play_dir,
            attempt_framedrops,
            target,
        } = self;

        if !backend.codec().needs_input() {
            return Ok(FeedOutcome::Idle);
        }

        if state.pending.is_none() && !state.segment.is_draining() {
            match source.try_read() {
                Some(packet) => {
                    if let Err(err) = packet.validate() {
                        warn!(target: target, "dropping packet: {}", err);
                        return Ok(FeedOutcome::Rejected(err));
                    }
                    state.pending = Some(PendingInput::Packet(packet));
                }
                None if source.at_eof() && !state.eof_fed => {
                    state.eof_fed = true;
                    state.pending = Some(PendingInput::EndOfStream);
                }
                None => return Ok(FeedOutcome::Idle),
            }
        }

        let Some(input) = state.pending.take() else {
            return Ok(FeedOutcome::Idle);
        };

        let mut packet = match input {
            PendingInput::Packet(packet) => {
                if state.segment.is_new_segment(&packet, codec, play_dir < 0, state.packet_fed) {
                    trace!(target: target, "new segment at pts={:?}, draining codec", packet.pts);
                    state.segment.begin_drain(packet);
                    None
                } else {
                    Some(packet)
                }
            }
            PendingInput::EndOfStream => None,
        };

        if backend.is_video() && options.framedrop {
            let hint = framedrop_hint(
                state.effective_start_pts(),
                packet.as_ref().and_then(|p| p.pts),
                play_dir,
                attempt_framedrops,
                state.packet_pts.is_good() && !state.packet_pts_missing,
                options.framedrop_slack,
            );
            backend.codec_mut().control(ControlCommand::SetFramedrop(hint));
        }

        if let Some(recorder) = recorder {
            recorder.record(packet.as_ref());
        }

        if let Some(packet) = packet.as_mut() {
            if packet.pts.is_none() {
                state.packet_pts.mark_broken();
                state.packet_pts_missing = true;
            } else {
                state.packet_pts_missing = false;
            }

            if state.first_packet_pdts.is_none() {
                state.first_packet_pdts = packet.pdts();
            }

            if packet.dts.is_none() && !codec.decode_order_pts {
                packet.dts = packet.pts;
            }

            if packet.back_preroll {
                state.preroll_discard = true;
                packet.pts = None;
                packet.dts = None;
            }
        }

        backend.codec_mut().feed(packet)?;
        state.packet_fed = true;
        state.packets_without_output += 1;

        Ok(FeedOutcome::Fed)
    }
}
