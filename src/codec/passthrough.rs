use super::{Codec, ControlCommand, ControlResult};
use crate::av::{AudioFrame, CodecParams, Frame, Packet};
use crate::error::{DecodeError, Result};
use std::collections::VecDeque;

/// Bytes per sample frame of the passthrough carrier (2 channels, 16 bit).
const CARRIER_CHANNELS: u16 = 2;
const CARRIER_BYTES_PER_SAMPLE: u16 = 2;

/// Forwards compressed audio untouched for an external decoder (e.g. an AV
/// receiver), packaged as frames of a 2ch/16-bit carrier.
#[derive(Debug)]
pub struct PassthroughCodec {
    codec: String,
    sample_rate: u32,
    pending: VecDeque<Frame>,
    draining: bool,
    eof_returned: bool,
}

impl PassthroughCodec {
    /// Carrier for `params.codec` at the stream sample rate.
    pub fn new(params: &CodecParams) -> Self {
        Self {
            codec: params.codec.clone(),
            sample_rate: params.sample_rate,
            pending: VecDeque::new(),
            draining: false,
            eof_returned: false,
        }
    }

    /// Name of the forwarded codec.
    pub fn codec_name(&self) -> &str {
        &self.codec
    }
}

impl Codec for PassthroughCodec {
    fn needs_input(&self) -> bool {
        self.pending.is_empty() && !self.draining
    }

    fn feed(&mut self, packet: Option<Packet>) -> Result<()> {
        if self.draining {
            return Err(DecodeError::Codec(format!("{}: input after end of stream", self.codec)));
        }
        match packet {
            Some(packet) => {
                let frame = AudioFrame::new(packet.data, self.sample_rate, CARRIER_CHANNELS, CARRIER_BYTES_PER_SAMPLE)
                    .with_pts(packet.pts);
                self.pending.push_back(Frame::Audio(frame));
            }
            None => self.draining = true,
        }
        Ok(())
    }

    fn try_read_frame(&mut self) -> Option<Frame> {
        if let Some(frame) = self.pending.pop_front() {
            return Some(frame);
        }
        if self.draining && !self.eof_returned {
            self.eof_returned = true;
            return Some(Frame::EndOfStream);
        }
        None
    }

    fn control(&mut self, cmd: ControlCommand) -> ControlResult {
        match cmd {
            ControlCommand::QueryReorderDelay => ControlResult::ReorderDelay(0),
            ControlCommand::SetFramedrop(_) => ControlResult::Unsupported,
        }
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.draining = false;
        self.eof_returned = false;
    }
}
