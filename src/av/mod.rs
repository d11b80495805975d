//! Media data model and the ports connecting the decode stage to its
//! neighbours.

mod frame;
mod packet;
mod stream;

pub use frame::*;
pub use packet::*;
pub use stream::*;

/// Demuxer side of the stage. Never blocks.
pub trait PacketSource {
    /// Next packet, or `None` if nothing is available right now.
    fn try_read(&mut self) -> Option<Packet>;

    /// Whether the source has nothing more to deliver (until the next reset).
    fn at_eof(&self) -> bool;
}

/// Consumer side of the stage.
pub trait OutputPort {
    /// Whether the consumer accepts another frame now.
    fn needs_data(&self) -> bool;

    /// Hands over a frame. Only called after `needs_data` returned true.
    fn write(&mut self, frame: Frame);
}

/// Receives closed-caption payloads extracted from decoded video.
pub trait CaptionSink {
    /// `packet` carries the caption bytes with the frame's corrected timestamps.
    fn feed_caption(&mut self, packet: Packet);
}

/// Receives a verbatim copy of every unit fed to the codec.
pub trait PacketRecorder {
    /// `None` marks end of stream.
    fn record(&mut self, packet: Option<&Packet>);
}
