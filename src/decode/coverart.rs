use crate::av::{Frame, VideoFrame};

/// What the latch has handed out so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverArtState {
    /// Nothing yet.
    #[default]
    NotReturned,
    /// The picture went out.
    FrameReturned,
    /// The picture and the end-of-stream went out.
    EofReturned,
}

/// Holds the single picture of an attached-picture stream and hands it out
/// once, followed by one end-of-stream.
#[derive(Debug, Default)]
pub struct CoverArtLatch {
    frame: Option<VideoFrame>,
    state: CoverArtState,
}

impl CoverArtLatch {
    /// Empty latch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a picture is held; the codec is not consulted any more then.
    pub fn is_latched(&self) -> bool {
        self.frame.is_some()
    }

    /// Current output state.
    pub fn state(&self) -> CoverArtState {
        self.state
    }

    /// Keeps the first decoded picture. Later pictures are ignored.
    pub fn latch(&mut self, frame: VideoFrame) {
        if self.frame.is_none() {
            self.frame = Some(frame);
        }
    }

    /// Next output: the picture, then end-of-stream, then nothing.
    pub fn next(&mut self) -> Option<Frame> {
        let frame = self.frame.as_ref()?;
        match self.state {
            CoverArtState::NotReturned => {
                self.state = CoverArtState::FrameReturned;
                Some(Frame::Video(frame.clone()))
            }
            CoverArtState::FrameReturned => {
                self.state = CoverArtState::EofReturned;
                Some(Frame::EndOfStream)
            }
            CoverArtState::EofReturned => None,
        }
    }

    /// Releases the picture and rewinds.
    pub fn reset(&mut self) {
        self.frame = None;
        self.state = CoverArtState::NotReturned;
    }
}
