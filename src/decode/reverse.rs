use crate::av::Frame;
use crate::error::{DecodeError, Result};
use std::collections::VecDeque;

/// Byte-bounded queue re-presenting decoded frames in reverse order.
///
/// Frames are collected in decode order while a backward step is decoded.
/// Once the step's end-of-stream (really: beginning of stream) arrives, or the
/// step is sealed on a segment switch, the queue is complete and hands frames
/// out newest first; the end-of-stream marker comes out last.
#[derive(Debug)]
pub struct ReversalQueue {
    frames: VecDeque<Frame>,
    byte_size: usize,
    capacity: usize,
    complete: bool,
}

impl ReversalQueue {
    /// Empty queue holding at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: VecDeque::new(),
            byte_size: 0,
            capacity,
            complete: false,
        }
    }

    /// Changes the limit; queued frames are kept.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    /// Queues a frame. Fails, dropping the frame, if it would push the queue
    /// over capacity. End-of-stream is always accepted and completes the queue.
    pub fn enqueue(&mut self, frame: Frame) -> Result<()> {
        if frame.is_eof() {
            self.frames.push_front(frame);
            self.complete = true;
            return Ok(());
        }

        let size = frame.approx_size();
        if self.byte_size + size > self.capacity {
            return Err(DecodeError::ReversalQueueOverflow {
                size: self.byte_size,
                capacity: self.capacity,
            });
        }

        self.byte_size += size;
        self.frames.push_back(frame);
        Ok(())
    }

    /// Marks the queue complete if it holds anything.
    pub fn seal(&mut self) {
        self.complete = !self.frames.is_empty();
    }

    /// Next frame in reverse order, once the queue is complete.
    ///
    /// Draining the last frame clears the complete flag.
    pub fn drain(&mut self) -> Option<Frame> {
        if !self.complete {
            return None;
        }
        let frame = self.frames.pop_back();
        if let Some(f) = &frame {
            if !f.is_eof() {
                self.byte_size -= f.approx_size();
            }
        }
        if self.frames.is_empty() {
            self.complete = false;
        }
        frame
    }

    /// Drops all frames.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.byte_size = 0;
        self.complete = false;
    }

    /// Whether the queue hands out frames.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Whether no frame is queued.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of queued frames, end-of-stream included.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Approximate bytes queued.
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    /// Current limit in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
