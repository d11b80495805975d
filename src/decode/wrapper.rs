use super::coverart::CoverArtLatch;
use super::feed::{FeedOutcome, Feeder};
use super::params::ImageParamsFixer;
use super::reverse::ReversalQueue;
use super::segment::SegmentPhase;
use super::state::{DecodeState, PendingInput};
use super::timestamp::{correct_audio_pts, AudioClock, PacketPtsHealth, VideoClock, VideoPtsRepair};
use super::{Advance, DecoderContext};
use crate::av::{
    CaptionSink, CodecParams, Frame, ImageParams, OutputPort, Packet, PacketRecorder, PacketSource, StreamHeader,
    StreamKind,
};
use crate::codec::{CodecRegistry, ControlCommand, ControlResult, DecoderBackend};
use crate::config::{DecoderOptions, SharedOptions};
use crate::error::{DecodeError, Result};
use log::{debug, error, info, trace, warn};
use std::sync::Arc;

/// Decode stage for one stream.
///
/// Owns the codec, the packet source and the output port for its lifetime.
/// Options are re-read at the start of every [`advance`](Self::advance).
pub struct DecoderWrapper {
    target: String,
    options: SharedOptions,
    header: StreamHeader,
    codec_params: Arc<CodecParams>,
    registry: Arc<CodecRegistry>,
    backend: Option<DecoderBackend>,
    decoder_desc: Option<String>,
    try_passthrough: bool,

    source: Box<dyn PacketSource>,
    output: Box<dyn OutputPort>,
    captions: Option<Box<dyn CaptionSink>>,
    recorder: Option<Box<dyn PacketRecorder>>,

    state: DecodeState,
    reverse: ReversalQueue,
    coverart: CoverArtLatch,
    image: ImageParamsFixer,

    play_dir: i8,
    fps: f64,
    /// Output clock: pts of the last emitted frame (audio: its end).
    pts: Option<f64>,
    attempt_framedrops: u32,
    dropped_frames: u64,
    pts_reset: bool,

    fatal: Option<DecodeError>,
    input_failed: bool,
    eof: bool,
}

impl DecoderWrapper {
    /// Creates the stage and opens a decoder for `header`.
    ///
    /// Fails with [`DecodeError::CodecInit`] if no registered decoder could
    /// be opened.
    pub fn new<S, O>(
        ctx: DecoderContext,
        header: StreamHeader,
        source: S,
        output: O,
        registry: Arc<CodecRegistry>,
    ) -> Result<Self>
    where
        S: PacketSource + 'static,
        O: OutputPort + 'static,
    {
        let target = ctx.log_target.unwrap_or_else(|| {
            match header.kind {
                StreamKind::Video => "vdkdec::vd",
                StreamKind::Audio => "vdkdec::ad",
            }
            .to_string()
        });

        let options = ctx.options.read().clone();
        let codec_params = header.codec.clone();

        let mut fps = 0.0;
        if header.kind == StreamKind::Video {
            fps = codec_params.fps;
            debug!(target: target.as_str(), "Container reported FPS: {}", fps);

            if let Some(forced) = options.force_fps {
                fps = forced;
                info!(target: target.as_str(), "FPS forced to {:.3}.", fps);
            }
        }

        let mut wrapper = Self {
            target,
            options: ctx.options,
            reverse: ReversalQueue::new(reverse_capacity(header.kind, &options)),
            header,
            codec_params,
            registry,
            backend: None,
            decoder_desc: None,
            try_passthrough: true,
            source: Box::new(source),
            output: Box::new(output),
            captions: None,
            recorder: None,
            state: DecodeState::new(),
            coverart: CoverArtLatch::new(),
            image: ImageParamsFixer::new(),
            play_dir: 1,
            fps,
            pts: None,
            attempt_framedrops: 0,
            dropped_frames: 0,
            pts_reset: false,
            fatal: None,
            input_failed: false,
            eof: false,
        };

        wrapper.reinit()?;
        Ok(wrapper)
    }

    /// Forwards closed captions found in decoded video to `sink`.
    pub fn with_caption_sink(mut self, sink: impl CaptionSink + 'static) -> Self {
        self.captions = Some(Box::new(sink));
        self
    }

    /// Copies every unit fed to the codec to `recorder`.
    pub fn with_recorder(mut self, recorder: impl PacketRecorder + 'static) -> Self {
        self.recorder = Some(Box::new(recorder));
        self
    }

    /// (Re)opens the decoder for the current codec parameters.
    ///
    /// Candidates are tried in order; the first one that opens wins. Any
    /// previous codec instance is dropped first.
    pub fn reinit(&mut self) -> Result<()> {
        self.backend = None;
        self.decoder_desc = None;
        self.fatal = None;

        self.reset_decoder();
        self.state.packet_pts = PacketPtsHealth::warmup();

        let options = self.options.read().clone();
        let params = Arc::clone(&self.codec_params);
        let registry = Arc::clone(&self.registry);

        let preferred = match params.kind {
            StreamKind::Video => &options.video_decoders,
            StreamKind::Audio => &options.audio_decoders,
        };
        let passthrough: &[String] = if self.try_passthrough {
            &options.audio_passthrough
        } else {
            &[]
        };

        let candidates = registry.select(&params, preferred, passthrough);
        debug!(
            target: self.target.as_str(),
            "Codec list: [{}]",
            candidates.iter().map(|e| e.desc()).collect::<Vec<_>>().join(", ")
        );

        for entry in candidates {
            debug!(target: self.target.as_str(), "Opening decoder {}", entry.name);
            match entry.create(&params) {
                Ok(backend) => {
                    let desc = entry.desc();
                    debug!(target: self.target.as_str(), "Selected codec: {}", desc);
                    self.backend = Some(backend);
                    self.decoder_desc = Some(desc);
                    return Ok(());
                }
                Err(err) => warn!(target: self.target.as_str(), "Decoder init failed for {}: {}", entry.name, err),
            }
        }

        let err = DecodeError::CodecInit {
            codec: params.codec.clone(),
        };
        error!(target: self.target.as_str(), "{}", err);
        self.fatal = Some(err.clone());
        Err(err)
    }

    /// Runs one step: feed the codec, then move one frame out.
    pub fn advance(&mut self) -> Advance {
        if self.fatal.is_some() {
            return Advance::Failed;
        }

        let options = self.options.read().clone();
        self.reverse.set_capacity(reverse_capacity(self.header.kind, &options));

        let fed = self.feed_packet(&options);
        let read = self.fatal.is_none() && self.read_frame(&options);

        if self.fatal.is_some() {
            Advance::Failed
        } else if fed || read {
            Advance::Progressed
        } else {
            Advance::NoDataYet
        }
    }

    fn feed_packet(&mut self, options: &DecoderOptions) -> bool {
        if self.coverart.is_latched() {
            return false;
        }
        let Some(backend) = self.backend.as_mut() else {
            return false;
        };

        let feeder = Feeder {
            backend,
            source: self.source.as_mut(),
            recorder: self.recorder.as_deref_mut(),
            state: &mut self.state,
            codec: &self.codec_params,
            options,
            play_dir: self.play_dir,
            attempt_framedrops: self.attempt_framedrops,
            target: &self.target,
        };

        match feeder.feed() {
            Ok(FeedOutcome::Idle) => false,
            Ok(FeedOutcome::Fed) => true,
            Ok(FeedOutcome::Rejected(_)) => {
                self.input_failed = true;
                true
            }
            Err(err) => {
                error!(target: self.target.as_str(), "{}", err);
                self.fatal = Some(err);
                true
            }
        }
    }

    fn read_frame(&mut self, options: &DecoderOptions) -> bool {
        if self.backend.is_none() || !self.output.needs_data() {
            return false;
        }

        if self.coverart.is_latched() {
            return match self.coverart.next() {
                Some(frame) => {
                    self.emit(frame, options);
                    true
                }
                None => false,
            };
        }

        if self.reverse.is_complete() {
            if let Some(frame) = self.reverse.drain() {
                self.emit(frame, options);
                return true;
            }
        }

        let Some(frame) = self.backend.as_mut().and_then(|b| b.codec_mut().try_read_frame()) else {
            return false;
        };

        if self.header.attached_picture {
            if let Frame::Video(picture) = frame {
                self.coverart.latch(picture);
                if let Some(frame) = self.coverart.next() {
                    self.emit(frame, options);
                }
                return true;
            }
        }

        if self.attempt_framedrops > 0 {
            let dropped = self.state.packets_without_output.saturating_sub(1);
            self.attempt_framedrops = self.attempt_framedrops.saturating_sub(dropped);
            self.dropped_frames += dropped as u64;
        }
        self.state.packets_without_output = 0;

        if self.state.preroll_discard && !frame.is_eof() {
            if frame.pts().is_none() {
                trace!(target: self.target.as_str(), "discarding preroll {} frame", frame.type_name());
                return true;
            }
            self.state.preroll_discard = false;
        }

        let (mut frame, segment_ended) = match self.process_decoded_frame(frame) {
            Ok(processed) => processed,
            Err(err) => {
                error!(target: self.target.as_str(), "{}", err);
                self.fatal = Some(err);
                return true;
            }
        };

        if self.play_dir < 0 {
            if let Some(frame) = frame.take() {
                if let Err(err) = self.reverse.enqueue(frame) {
                    warn!(target: self.target.as_str(), "{}", err);
                }
            }
        }

        if segment_ended && self.state.segment.is_draining() {
            self.switch_segment();
        }

        if let Some(frame) = frame {
            self.emit(frame, options);
        }
        true
    }

    /// Decode-side fixups. Returns the frame (unless dropped) and whether the
    /// current segment has ended.
    fn process_decoded_frame(&mut self, frame: Frame) -> Result<(Option<Frame>, bool)> {
        match frame {
            Frame::EndOfStream => {
                // end of a drained segment, not of the stream
                if self.state.segment.is_draining() {
                    Ok((None, true))
                } else {
                    Ok((Some(Frame::EndOfStream), true))
                }
            }
            Frame::Video(mut video) => {
                self.state.video_pts.repair(&mut video, &mut self.state.packet_pts);

                if self.codec_params.decode_order_pts && video.pts.is_some() && self.fps > 0.0 {
                    let reply = self
                        .backend
                        .as_mut()
                        .map(|b| b.codec_mut().control(ControlCommand::QueryReorderDelay));
                    if let Some(ControlResult::ReorderDelay(delay)) = reply {
                        VideoPtsRepair::compensate_reorder_delay(&mut video, delay, self.fps);
                    }
                }

                if let Some(captions) = video.captions.take() {
                    if let Some(sink) = self.captions.as_mut() {
                        let mut packet = Packet::new(captions);
                        packet.pts = video.pts;
                        packet.dts = video.dts;
                        sink.feed_caption(packet);
                    }
                }

                // hr-seek is over once the target is reached
                let reached = match (video.pts, self.state.start_pts) {
                    (Some(pts), Some(start)) => pts >= start,
                    _ => true,
                };
                if reached {
                    self.state.start_pts = None;
                }

                let (discard, ended) = self.state.segment.check_video(video.pts);
                Ok((if discard { None } else { Some(Frame::Video(video)) }, ended))
            }
            Frame::Audio(mut audio) => {
                let ended = self.state.segment.clip_audio(&mut audio);
                if audio.data.is_empty() {
                    Ok((None, ended))
                } else {
                    Ok((Some(Frame::Audio(audio)), ended))
                }
            }
            Frame::Packet(_) => Err(DecodeError::UnknownFrameType("decoder".to_string())),
        }
    }

    /// Starts the segment whose first packet was held back, now that the
    /// codec has drained the previous one.
    fn switch_segment(&mut self) {
        let Some(next) = self.state.segment.take_next() else {
            return;
        };

        self.reset_decoder();
        self.state.segment.set_reinitializing(true);

        if let Some(segment) = next.segment.clone() {
            debug!(
                target: self.target.as_str(),
                "starting segment [{:?}, {:?})", segment.start, segment.end
            );
            if *segment.codec != *self.codec_params {
                self.codec_params = segment.codec;
                if self.reinit().is_err() {
                    self.state.segment.set_reinitializing(true);
                    return;
                }
            }
            self.state.segment.set_window(segment.start, segment.end);
        }

        self.reverse.seal();
        self.state.pending = Some(PendingInput::Packet(next));
        self.state.segment.set_reinitializing(false);
    }

    /// Output-side fixups, then hands the frame to the consumer.
    fn emit(&mut self, mut frame: Frame, options: &DecoderOptions) {
        match &mut frame {
            Frame::Video(video) => {
                let clock = VideoClock {
                    play_dir: self.play_dir,
                    correct_pts: options.correct_pts,
                    fps: self.fps,
                    default_fps: options.default_fps,
                    first_packet_pdts: self.state.first_packet_pdts,
                };
                self.state.video_pts.correct_output(video, &mut self.pts, &clock, &self.target);
                self.image.apply(video, &self.codec_params, options, &self.target);
                video.nominal_fps = self.fps;
            }
            Frame::Audio(audio) => {
                if self.play_dir < 0 {
                    audio.reverse();
                }
                let clock = AudioClock {
                    play_dir: self.play_dir,
                    jump_threshold: options.audio_jump_threshold,
                    reset_threshold: options.audio_reset_threshold,
                    interp_tolerance: options.audio_interp_tolerance,
                    missing_timestamps: self.header.missing_timestamps,
                };
                if correct_audio_pts(audio, &mut self.pts, &clock, &self.target) {
                    self.pts_reset = true;
                }
            }
            Frame::EndOfStream => self.eof = true,
            Frame::Packet(_) => {}
        }

        trace!(target: self.target.as_str(), "output {} pts={:?}", frame.type_name(), frame.pts());
        self.output.write(frame);
    }

    /// Drops everything inside the codec and the per-codec bookkeeping.
    fn reset_decoder(&mut self) {
        self.state.reset();
        if let Some(backend) = self.backend.as_mut() {
            backend.codec_mut().reset();
        }
    }

    /// Full reset, e.g. on seek. The codec instance is kept.
    pub fn reset(&mut self) {
        self.pts = None;
        self.image.reset();
        self.dropped_frames = 0;
        self.attempt_framedrops = 0;
        self.pts_reset = false;
        self.coverart.reset();
        self.reverse.reset();
        self.input_failed = false;
        self.eof = false;
        self.reset_decoder();
    }

    /// Sets the playback direction; negative means backward. Leaving
    /// backward mode discards the reversal queue.
    pub fn set_play_dir(&mut self, dir: i8) {
        self.play_dir = if dir < 0 { -1 } else { 1 };
        if self.play_dir > 0 {
            self.reverse.reset();
        }
    }

    /// Current playback direction, 1 or -1.
    pub fn play_dir(&self) -> i8 {
        self.play_dir
    }

    /// Sets the hr-seek target. Frames before it may be hard-dropped.
    pub fn set_start_pts(&mut self, pts: Option<f64>) {
        self.state.start_pts = pts;
    }

    /// Asks the codec to skip up to `frames` frames (soft framedrop).
    pub fn set_attempt_framedrops(&mut self, frames: u32) {
        self.attempt_framedrops = frames;
    }

    /// Soft framedrops still requested.
    pub fn attempt_framedrops(&self) -> u32 {
        self.attempt_framedrops
    }

    /// Whether bitstream passthrough may be picked on the next `reinit`.
    pub fn set_try_passthrough(&mut self, enable: bool) {
        self.try_passthrough = enable;
    }

    /// Frames the codec skipped since the last reset.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    /// Returns and clears the audio pts reset notification.
    pub fn take_pts_reset(&mut self) -> bool {
        std::mem::take(&mut self.pts_reset)
    }

    /// `"name (description)"` of the open decoder.
    pub fn decoder_desc(&self) -> Option<&str> {
        self.decoder_desc.as_deref()
    }

    /// Parameters of the current codec configuration.
    pub fn codec_params(&self) -> &CodecParams {
        &self.codec_params
    }

    /// Stream header the stage was created with.
    pub fn header(&self) -> &StreamHeader {
        &self.header
    }

    /// The fatal error this instance stopped on.
    pub fn error(&self) -> Option<&DecodeError> {
        self.fatal.as_ref()
    }

    /// Whether the instance failed: fatally, or because the source sent
    /// malformed data since the last reset.
    pub fn failed(&self) -> bool {
        self.fatal.is_some() || self.input_failed
    }

    /// Whether end-of-stream has been handed to the consumer.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Frame rate used for made-up timestamps; 0 if unknown.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Image parameters as reported by the decoder before any fixups.
    pub fn decoder_format(&self) -> ImageParams {
        self.image.decoder_format()
    }

    /// Re-derives output image parameters on the next frame, e.g. after the
    /// aspect or rotation options changed.
    pub fn reset_params(&mut self) {
        self.image.invalidate();
    }

    /// Where the stage is with respect to segment switching.
    pub fn segment_phase(&self) -> SegmentPhase {
        self.state.segment.phase()
    }

    /// Whether demuxer pts are currently trusted.
    pub fn packet_pts_health(&self) -> PacketPtsHealth {
        self.state.packet_pts
    }

    /// Frames held for backward playback.
    pub fn reverse_queue(&self) -> &ReversalQueue {
        &self.reverse
    }

    /// Passes a control request straight to the codec.
    pub fn control(&mut self, cmd: ControlCommand) -> ControlResult {
        match self.backend.as_mut() {
            Some(backend) => backend.codec_mut().control(cmd),
            None => ControlResult::Unsupported,
        }
    }
}

fn reverse_capacity(kind: StreamKind, options: &DecoderOptions) -> usize {
    match kind {
        StreamKind::Video => options.video_reverse_size,
        StreamKind::Audio => options.audio_reverse_size,
    }
}

impl std::fmt::Debug for DecoderWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderWrapper")
            .field("target", &self.target)
            .field("codec", &self.codec_params.codec)
            .field("decoder", &self.decoder_desc)
            .field("play_dir", &self.play_dir)
            .field("phase", &self.segment_phase())
            .field("fatal", &self.fatal)
            .finish()
    }
}
