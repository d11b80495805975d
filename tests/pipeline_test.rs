#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use vdkdec::av::{
        AudioFrame, CaptionSink, CodecParams, Frame, ImageParams, OutputPort, Packet, PacketSource, SegmentInfo,
        StreamHeader, StreamKind, VideoFrame,
    };
    use vdkdec::codec::{Codec, CodecRegistry, ControlCommand, ControlResult, FramedropHint};
    use vdkdec::config::{DecoderOptions, SharedOptions};
    use vdkdec::decode::{Advance, DecoderContext, DecoderWrapper, SegmentPhase};
    use vdkdec::error::{DecodeError, Result};
    use vdkdec::runner::run_until_stalled;

    #[derive(Default)]
    struct SourceState {
        packets: VecDeque<Packet>,
        eof: bool,
    }

    #[derive(Clone, Default)]
    struct Source(Arc<Mutex<SourceState>>);

    impl Source {
        fn push(&self, packet: Packet) {
            self.0.lock().packets.push_back(packet);
        }

        fn finish(&self) {
            self.0.lock().eof = true;
        }

        fn remaining(&self) -> usize {
            self.0.lock().packets.len()
        }
    }

    impl PacketSource for Source {
        fn try_read(&mut self) -> Option<Packet> {
            self.0.lock().packets.pop_front()
        }

        fn at_eof(&self) -> bool {
            let state = self.0.lock();
            state.eof && state.packets.is_empty()
        }
    }

    #[derive(Clone)]
    struct Output {
        frames: Arc<Mutex<Vec<Frame>>>,
        accept: Arc<AtomicBool>,
    }

    impl Output {
        fn new() -> Self {
            Self {
                frames: Arc::new(Mutex::new(Vec::new())),
                accept: Arc::new(AtomicBool::new(true)),
            }
        }

        fn pts(&self) -> Vec<Option<f64>> {
            self.frames.lock().iter().map(|f| f.pts()).collect()
        }

        fn kinds(&self) -> Vec<&'static str> {
            self.frames.lock().iter().map(|f| f.type_name()).collect()
        }
    }

    impl OutputPort for Output {
        fn needs_data(&self) -> bool {
            self.accept.load(Ordering::SeqCst)
        }

        fn write(&mut self, frame: Frame) {
            self.frames.lock().push(frame);
        }
    }

    #[derive(Clone, Default)]
    struct Captions(Arc<Mutex<Vec<(Bytes, Option<f64>)>>>);

    impl CaptionSink for Captions {
        fn feed_caption(&mut self, packet: Packet) {
            self.0.lock().push((packet.data, packet.pts));
        }
    }

    #[derive(Clone, Default)]
    struct CodecLog {
        created: Arc<AtomicUsize>,
        fed: Arc<Mutex<Vec<Option<u8>>>>,
        hints: Arc<Mutex<Vec<FramedropHint>>>,
    }

    /// One output frame per input packet. The second data byte selects
    /// extras: `c` attaches captions, `p` hands back the packet itself.
    /// Packets fed under a soft framedrop hint produce nothing.
    struct MockCodec {
        kind: StreamKind,
        log: CodecLog,
        out: VecDeque<Frame>,
        draining: bool,
        hint: FramedropHint,
        reorder_delay: i32,
    }

    impl MockCodec {
        fn new(kind: StreamKind, log: &CodecLog) -> Self {
            log.created.fetch_add(1, Ordering::SeqCst);
            Self {
                kind,
                log: log.clone(),
                out: VecDeque::new(),
                draining: false,
                hint: FramedropHint::None,
                reorder_delay: 0,
            }
        }

        fn with_reorder_delay(mut self, frames: i32) -> Self {
            self.reorder_delay = frames;
            self
        }
    }

    impl Codec for MockCodec {
        fn needs_input(&self) -> bool {
            self.out.is_empty() && !self.draining
        }

        fn feed(&mut self, packet: Option<Packet>) -> Result<()> {
            self.log.fed.lock().push(packet.as_ref().and_then(|p| p.data.first().copied()));

            let Some(packet) = packet else {
                self.draining = true;
                self.out.push_back(Frame::EndOfStream);
                return Ok(());
            };

            if self.hint == FramedropHint::Soft {
                return Ok(());
            }

            let frame = match (self.kind, packet.data.get(1).copied()) {
                (StreamKind::Video, Some(b'p')) => Frame::Packet(packet),
                (StreamKind::Video, extra) => {
                    let mut frame = VideoFrame::new(vec![packet.data.clone()], ImageParams::new(4, 4))
                        .with_pts(packet.pts)
                        .with_dts(packet.dts);
                    if extra == Some(b'c') {
                        frame = frame.with_captions(Bytes::from_static(b"cc"));
                    }
                    Frame::Video(frame)
                }
                // 40 ms of mono 8-bit audio, a ramp so the sample order shows
                (StreamKind::Audio, _) => {
                    let ramp: Vec<u8> = (0..40).collect();
                    Frame::Audio(AudioFrame::new(ramp, 1000, 1, 1).with_pts(packet.pts))
                }
            };
            self.out.push_back(frame);
            Ok(())
        }

        fn try_read_frame(&mut self) -> Option<Frame> {
            self.out.pop_front()
        }

        fn control(&mut self, cmd: ControlCommand) -> ControlResult {
            match cmd {
                ControlCommand::SetFramedrop(hint) => {
                    self.hint = hint;
                    self.log.hints.lock().push(hint);
                    ControlResult::Ok
                }
                ControlCommand::QueryReorderDelay => ControlResult::ReorderDelay(self.reorder_delay),
            }
        }

        fn reset(&mut self) {
            self.out.clear();
            self.draining = false;
        }
    }

    fn registry(log: &CodecLog) -> CodecRegistry {
        let mut registry = CodecRegistry::new();
        for (kind, codec, name) in [
            (StreamKind::Video, "h264", "mockvid"),
            (StreamKind::Video, "hevc", "mockhevc"),
            (StreamKind::Audio, "aac", "mockaud"),
            (StreamKind::Audio, "ac3", "mockac3"),
        ] {
            let log = log.clone();
            registry.register(kind, codec, name, "mock decoder", move |_| Ok(Box::new(MockCodec::new(kind, &log))));
        }
        let reorder_log = log.clone();
        registry.register(StreamKind::Video, "mpeg4", "mockreorder", "mock decoder", move |_| {
            Ok(Box::new(MockCodec::new(StreamKind::Video, &reorder_log).with_reorder_delay(2)))
        });
        registry.register_passthrough("ac3");
        registry
    }

    struct Harness {
        source: Source,
        output: Output,
        log: CodecLog,
        options: SharedOptions,
        wrapper: DecoderWrapper,
    }

    impl Harness {
        fn new(header: StreamHeader, options: DecoderOptions) -> Self {
            let log = CodecLog::default();
            let registry = registry(&log);
            Self::with_registry(header, options, log, registry)
        }

        fn with_registry(header: StreamHeader, options: DecoderOptions, log: CodecLog, registry: CodecRegistry) -> Self {
            let source = Source::default();
            let output = Output::new();
            let options = options.into_shared();
            let wrapper = DecoderWrapper::new(
                DecoderContext::new(options.clone()),
                header,
                source.clone(),
                output.clone(),
                Arc::new(registry),
            )
            .unwrap();
            Self {
                source,
                output,
                log,
                options,
                wrapper,
            }
        }

        fn run(&mut self) -> Advance {
            run_until_stalled(&mut self.wrapper)
        }
    }

    fn h264() -> CodecParams {
        CodecParams::video("h264", 25.0)
    }

    fn packet(id: u8, pts: Option<f64>) -> Packet {
        let mut packet = Packet::new(vec![id]);
        packet.pts = pts;
        packet
    }

    fn segment_packet(id: u8, pts: f64, start: f64, end: f64, codec: &Arc<CodecParams>) -> Packet {
        packet(id, Some(pts)).with_segment(SegmentInfo::new(Some(start), Some(end), codec.clone()))
    }

    fn assert_close(actual: &[Option<f64>], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
        for (a, e) in actual.iter().zip(expected) {
            let a = a.expect("frame without pts");
            assert!((a - e).abs() < 1e-9, "{:?} vs {:?}", actual, expected);
        }
    }

    #[test]
    fn test_broken_pts_falls_back_to_dts() {
        let mut h = Harness::new(StreamHeader::new(h264()), DecoderOptions::default());
        let dts: Vec<f64> = (0..10).map(|i| i as f64 * 0.04).collect();
        for (i, &d) in dts.iter().enumerate() {
            h.source.push(packet(i as u8, None).with_dts(d));
        }
        h.source.finish();

        assert_eq!(h.run(), Advance::NoDataYet);

        let mut expected: Vec<Option<f64>> = dts.iter().map(|&d| Some(d)).collect();
        expected.push(None);
        assert_eq!(h.output.pts(), expected);
        assert!(h.wrapper.is_eof());
        assert!(!h.wrapper.packet_pts_health().is_good());
    }

    #[test]
    fn test_audio_jump_raises_one_reset() {
        let header = StreamHeader::new(CodecParams::audio("aac", 1000, 1));
        let mut h = Harness::new(header, DecoderOptions::default());

        let mut resets = Vec::new();
        for (i, pts) in [0.0, 0.04, 0.08, 5.2].into_iter().enumerate() {
            h.source.push(packet(i as u8, Some(pts)));
            h.run();
            resets.push(h.wrapper.take_pts_reset());
        }

        assert_eq!(resets, vec![false, false, false, true]);
        assert_close(&h.output.pts(), &[0.0, 0.04, 0.08, 5.2]);
    }

    #[test]
    fn test_segment_switch_keeps_codec() {
        let codec = Arc::new(h264());
        let mut h = Harness::new(StreamHeader::new(h264()), DecoderOptions::default());

        for i in 0..5u8 {
            h.source.push(segment_packet(i, i as f64, 0.0, 5.0, &codec));
        }
        h.source.push(segment_packet(5, 5.0, 5.0, 10.0, &codec));
        h.source.push(segment_packet(6, 6.0, 5.0, 10.0, &codec));
        h.source.finish();

        assert_eq!(h.run(), Advance::NoDataYet);

        let pts = h.output.pts();
        assert_eq!(
            pts,
            vec![Some(0.0), Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0), Some(6.0), None]
        );
        assert_eq!(h.log.created.load(Ordering::SeqCst), 1);
        assert_eq!(h.wrapper.segment_phase(), SegmentPhase::Active);

        // every packet fed exactly once; drains show up as None
        assert_eq!(
            *h.log.fed.lock(),
            vec![
                None,
                Some(0),
                Some(1),
                Some(2),
                Some(3),
                Some(4),
                None,
                Some(5),
                Some(6),
                None
            ]
        );
    }

    #[test]
    fn test_segment_switch_clips_and_swaps_codec() {
        let first = Arc::new(h264());
        let second = Arc::new(CodecParams::video("hevc", 25.0));
        let mut h = Harness::new(StreamHeader::new(h264()), DecoderOptions::default());

        // 5.5 lies past the first segment's end and is cut
        h.source.push(segment_packet(0, 4.0, 0.0, 5.0, &first));
        h.source.push(segment_packet(1, 5.5, 0.0, 5.0, &first));
        // 4.5 lies before the second segment's start
        h.source.push(segment_packet(2, 4.5, 5.0, 10.0, &second));
        h.source.push(segment_packet(3, 5.0, 5.0, 10.0, &second));
        h.source.finish();

        h.run();

        assert_eq!(h.output.pts(), vec![Some(4.0), Some(5.0), None]);
        assert_eq!(h.log.created.load(Ordering::SeqCst), 2);
        assert_eq!(h.wrapper.codec_params().codec, "hevc");
        assert_eq!(h.wrapper.decoder_desc(), Some("mockhevc (mock decoder)"));
    }

    #[test]
    fn test_segment_switch_to_unknown_codec_is_fatal() {
        let mut h = Harness::new(StreamHeader::new(h264()), DecoderOptions::default());
        let unknown = Arc::new(CodecParams::video("vp9", 25.0));
        h.source.push(segment_packet(0, 0.0, 0.0, 5.0, &unknown));

        assert_eq!(h.run(), Advance::Failed);
        assert!(h.wrapper.failed());
        assert_eq!(h.wrapper.error(), Some(&DecodeError::CodecInit { codec: "vp9".into() }));
        assert_eq!(h.wrapper.segment_phase(), SegmentPhase::Reinitializing);
        assert_eq!(h.wrapper.advance(), Advance::Failed);
    }

    #[test]
    fn test_reverse_playback_with_overflow() {
        let frame_size = Frame::Video(VideoFrame::new(vec![Bytes::from(vec![0u8])], ImageParams::new(4, 4))).approx_size();
        let options = DecoderOptions::default().with_reverse_sizes(frame_size * 3, frame_size * 3);
        let mut h = Harness::new(StreamHeader::new(h264()), options);
        h.wrapper.set_play_dir(-1);

        for i in 0..5u8 {
            h.source.push(packet(i, Some(i as f64)));
        }
        h.source.finish();
        h.run();

        assert_eq!(h.output.pts(), vec![Some(-2.0), Some(-1.0), Some(0.0), None]);
        assert!(h.wrapper.reverse_queue().is_empty());
        assert_eq!(h.wrapper.reverse_queue().byte_size(), 0);
    }

    #[test]
    fn test_forward_play_dir_discards_reversal_queue() {
        let mut h = Harness::new(StreamHeader::new(h264()), DecoderOptions::default());
        h.wrapper.set_play_dir(-1);

        for i in 0..3u8 {
            h.source.push(packet(i, Some(i as f64)));
        }
        assert_eq!(h.run(), Advance::NoDataYet);
        assert_eq!(h.wrapper.reverse_queue().len(), 3);
        assert!(h.output.frames.lock().is_empty());

        h.wrapper.set_play_dir(1);
        assert!(h.wrapper.reverse_queue().is_empty());
        assert_eq!(h.wrapper.reverse_queue().byte_size(), 0);
        assert!(!h.wrapper.reverse_queue().is_complete());

        // forward output goes straight to the consumer
        h.source.push(packet(3, Some(3.0)));
        h.run();
        assert_eq!(h.output.pts(), vec![Some(3.0)]);
        assert!(h.wrapper.reverse_queue().is_empty());
    }

    #[test]
    fn test_reverse_audio_is_mirrored() {
        let header = StreamHeader::new(CodecParams::audio("aac", 1000, 1));
        let mut h = Harness::new(header, DecoderOptions::default());
        h.wrapper.set_play_dir(-1);

        for (i, pts) in [0.0, 0.04, 0.08].into_iter().enumerate() {
            h.source.push(packet(i as u8, Some(pts)));
        }
        h.source.finish();
        assert_eq!(h.run(), Advance::NoDataYet);

        let pts = h.output.pts();
        assert_eq!(pts.len(), 4);
        assert_close(&pts[..3], &[-0.12, -0.08, -0.04]);
        assert_eq!(pts[3], None);
        assert_eq!(h.output.kinds(), vec!["audio", "audio", "audio", "eof"]);
        assert!(!h.wrapper.take_pts_reset());

        match &h.output.frames.lock()[0] {
            Frame::Audio(frame) => {
                assert_eq!(frame.data.first(), Some(&39));
                assert_eq!(frame.data.last(), Some(&0));
            }
            other => panic!("unexpected frame {:?}", other),
        };
    }

    #[test]
    fn test_decode_order_pts_subtracts_reorder_delay() {
        let codec = CodecParams::video("mpeg4", 25.0).with_decode_order_pts(true);
        let mut h = Harness::new(StreamHeader::new(codec), DecoderOptions::default());
        assert_eq!(h.wrapper.decoder_desc(), Some("mockreorder (mock decoder)"));

        for (i, pts) in [1.0, 1.04, 1.08].into_iter().enumerate() {
            h.source.push(packet(i as u8, Some(pts)));
        }
        h.source.finish();
        h.run();

        // two frames of delay at 25 fps
        let pts = h.output.pts();
        assert_eq!(pts.len(), 4);
        assert_close(&pts[..3], &[0.92, 0.96, 1.0]);
        assert_eq!(pts[3], None);
    }

    #[test]
    fn test_reverse_backsteps_and_preroll() {
        let mut h = Harness::new(StreamHeader::new(h264()), DecoderOptions::default());
        h.wrapper.set_play_dir(-1);

        // first backstep: one preroll packet, then real data
        h.source.push(packet(0, Some(0.5)).with_back_restart(true).with_back_preroll(true));
        h.source.push(packet(1, Some(1.0)));
        h.source.push(packet(2, Some(2.0)));
        // second backstep, further back in time
        h.source.push(packet(3, Some(0.0)).with_back_restart(true));
        h.source.finish();

        assert_eq!(h.run(), Advance::NoDataYet);
        assert_eq!(h.output.pts(), vec![Some(-2.0), Some(-1.0), Some(0.0), None]);
        assert_eq!(*h.log.fed.lock(), vec![Some(0), Some(1), Some(2), None, Some(3), None]);
    }

    #[test]
    fn test_cover_art_exactly_once() {
        let header = StreamHeader::new(CodecParams::video("h264", 0.0)).with_attached_picture(true);
        let mut h = Harness::new(header, DecoderOptions::default());
        for i in 0..3u8 {
            h.source.push(packet(i, Some(0.0)));
        }

        for _ in 0..5 {
            h.run();
        }

        assert_eq!(h.output.kinds(), vec!["video", "eof"]);
        assert_eq!(h.source.remaining(), 2);
        assert_eq!(*h.log.fed.lock(), vec![Some(0)]);

        // a reset releases the picture; the next one is decoded again
        h.wrapper.reset();
        h.run();
        assert_eq!(h.output.kinds(), vec!["video", "eof", "video", "eof"]);
    }

    #[test]
    fn test_backpressure_feeds_at_most_once() {
        let mut h = Harness::new(StreamHeader::new(h264()), DecoderOptions::default());
        h.output.accept.store(false, Ordering::SeqCst);
        for i in 0..3u8 {
            h.source.push(packet(i, Some(i as f64 * 0.04)));
        }

        assert_eq!(h.run(), Advance::NoDataYet);
        assert_eq!(h.source.remaining(), 2);
        assert!(h.output.frames.lock().is_empty());

        h.output.accept.store(true, Ordering::SeqCst);
        h.run();
        assert_close(&h.output.pts(), &[0.0, 0.04, 0.08]);
        assert_eq!(*h.log.fed.lock(), vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn test_codec_fallback_order() {
        let log = CodecLog::default();
        let mut registry = CodecRegistry::new();
        registry.register(StreamKind::Video, "h264", "h264_hw", "hardware", |_| {
            Err(DecodeError::Codec("no device".into()))
        });
        let mock_log = log.clone();
        registry.register(StreamKind::Video, "h264", "mockvid", "mock decoder", move |_| {
            Ok(Box::new(MockCodec::new(StreamKind::Video, &mock_log)))
        });

        let options = DecoderOptions::default().with_video_decoders(&["h264_hw", "mockvid"]);
        let h = Harness::with_registry(StreamHeader::new(h264()), options, log, registry);
        assert_eq!(h.wrapper.decoder_desc(), Some("mockvid (mock decoder)"));
        assert_eq!(h.log.created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_decoder_fails_construction() {
        let registry = CodecRegistry::new();
        let ctx = DecoderContext::new(DecoderOptions::default().into_shared());
        let result = DecoderWrapper::new(
            ctx,
            StreamHeader::new(h264()),
            Source::default(),
            Output::new(),
            Arc::new(registry),
        );
        assert!(matches!(result, Err(DecodeError::CodecInit { .. })));
    }

    #[test]
    fn test_audio_passthrough_selection() {
        let header = StreamHeader::new(CodecParams::audio("ac3", 48000, 2));
        let options = DecoderOptions::default().with_audio_passthrough(&["ac3"]);
        let mut h = Harness::new(header, options);
        assert_eq!(h.wrapper.decoder_desc(), Some("spdif_ac3 (passthrough for ac3)"));
        assert_eq!(h.log.created.load(Ordering::SeqCst), 0);

        // 2ch/16 bit at 48 kHz: 192 bytes are 1 ms
        h.source.push(Packet::new(vec![0u8; 192]).with_pts(1.0));
        h.source.finish();
        h.run();
        assert_eq!(h.output.kinds(), vec!["audio", "eof"]);

        h.wrapper.set_try_passthrough(false);
        h.wrapper.reinit().unwrap();
        assert_eq!(h.wrapper.decoder_desc(), Some("mockac3 (mock decoder)"));
    }

    #[test]
    fn test_captions_forwarded_with_frame_pts() {
        let log = CodecLog::default();
        let registry = registry(&log);
        let captions = Captions::default();
        let source = Source::default();
        let output = Output::new();
        let mut wrapper = DecoderWrapper::new(
            DecoderContext::new(DecoderOptions::default().into_shared()),
            StreamHeader::new(h264()),
            source.clone(),
            output.clone(),
            Arc::new(registry),
        )
        .unwrap()
        .with_caption_sink(captions.clone());

        let mut with_cc = Packet::new(vec![0, b'c']);
        with_cc.dts = Some(0.4);
        source.push(with_cc);
        run_until_stalled(&mut wrapper);

        assert_eq!(*captions.0.lock(), vec![(Bytes::from_static(b"cc"), Some(0.4))]);
        match &output.frames.lock()[0] {
            Frame::Video(frame) => assert!(frame.captions.is_none()),
            other => panic!("unexpected frame {:?}", other),
        };
    }

    #[test]
    fn test_framedrop_hints_and_accounting() {
        let mut h = Harness::new(StreamHeader::new(h264()), DecoderOptions::default());

        for i in 0..10u8 {
            h.source.push(packet(i, Some(i as f64 * 0.04)));
        }
        h.run();
        assert!(h.wrapper.packet_pts_health().is_good());

        h.wrapper.set_start_pts(Some(5.0));
        h.source.push(packet(10, Some(1.0)));
        h.run();
        assert_eq!(h.log.hints.lock().last(), Some(&FramedropHint::Hard));

        // soft drops: the mock skips both packets, the drain reveals it
        h.wrapper.set_start_pts(None);
        h.wrapper.set_attempt_framedrops(2);
        h.source.push(packet(11, Some(1.04)));
        h.source.push(packet(12, Some(1.08)));
        h.source.finish();
        h.run();
        assert_eq!(h.wrapper.dropped_frames(), 2);
        assert_eq!(h.wrapper.attempt_framedrops(), 0);
        assert!(h.wrapper.is_eof());
    }

    #[test]
    fn test_malformed_packet_flags_failure_and_continues() {
        let mut h = Harness::new(StreamHeader::new(h264()), DecoderOptions::default());
        h.source.push(packet(0, Some(f64::INFINITY)));
        h.source.push(packet(1, Some(0.0)));

        assert_eq!(h.run(), Advance::NoDataYet);
        assert!(h.wrapper.failed());
        assert!(h.wrapper.error().is_none());
        assert_eq!(h.output.pts(), vec![Some(0.0)]);

        h.wrapper.reset();
        assert!(!h.wrapper.failed());
    }

    #[test]
    fn test_packet_from_decoder_is_fatal() {
        let mut h = Harness::new(StreamHeader::new(h264()), DecoderOptions::default());
        h.source.push(Packet::new(vec![0, b'p']).with_pts(0.0));

        assert_eq!(h.run(), Advance::Failed);
        assert!(matches!(h.wrapper.error(), Some(DecodeError::UnknownFrameType(_))));
    }

    #[test]
    fn test_options_reread_every_step() {
        let mut h = Harness::new(StreamHeader::new(h264()), DecoderOptions::default());
        h.source.push(packet(0, Some(0.0)));
        h.source.push(packet(1, Some(0.04)));
        h.run();

        h.options.write().correct_pts = false;
        h.source.push(packet(2, Some(7.0)));
        h.run();

        assert_close(&h.output.pts(), &[0.0, 0.04, 0.08]);
    }

    #[test]
    fn test_image_params_and_forced_fps() {
        let codec = h264().with_pixel_aspect(16, 11).with_rotation(90);
        let options = DecoderOptions::default().with_force_fps(50.0);
        let mut h = Harness::new(StreamHeader::new(codec), options);
        assert_eq!(h.wrapper.fps(), 50.0);

        h.source.push(packet(0, Some(0.0)));
        h.run();

        match &h.output.frames.lock()[0] {
            Frame::Video(frame) => {
                assert_eq!((frame.params.par_w, frame.params.par_h), (16, 11));
                assert_eq!(frame.params.rotate, 90);
                assert_eq!(frame.nominal_fps, 50.0);
            }
            other => panic!("unexpected frame {:?}", other),
        }
        assert_eq!(h.wrapper.decoder_format(), ImageParams::new(4, 4));
    }

    #[test]
    fn test_reset_restarts_clock() {
        let mut h = Harness::new(StreamHeader::new(h264()), DecoderOptions::default());
        h.source.push(packet(0, Some(10.0)));
        h.source.push(packet(1, Some(10.04)));
        h.run();

        h.wrapper.reset();
        h.source.push(packet(2, Some(2.0)));
        h.run();

        assert_close(&h.output.pts(), &[10.0, 10.04, 2.0]);
        assert_eq!(h.log.created.load(Ordering::SeqCst), 1);
    }
}
