use super::Packet;
use bytes::Bytes;

/// Output image parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageParams {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel aspect ratio; `(0, 0)` when the bitstream does not signal one.
    pub par_w: u32,
    /// Vertical part of the pixel aspect ratio.
    pub par_h: u32,
    /// Clockwise rotation in degrees.
    pub rotate: u32,
}

impl ImageParams {
    /// Parameters of the given size; aspect and rotation unset.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Sets the pixel aspect so the displayed picture has aspect `num / den`.
    pub fn set_display_aspect(&mut self, num: u64, den: u64) {
        let p_w = num * self.height as u64;
        let p_h = den * self.width as u64;
        let g = gcd(p_w, p_h).max(1);
        self.par_w = (p_w / g).min(u32::MAX as u64) as u32;
        self.par_h = (p_h / g).min(u32::MAX as u64) as u32;
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// A decoded picture.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Image data, one buffer per plane.
    pub planes: Vec<Bytes>,
    /// Geometry, aspect and rotation.
    pub params: ImageParams,
    /// Presentation timestamp in seconds.
    pub pts: Option<f64>,
    /// Decode timestamp in seconds, if the codec passed one through.
    pub dts: Option<f64>,
    /// Intra-coded picture.
    pub key_frame: bool,
    /// ATSC A/53 closed caption payload attached by the decoder.
    pub captions: Option<Bytes>,
    /// Frame rate the stage believes the stream has.
    pub nominal_fps: f64,
}

impl VideoFrame {
    /// Creates a frame without timestamps.
    pub fn new(planes: Vec<Bytes>, params: ImageParams) -> Self {
        Self {
            planes,
            params,
            pts: None,
            dts: None,
            key_frame: false,
            captions: None,
            nominal_fps: 0.0,
        }
    }

    /// Sets the presentation timestamp.
    pub fn with_pts(mut self, pts: Option<f64>) -> Self {
        self.pts = pts;
        self
    }

    /// Sets the decode timestamp.
    pub fn with_dts(mut self, dts: Option<f64>) -> Self {
        self.dts = dts;
        self
    }

    /// Attaches a closed caption payload.
    pub fn with_captions(mut self, captions: impl Into<Bytes>) -> Self {
        self.captions = Some(captions.into());
        self
    }
}

/// Interleaved PCM (or passthrough bitstream) audio.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Interleaved samples.
    pub data: Bytes,
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
    /// Size of one sample of one channel.
    pub bytes_per_sample: u16,
    /// Presentation timestamp of the first sample, in seconds.
    pub pts: Option<f64>,
}

impl AudioFrame {
    /// Creates a frame without a timestamp.
    pub fn new(data: impl Into<Bytes>, sample_rate: u32, channels: u16, bytes_per_sample: u16) -> Self {
        Self {
            data: data.into(),
            sample_rate,
            channels,
            bytes_per_sample,
            pts: None,
        }
    }

    /// Sets the presentation timestamp.
    pub fn with_pts(mut self, pts: Option<f64>) -> Self {
        self.pts = pts;
        self
    }

    fn bytes_per_frame(&self) -> usize {
        (self.channels as usize * self.bytes_per_sample as usize).max(1)
    }

    /// Number of samples per channel.
    pub fn samples(&self) -> usize {
        self.data.len() / self.bytes_per_frame()
    }

    /// Duration in seconds; 0 when the sample rate is unknown.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples() as f64 / self.sample_rate as f64
    }

    /// Cuts off samples outside `[start, end)`, adjusting the pts.
    pub fn clip_timestamps(&mut self, start: Option<f64>, end: Option<f64>) {
        let Some(pts) = self.pts else { return };
        if self.sample_rate == 0 {
            return;
        }
        let rate = self.sample_rate as f64;
        let bpf = self.bytes_per_frame();
        let samples = self.samples();

        if let Some(end) = end {
            if pts >= end {
                self.data = Bytes::new();
                return;
            }
            let keep = ((end - pts) * rate).round() as usize;
            if keep < samples {
                self.data = self.data.slice(..keep * bpf);
            }
        }

        if let Some(start) = start {
            if pts < start {
                let skip = (((start - pts) * rate).round() as usize).min(self.samples());
                self.data = self.data.slice(skip * bpf..);
                self.pts = Some(pts + skip as f64 / rate);
            }
        }
    }

    /// Reverses the sample order (channel layout inside a sample is kept).
    pub fn reverse(&mut self) {
        let bpf = self.bytes_per_frame();
        let mut out = Vec::with_capacity(self.data.len());
        for chunk in self.data.chunks_exact(bpf).rev() {
            out.extend_from_slice(chunk);
        }
        self.data = Bytes::from(out);
    }
}

/// A unit moving through the stage.
///
/// `Packet` is never valid decoder output; it exists because the decoder
/// output port is untyped and a misbehaving codec may hand back compressed
/// data.
#[derive(Debug, Clone)]
pub enum Frame {
    /// Decoded picture.
    Video(VideoFrame),
    /// Decoded audio.
    Audio(AudioFrame),
    /// No more frames until the next reset.
    EndOfStream,
    /// Compressed data.
    Packet(Packet),
}

impl Frame {
    /// Presentation timestamp, `None` for end of stream.
    pub fn pts(&self) -> Option<f64> {
        match self {
            Frame::Video(v) => v.pts,
            Frame::Audio(a) => a.pts,
            Frame::Packet(p) => p.pts,
            Frame::EndOfStream => None,
        }
    }

    /// Whether this is the end-of-stream marker.
    pub fn is_eof(&self) -> bool {
        matches!(self, Frame::EndOfStream)
    }

    /// Short name used in log messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Frame::Video(_) => "video",
            Frame::Audio(_) => "audio",
            Frame::EndOfStream => "eof",
            Frame::Packet(_) => "packet",
        }
    }

    /// Rough memory footprint, used for reversal queue accounting.
    pub fn approx_size(&self) -> usize {
        let payload = match self {
            Frame::Video(v) => v.planes.iter().map(|p| p.len()).sum::<usize>()
                + v.captions.as_ref().map_or(0, |c| c.len()),
            Frame::Audio(a) => a.data.len(),
            Frame::Packet(p) => p.data.len(),
            Frame::EndOfStream => 0,
        };
        payload + std::mem::size_of::<Frame>()
    }
}
