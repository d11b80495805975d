use crate::av::{CodecParams, ImageParams, VideoFrame};
use crate::config::{AspectMethod, DecoderOptions};
use log::debug;

/// Largest denominator used when turning a forced display aspect into a ratio.
const ASPECT_MAX_DEN: u64 = 100_000;

/// Rewrites decoder image parameters with container metadata and user
/// overrides. The result is cached until the decoder format changes.
#[derive(Debug, Default)]
pub struct ImageParamsFixer {
    dec_format: ImageParams,
    last_format: Option<ImageParams>,
    fixed_format: ImageParams,
}

impl ImageParamsFixer {
    /// Fixer with nothing cached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Image parameters as last reported by the decoder.
    pub fn decoder_format(&self) -> ImageParams {
        self.dec_format
    }

    /// Forces the next frame to be fixed up again.
    pub fn invalidate(&mut self) {
        self.last_format = None;
    }

    /// Drops the cached result and the last fixed format.
    pub fn reset(&mut self) {
        self.last_format = None;
        self.fixed_format = ImageParams::default();
    }

    /// Replaces the frame's image parameters with the fixed-up ones.
    pub fn apply(&mut self, frame: &mut VideoFrame, codec: &CodecParams, options: &DecoderOptions, target: &str) {
        if self.last_format != Some(frame.params) {
            self.fix(frame.params, codec, options, target);
        }
        frame.params = self.fixed_format;
    }

    fn fix(&mut self, params: ImageParams, codec: &CodecParams, options: &DecoderOptions, target: &str) {
        debug!(target: target, "Decoder format: {:?}", params);
        self.dec_format = params;

        let mut m = params;

        // the decoder signals an unknown bitstream aspect with 0:0
        let mut use_container = true;
        if options.aspect_method == AspectMethod::Bitstream && m.par_w > 0 && m.par_h > 0 {
            debug!(target: target, "Using bitstream aspect ratio.");
            use_container = false;
        }

        if use_container && codec.par_w > 0 && codec.par_h > 0 {
            debug!(target: target, "Using container aspect ratio.");
            m.par_w = codec.par_w;
            m.par_h = codec.par_h;
        }

        if let Some(aspect) = options.movie_aspect {
            debug!(target: target, "Forcing user-set aspect ratio.");
            if aspect == 0.0 {
                m.par_w = 1;
                m.par_h = 1;
            } else {
                let (num, den) = to_rational(aspect, ASPECT_MAX_DEN);
                m.set_display_aspect(num, den);
            }
        }

        if m.par_w == 0 || m.par_h == 0 {
            m.par_w = 1;
            m.par_h = 1;
        }

        m.rotate = match options.video_rotate {
            None => 0,
            Some(rotate) => (codec.rotate + rotate) % 360,
        };

        self.last_format = Some(params);
        self.fixed_format = m;
    }
}

/// Best rational approximation of `x` with a denominator up to `max_den`.
fn to_rational(x: f64, max_den: u64) -> (u64, u64) {
    if !(x > 0.0) || !x.is_finite() {
        return (0, 1);
    }

    // continued fraction convergents
    let (mut h0, mut h1, mut k0, mut k1) = (0u64, 1u64, 1u64, 0u64);
    let mut v = x;
    loop {
        let a = v.floor();
        let ai = a as u64;
        let h2 = ai.saturating_mul(h1).saturating_add(h0);
        let k2 = ai.saturating_mul(k1).saturating_add(k0);
        if k2 > max_den {
            break;
        }
        (h0, h1, k0, k1) = (h1, h2, k1, k2);
        let frac = v - a;
        if frac < 1e-9 {
            break;
        }
        v = 1.0 / frac;
    }
    (h1, k1.max(1))
}
