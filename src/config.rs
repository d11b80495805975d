use crate::error::{DecodeError, Result};
use parking_lot::RwLock;
use std::env;
use std::path::Path;
use std::sync::Arc;

/// Default reversal queue capacity for video (1 GiB).
pub const DEFAULT_VIDEO_REVERSE_SIZE: usize = 1024 * 1024 * 1024;
/// Default reversal queue capacity for audio (64 MiB).
pub const DEFAULT_AUDIO_REVERSE_SIZE: usize = 64 * 1024 * 1024;
/// Packets this far (seconds) before the seek target are hard-dropped.
pub const FRAMEDROP_SLACK: f64 = 0.005;
/// Audio pts differences above this (seconds) are reported as jumps.
pub const AUDIO_JUMP_THRESHOLD: f64 = 0.1;
/// Audio pts jumps of at least this many seconds raise a pts reset.
pub const AUDIO_RESET_THRESHOLD: f64 = 5.0;
/// Interpolated audio pts is kept if within this many seconds of the real one.
pub const AUDIO_INTERP_TOLERANCE: f64 = 0.001;
/// Frame rate assumed when making up video timestamps without a known rate.
pub const DEFAULT_FPS: f64 = 25.0;

const ENV_PREFIX: &str = "VDKDEC_";

/// Where the pixel aspect ratio is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectMethod {
    /// Pixel aspect from the container, falling back to the bitstream.
    #[default]
    Container,
    /// Pixel aspect as signalled by the codec.
    Bitstream,
}

/// Options read by the decode stage. The stage only ever reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderOptions {
    /// Repair timestamps; when off they are made up from the frame rate.
    pub correct_pts: bool,
    /// Overrides the container frame rate.
    pub force_fps: Option<f64>,
    /// Where the pixel aspect is taken from.
    pub aspect_method: AspectMethod,
    /// `Some(0.0)` forces square pixels, `Some(a)` a display aspect of `a`.
    pub movie_aspect: Option<f64>,
    /// Degrees added to the container rotation; `None` ignores rotation.
    pub video_rotate: Option<u32>,
    /// Reversal queue capacity in bytes for video.
    pub video_reverse_size: usize,
    /// Reversal queue capacity in bytes for audio.
    pub audio_reverse_size: usize,
    /// Send framedrop hints to video codecs.
    pub framedrop: bool,
    /// See [`FRAMEDROP_SLACK`].
    pub framedrop_slack: f64,
    /// See [`AUDIO_JUMP_THRESHOLD`].
    pub audio_jump_threshold: f64,
    /// See [`AUDIO_RESET_THRESHOLD`].
    pub audio_reset_threshold: f64,
    /// See [`AUDIO_INTERP_TOLERANCE`].
    pub audio_interp_tolerance: f64,
    /// See [`DEFAULT_FPS`].
    pub default_fps: f64,
    /// Preferred video decoder names, tried first in this order.
    pub video_decoders: Vec<String>,
    /// Preferred audio decoder names, tried first in this order.
    pub audio_decoders: Vec<String>,
    /// Audio codecs to pass through undecoded when possible.
    pub audio_passthrough: Vec<String>,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            correct_pts: true,
            force_fps: None,
            aspect_method: AspectMethod::Container,
            movie_aspect: None,
            video_rotate: Some(0),
            video_reverse_size: DEFAULT_VIDEO_REVERSE_SIZE,
            audio_reverse_size: DEFAULT_AUDIO_REVERSE_SIZE,
            framedrop: true,
            framedrop_slack: FRAMEDROP_SLACK,
            audio_jump_threshold: AUDIO_JUMP_THRESHOLD,
            audio_reset_threshold: AUDIO_RESET_THRESHOLD,
            audio_interp_tolerance: AUDIO_INTERP_TOLERANCE,
            default_fps: DEFAULT_FPS,
            video_decoders: Vec::new(),
            audio_decoders: Vec::new(),
            audio_passthrough: Vec::new(),
        }
    }
}

/// Options shared between the application and any number of decode stages.
pub type SharedOptions = Arc<RwLock<DecoderOptions>>;

impl DecoderOptions {
    /// Same as [`DecoderOptions::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `VDKDEC_*` environment variables
    /// (e.g. `VDKDEC_CORRECT_PTS=no`, `VDKDEC_FORCE_FPS=23.976`).
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();
        for (key, value) in env::vars() {
            if let Some(name) = key.strip_prefix(ENV_PREFIX) {
                options.set(&name.to_ascii_lowercase(), &value)?;
            }
        }
        Ok(options)
    }

    /// Applies `key = value` lines; `#` starts a comment.
    pub fn apply_config_str(&mut self, content: &str) -> Result<()> {
        for (lineno, line) in content.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| DecodeError::Config(format!("line {}: expected key = value", lineno + 1)))?;
            let value = value.trim().trim_matches('"').trim_matches('\'');
            self.set(key.trim(), value)?;
        }
        Ok(())
    }

    /// Reads overrides from a config file on top of the current values.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DecodeError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        self.apply_config_str(&content)
    }

    /// Sets one option by name. Dashes and underscores are interchangeable.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key.replace('-', "_").as_str() {
            "correct_pts" => self.correct_pts = parse_flag(key, value)?,
            "force_fps" | "fps" => {
                let fps = parse_f64(key, value)?;
                self.force_fps = (fps > 0.0).then_some(fps);
            }
            "aspect_method" | "video_aspect_method" => {
                self.aspect_method = match value {
                    "container" => AspectMethod::Container,
                    "bitstream" => AspectMethod::Bitstream,
                    _ => return Err(invalid(key, value)),
                }
            }
            "movie_aspect" | "video_aspect" => {
                self.movie_aspect = match value {
                    "no" => Some(0.0),
                    "auto" | "-1" => None,
                    _ => {
                        let aspect = parse_aspect(key, value)?;
                        if !(0.0..=10.0).contains(&aspect) {
                            return Err(invalid(key, value));
                        }
                        Some(aspect)
                    }
                }
            }
            "video_rotate" => {
                self.video_rotate = match value {
                    "no" => None,
                    _ => {
                        let deg: u32 = value.parse().map_err(|_| invalid(key, value))?;
                        if deg >= 360 {
                            return Err(invalid(key, value));
                        }
                        Some(deg)
                    }
                }
            }
            "video_reverse_size" => self.video_reverse_size = parse_size(key, value)?,
            "audio_reverse_size" => self.audio_reverse_size = parse_size(key, value)?,
            "framedrop" => self.framedrop = parse_flag(key, value)?,
            "framedrop_slack" => self.framedrop_slack = parse_f64(key, value)?,
            "audio_jump_threshold" => self.audio_jump_threshold = parse_f64(key, value)?,
            "audio_reset_threshold" => self.audio_reset_threshold = parse_f64(key, value)?,
            "audio_interp_tolerance" => self.audio_interp_tolerance = parse_f64(key, value)?,
            "default_fps" => {
                let fps = parse_f64(key, value)?;
                if fps <= 0.0 {
                    return Err(invalid(key, value));
                }
                self.default_fps = fps;
            }
            "video_decoders" | "vd" => self.video_decoders = parse_list(value),
            "audio_decoders" | "ad" => self.audio_decoders = parse_list(value),
            "audio_passthrough" | "audio_spdif" => self.audio_passthrough = parse_list(value),
            _ => return Err(DecodeError::Config(format!("unknown option '{}'", key))),
        }
        Ok(())
    }

    /// Enables or disables timestamp repair.
    pub fn with_correct_pts(mut self, enable: bool) -> Self {
        self.correct_pts = enable;
        self
    }

    /// Forces a frame rate, ignoring the container.
    pub fn with_force_fps(mut self, fps: f64) -> Self {
        self.force_fps = (fps > 0.0).then_some(fps);
        self
    }

    /// Sets where the pixel aspect is taken from.
    pub fn with_aspect_method(mut self, method: AspectMethod) -> Self {
        self.aspect_method = method;
        self
    }

    /// Forces a display aspect; `Some(0.0)` means square pixels.
    pub fn with_movie_aspect(mut self, aspect: Option<f64>) -> Self {
        self.movie_aspect = aspect;
        self
    }

    /// Extra rotation in degrees; `None` ignores rotation.
    pub fn with_video_rotate(mut self, rotate: Option<u32>) -> Self {
        self.video_rotate = rotate.map(|r| r % 360);
        self
    }

    /// Reversal queue capacities in bytes.
    pub fn with_reverse_sizes(mut self, video: usize, audio: usize) -> Self {
        self.video_reverse_size = video;
        self.audio_reverse_size = audio;
        self
    }

    /// Enables framedrop hints.
    pub fn with_framedrop(mut self, enable: bool) -> Self {
        self.framedrop = enable;
        self
    }

    /// Preferred video decoders, in order.
    pub fn with_video_decoders(mut self, names: &[&str]) -> Self {
        self.video_decoders = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Preferred audio decoders, in order.
    pub fn with_audio_decoders(mut self, names: &[&str]) -> Self {
        self.audio_decoders = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Audio codecs to pass through undecoded.
    pub fn with_audio_passthrough(mut self, codecs: &[&str]) -> Self {
        self.audio_passthrough = codecs.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Wraps the options for sharing between the stage and its owner.
    pub fn into_shared(self) -> SharedOptions {
        Arc::new(RwLock::new(self))
    }
}

fn invalid(key: &str, value: &str) -> DecodeError {
    DecodeError::Config(format!("invalid value for '{}': {}", key, value))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => Ok(true),
        "no" | "false" | "0" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn parse_f64(key: &str, value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(key, value))
}

/// Accepts `1.777`, `16:9` and `16/9`.
fn parse_aspect(key: &str, value: &str) -> Result<f64> {
    if let Some((num, den)) = value.split_once(':').or_else(|| value.split_once('/')) {
        let num = parse_f64(key, num.trim())?;
        let den = parse_f64(key, den.trim())?;
        if den == 0.0 {
            return Err(invalid(key, value));
        }
        return Ok(num / den);
    }
    parse_f64(key, value)
}

/// Byte sizes with an optional `KiB`/`MiB`/`GiB` suffix.
fn parse_size(key: &str, value: &str) -> Result<usize> {
    let value_lc = value.to_ascii_lowercase();
    let (digits, multiplier) = [("gib", 1usize << 30), ("mib", 1 << 20), ("kib", 1 << 10)]
        .iter()
        .find_map(|(suffix, mul)| value_lc.strip_suffix(suffix).map(|d| (d.trim().to_string(), *mul)))
        .unwrap_or((value_lc.clone(), 1));
    let n: usize = digits.parse().map_err(|_| invalid(key, value))?;
    n.checked_mul(multiplier).ok_or_else(|| invalid(key, value))
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
