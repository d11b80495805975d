#![doc(html_root_url = "https://docs.rs/vdkdec/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

//! # vdkdec - decode stage for media players
//!
//! `vdkdec` sits between a demuxer and a codec. It feeds compressed packets
//! to the codec and turns whatever the codec produces into frames with
//! sane, monotonic timestamps that a player can synchronize against.
//!
//! ## Features
//!
//! ### Timestamp repair
//! - Falls back to dts when the codec loses or reorders pts
//! - Makes up timestamps from the frame rate when nothing usable exists
//! - Interpolates audio timestamps and reports real discontinuities
//!
//! ### Playback support
//! - Timeline segments (ordered chapters, edit lists) with codec switching
//! - Backward playback through a byte-bounded reversal queue
//! - Attached pictures (cover art) emitted exactly once
//! - Framedrop hints for hr-seek and for catching up
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vdkdec::av::{CodecParams, Frame, OutputPort, Packet, PacketSource, StreamHeader};
//! use vdkdec::codec::CodecRegistry;
//! use vdkdec::config::DecoderOptions;
//! use vdkdec::decode::{DecoderContext, DecoderWrapper};
//! use vdkdec::runner::run_until_stalled;
//!
//! struct Demuxer;
//! impl PacketSource for Demuxer {
//!     fn try_read(&mut self) -> Option<Packet> { None }
//!     fn at_eof(&self) -> bool { true }
//! }
//!
//! struct Player;
//! impl OutputPort for Player {
//!     fn needs_data(&self) -> bool { true }
//!     fn write(&mut self, frame: Frame) { println!("{:?}", frame.pts()); }
//! }
//!
//! fn main() -> vdkdec::Result<()> {
//!     let mut registry = CodecRegistry::new();
//!     registry.register_passthrough("ac3");
//!
//!     let options = DecoderOptions::from_env()?
//!         .with_audio_passthrough(&["ac3"])
//!         .into_shared();
//!     let header = StreamHeader::new(CodecParams::audio("ac3", 48000, 2));
//!
//!     let mut decoder = DecoderWrapper::new(
//!         DecoderContext::new(options),
//!         header,
//!         Demuxer,
//!         Player,
//!         Arc::new(registry),
//!     )?;
//!     run_until_stalled(&mut decoder);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - `av`: Packets, frames, stream headers and the ports to the demuxer and
//!   the consumer
//! - `codec`: The codec interface, the decoder registry and audio passthrough
//! - `decode`: The decode stage itself
//!   - Packet feeding and framedrop hints
//!   - Video and audio timestamp repair
//!   - Segment switching, reversal queue, cover art
//! - `config`: Decoder options, from code, environment or config files
//! - `runner`: Loops driving a stage, blocking-free or from a tokio task
//! - `error`: Error type and result alias
//!
/// Media data model and stage ports
pub mod av;

/// Codec interface and decoder selection
pub mod codec;

/// Configuration module
pub mod config;

/// The decode stage
pub mod decode;

/// Error types and utilities
pub mod error;

/// Drivers for the decode loop
pub mod runner;

pub use error::{DecodeError, Result};
