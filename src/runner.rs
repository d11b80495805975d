//! Drivers for the cooperative decode loop.
//!
//! A [`DecoderWrapper`] only moves when told to. [`run_until_stalled`] steps
//! it until nothing more can happen without new input; [`run_to_end`] does
//! the same from an async task, sleeping on a [`Notify`] that the packet
//! producer or the consumer signals when it has something new.

use crate::decode::{Advance, DecoderWrapper};
use crate::error::{DecodeError, Result};
use log::debug;
use tokio::sync::Notify;

/// Advances `wrapper` while it makes progress.
///
/// Returns [`Advance::NoDataYet`] once it stalls, or [`Advance::Failed`].
pub fn run_until_stalled(wrapper: &mut DecoderWrapper) -> Advance {
    loop {
        match wrapper.advance() {
            Advance::Progressed => continue,
            other => return other,
        }
    }
}

/// Drives `wrapper` until end-of-stream reaches the consumer.
///
/// Whenever the stage stalls the task waits on `wakeup`. Producers should
/// use [`Notify::notify_one`], which is not lost if it fires before the
/// task starts waiting.
pub async fn run_to_end(wrapper: &mut DecoderWrapper, wakeup: &Notify) -> Result<()> {
    loop {
        if run_until_stalled(wrapper) == Advance::Failed {
            return Err(wrapper
                .error()
                .cloned()
                .unwrap_or_else(|| DecodeError::Codec("decoder failed".to_string())));
        }

        if wrapper.is_eof() {
            debug!("decoder reached end of stream: {:?}", wrapper.decoder_desc());
            return Ok(());
        }

        wakeup.notified().await;
    }
}
