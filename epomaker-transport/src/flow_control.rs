//! Flow-control transport layer
//!
//! `FlowControlTransport` wraps a raw `Transport` (which only writes single
//! frames) and adds transfer semantics: whole frame sequences written under
//! one lock, bounded retry with backoff per frame, and the pause the firmware
//! needs between consecutive reports.
//!
//! ```text
//! [HidWired / Recording]       ← implements Transport (raw I/O)
//!            |
//!   [FlowControlTransport]     ← adds ordering, retries, inter-frame delay
//!            |
//!        [Keyboard]
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::TransportError;
use crate::frame::Frame;
use crate::protocol::{cmd, timing};
use crate::types::{DeviceStatus, TransportDeviceInfo};
use crate::Transport;

/// Retry policy for a single frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub attempts: usize,
    /// Wait before the second attempt; doubled for each one after
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: timing::SEND_RETRIES + 1,
            backoff: Duration::from_millis(timing::RETRY_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `retry` (0-based)
    pub fn delay_for(&self, retry: usize) -> Duration {
        self.backoff * 2u32.saturating_pow(retry as u32)
    }
}

/// A transport wrapper that owns write ordering for one open handle.
///
/// Every transfer holds `write_lock` for its full frame sequence: the
/// firmware reassembles by sequence index only, so frames of two transfers
/// must never interleave.
pub struct FlowControlTransport {
    inner: Arc<dyn Transport>,
    frame_delay: Duration,
    retry: RetryPolicy,
    write_lock: tokio::sync::Mutex<()>,
}

impl FlowControlTransport {
    /// Create a new flow-control wrapper with default timing.
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self {
            inner,
            frame_delay: Duration::from_millis(timing::DEFAULT_FRAME_DELAY_MS),
            retry: RetryPolicy::default(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Set the pause between consecutive frames
    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = delay;
        self
    }

    /// Replace the per-frame retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Access the wrapped raw transport.
    pub fn inner(&self) -> &Arc<dyn Transport> {
        &self.inner
    }

    pub fn device_info(&self) -> &TransportDeviceInfo {
        self.inner.device_info()
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.is_connected().await
    }

    /// Write a complete transfer in order using the configured frame delay.
    pub async fn write(&self, frames: &[Frame]) -> Result<(), TransportError> {
        self.write_with_delay(frames, self.frame_delay).await
    }

    /// Write a complete transfer in order with a custom inter-frame delay
    /// (used for large streaming transfers).
    ///
    /// A failure partway through aborts the transfer; frames already sent
    /// stay applied on the device.
    pub async fn write_with_delay(
        &self,
        frames: &[Frame],
        delay: Duration,
    ) -> Result<(), TransportError> {
        let _guard = self.write_lock.lock().await;
        if let Some(first) = frames.first() {
            debug!(
                "Writing {} ({} frames)",
                cmd::name(first.command()),
                frames.len()
            );
        }

        for (i, frame) in frames.iter().enumerate() {
            self.write_frame_with_retry(frame, i, frames.len()).await?;
            if !delay.is_zero() && i + 1 < frames.len() {
                tokio::time::sleep(delay).await;
            }
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    /// Read the device acknowledgement for the last transfer.
    pub async fn read_status(&self) -> Result<DeviceStatus, TransportError> {
        let _guard = self.write_lock.lock().await;
        self.inner.read_status().await
    }

    /// Close the wrapped handle once any running transfer has finished.
    pub async fn close(&self) -> Result<(), TransportError> {
        let _guard = self.write_lock.lock().await;
        debug!("Closing transport");
        self.inner.close().await
    }

    async fn write_frame_with_retry(
        &self,
        frame: &Frame,
        index: usize,
        total: usize,
    ) -> Result<(), TransportError> {
        let attempts = self.retry.attempts.max(1);
        let mut attempt = 0;
        loop {
            match self.inner.write_frame(frame).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_fatal() => {
                    warn!(
                        "Frame {}/{} failed fatally: {}",
                        index + 1,
                        total,
                        e
                    );
                    return Err(e);
                }
                Err(e) => {
                    attempt += 1;
                    debug!("Send attempt {} failed: {}", attempt, e);
                    if attempt >= attempts {
                        return Err(e);
                    }
                    tokio::time::sleep(self.retry.delay_for(attempt - 1)).await;
                }
            }
        }
    }
}
