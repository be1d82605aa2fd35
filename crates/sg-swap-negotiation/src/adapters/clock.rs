//! Clock Adapters
//!
//! [`SystemClock`] reads the host clock, [`AdjustedClock`] corrects it by
//! the median offset reported by peers, and [`ManualClock`] is set by hand.

use crate::domain::PeerAddress;
use crate::ports::NetworkClock;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Largest correction applied (70 minutes).
pub const MAX_TIME_ADJUSTMENT_SECS: i64 = 70 * 60;

/// Samples needed before any correction is applied.
pub const MIN_TIME_SAMPLES: usize = 5;

/// Peers remembered for the median.
pub const MAX_TIME_SAMPLES: usize = 200;

/// Host wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl NetworkClock for SystemClock {
    fn adjusted_time(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Clock set explicitly by tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    time: AtomicU64,
}

impl ManualClock {
    /// Clock reading `initial`.
    pub fn new(initial: u64) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    /// Move forward by `secs`.
    pub fn advance(&self, secs: u64) {
        self.time.fetch_add(secs, Ordering::SeqCst);
    }

    /// Jump to `time`.
    pub fn set(&self, time: u64) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl NetworkClock for ManualClock {
    fn adjusted_time(&self) -> u64 {
        self.time.load(Ordering::SeqCst)
    }
}

/// Local clock plus the median of peer offsets.
///
/// One sample per peer. The correction stays zero until
/// [`MIN_TIME_SAMPLES`] peers reported, and is reset to zero when the
/// median exceeds [`MAX_TIME_ADJUSTMENT_SECS`] in either direction.
pub struct AdjustedClock {
    local: Arc<dyn NetworkClock>,
    samples: Mutex<HashMap<PeerAddress, i64>>,
    offset: AtomicI64,
}

impl AdjustedClock {
    /// Adjust `local` by peer samples.
    pub fn new(local: Arc<dyn NetworkClock>) -> Self {
        Self {
            local,
            samples: Mutex::new(HashMap::new()),
            offset: AtomicI64::new(0),
        }
    }

    /// Adjust the host clock.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Record the time `peer` reported (e.g. in its version handshake).
    pub fn add_sample(&self, peer: PeerAddress, peer_time: u64) {
        let local = self.local.adjusted_time();
        let sample = match (i64::try_from(peer_time), i64::try_from(local)) {
            (Ok(peer_time), Ok(local)) => peer_time.checked_sub(local),
            _ => None,
        };
        let Some(sample) = sample else {
            warn!("[swap] unusable time {} from {}; sample dropped", peer_time, peer);
            return;
        };
        let mut samples = self.samples.lock();
        if samples.len() >= MAX_TIME_SAMPLES || samples.contains_key(&peer) {
            return;
        }
        samples.insert(peer, sample);
        if samples.len() < MIN_TIME_SAMPLES {
            return;
        }

        let mut offsets: Vec<i64> = samples.values().copied().collect();
        offsets.sort_unstable();
        let median = offsets[offsets.len() / 2];
        if median.abs() <= MAX_TIME_ADJUSTMENT_SECS {
            self.offset.store(median, Ordering::Relaxed);
        } else {
            self.offset.store(0, Ordering::Relaxed);
            warn!(
                "[swap] peer clocks disagree by {}s; not adjusting local time",
                median
            );
        }
    }

    /// Current correction in seconds.
    pub fn offset(&self) -> i64 {
        self.offset.load(Ordering::Relaxed)
    }

    /// Forget a departed peer's sample. The correction is kept.
    pub fn remove_peer(&self, peer: &PeerAddress) {
        self.samples.lock().remove(peer);
    }
}

impl NetworkClock for AdjustedClock {
    fn adjusted_time(&self) -> u64 {
        self.local
            .adjusted_time()
            .saturating_add_signed(self.offset())
    }
}
