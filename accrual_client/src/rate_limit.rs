use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use tokio::{
    sync::Mutex,
    time::{sleep_until, Instant},
};

/// A process-wide "paused until T" gate for calls to the accrual authority.
///
/// Clones share the same state. Callers [`wait`](Self::wait) before every request; a rate-limit response closes the
/// gate with [`pause_for`](Self::pause_for). A pause can only ever be extended, never shortened, by a later call.
#[derive(Debug, Clone, Default)]
pub struct RateLimitGate {
    paused_until: Arc<Mutex<Option<Instant>>>,
}

impl RateLimitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns once the gate is open. Returns immediately if no pause is in effect.
    pub async fn wait(&self) {
        loop {
            let until = *self.paused_until.lock().await;
            match until {
                Some(t) if t > Instant::now() => {
                    debug!("🌐️ Accrual queries are paused for another {:?}", t - Instant::now());
                    sleep_until(t).await;
                },
                _ => return,
            }
        }
    }

    pub async fn pause_for(&self, cooldown: Duration) {
        let until = Instant::now() + cooldown;
        let mut paused_until = self.paused_until.lock().await;
        if paused_until.map_or(true, |current| current < until) {
            *paused_until = Some(until);
            info!("🌐️ Accrual queries paused for {cooldown:?}");
        }
    }

    /// Time left until the gate opens, if it is closed.
    pub async fn remaining(&self) -> Option<Duration> {
        let until = (*self.paused_until.lock().await)?;
        let now = Instant::now();
        (until > now).then(|| until - now)
    }
}

/// Reads `Retry-After` as a whole number of seconds. HTTP-date values and garbage yield `None`.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse::<u64>().ok().map(Duration::from_secs)
}
