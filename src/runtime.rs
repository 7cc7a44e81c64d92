//! Event loop integration
//!
//! The store never spawns threads for its deadlines. Instead a calloop timer
//! wakes up shortly after the earliest deadline and calls [`Toaster::tick`].

use std::time::Duration;

use anyhow::Result;
use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};
use tracing::debug;

use crate::toast::Toaster;

/// Shortest delay between two expiry checks
pub const MIN_POLL: Duration = Duration::from_millis(100);

/// Delay between checks when nothing is scheduled
pub const IDLE_POLL: Duration = Duration::from_millis(250);

/// Delay until the next expiry check
pub fn next_poll(toaster: &Toaster) -> Duration {
    toaster
        .time_until_next_timer()
        .map_or(IDLE_POLL, |until| until.min(IDLE_POLL))
        .max(MIN_POLL)
}

/// Register a timer that expires toasts on the given loop
pub fn register_expiry_timer<D>(handle: &LoopHandle<'_, D>, toaster: Toaster) -> Result<RegistrationToken> {
    let timer = Timer::from_duration(next_poll(&toaster));
    handle
        .insert_source(timer, move |_deadline, _metadata, _data| {
            let expired = toaster.tick();
            if !expired.is_empty() {
                debug!(count = expired.len(), "Expired toasts");
            }
            TimeoutAction::ToDuration(next_poll(&toaster))
        })
        .map_err(|e| anyhow::anyhow!("Failed to insert expiry timer: {:?}", e))
}
