//! Decides whether a release-feed check should run this wake cycle.
use tracing::{debug, info};

use crate::store::{Error, StateStore};

/// Number of wake cycles between release-feed checks.
pub const DEFAULT_CHECK_INTERVAL: u32 = 12;

/// Persisted key holding the wake-cycle counter.
pub const CHECK_COUNTER_KEY: &str = "ota_check_cnt";
/// Persisted key holding the most recently observed remote version.
pub const LAST_CHECKED_VERSION_KEY: &str = "ota_last_v";

/// Counter/interval logic rate-limiting checks against the release feed, plus
/// de-duplication of checks against a remote version that was already seen.
///
/// The gate is the only writer of the persisted check state.
#[derive(Clone, Copy, Debug)]
pub struct UpdateGate {
    check_interval: u32,
}

impl Default for UpdateGate {
    fn default() -> Self {
        Self::new(DEFAULT_CHECK_INTERVAL)
    }
}

impl UpdateGate {
    pub fn new(check_interval: u32) -> Self {
        Self { check_interval }
    }

    /// Increments the persisted wake-cycle counter and reports whether this
    /// cycle should query the release feed.
    ///
    /// The incremented counter is committed before returning on both paths.
    /// On proceeding, the counter is reset to 0 and committed before any
    /// network activity happens, so a crash mid-check cannot cause a tight
    /// retry loop.
    pub fn should_check<S>(&self, store: &mut S) -> Result<bool, Error>
    where
        S: StateStore + ?Sized,
    {
        let counter = store
            .get_u32(CHECK_COUNTER_KEY)?
            .unwrap_or(0)
            .saturating_add(1);
        store.set_u32(CHECK_COUNTER_KEY, counter)?;
        store.commit()?;

        if counter < self.check_interval {
            debug!(
                "skipping update check (counter: {counter}/{})",
                self.check_interval
            );
            return Ok(false);
        }

        store.set_u32(CHECK_COUNTER_KEY, 0)?;
        store.commit()?;
        Ok(true)
    }

    /// Records the version observed on the release feed.
    ///
    /// Returns `true` when the version matches the previously recorded one,
    /// signalling that download-URL resolution and comparison can be skipped.
    /// Otherwise the observed version is committed immediately, before the
    /// newer-than decision is evaluated.
    pub fn record_observed_version<S>(
        &self,
        store: &mut S,
        version: &str,
    ) -> Result<bool, Error>
    where
        S: StateStore + ?Sized,
    {
        let last = store
            .get_string(LAST_CHECKED_VERSION_KEY)?
            .unwrap_or_default();
        if last == version {
            info!("already checked version {version}");
            return Ok(true);
        }

        store.set_string(LAST_CHECKED_VERSION_KEY, version)?;
        store.commit()?;
        Ok(false)
    }
}
