//! The single entry-point decision flow tying gate, feed, comparator, and
//! executor together.
//!
//! One pass per wake cycle: `Idle → Gated → Fetching → Comparing →
//! Executing`, terminating in one of restart-requested, up-to-date, skipped,
//! or failed. Only a successful install leaves this module through the
//! injected device reset; every other terminal returns control to the
//! wake-cycle scheduler.
use std::cmp::Ordering;

use tracing::info;
use trmnl_update_agent_core::{
    gate::UpdateGate,
    store::{self, StateStore},
    version, ReleaseInfo, UpdateOutcome,
};

use crate::{
    executor::{self, ExecOutcome, Executor},
    feed::{self, ReleaseFeed},
    reset::DeviceReset,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed reading or writing persisted check state")]
    Store(#[from] store::Error),
    #[error("failed querying the release feed")]
    Fetch(#[source] feed::Error),
    #[error("failed executing the firmware update")]
    Execute(#[source] executor::Error),
    #[error("noupdate was requested; refusing to install release `{version}`")]
    NoUpdateRequested { version: String },
    #[error("failed restarting the device after a successful install: {0:?}")]
    Reset(eyre::Report),
}

/// Composes the persisted gate, the release feed, the version comparator,
/// and the update executor into one decision flow.
pub struct Orchestrator<S, F, X, R> {
    pub gate: UpdateGate,
    pub store: S,
    pub feed: F,
    pub executor: X,
    pub reset: R,
    pub current_version: &'static str,
    /// Fetch and compare, but refuse to install.
    pub noupdate: bool,
}

impl<S, F, X, R> Orchestrator<S, F, X, R>
where
    S: StateStore,
    F: ReleaseFeed,
    X: Executor,
    R: DeviceReset,
{
    /// Runs one orchestration pass.
    ///
    /// All outcomes other than [`UpdateOutcome::RestartRequested`] leave the
    /// device on its current firmware. The persisted counter is committed
    /// before the feed is queried, and the observed version is committed
    /// before the newer-than decision, so an aborted pass never causes a
    /// retry storm.
    pub fn run_once(&mut self) -> Result<UpdateOutcome, Error> {
        if !self.gate.should_check(&mut self.store)? {
            return Ok(UpdateOutcome::Skipped);
        }

        info!(
            "checking for firmware updates; current version: {}",
            self.current_version
        );
        let latest = self.feed.fetch_latest().map_err(Error::Fetch)?;

        if self
            .gate
            .record_observed_version(&mut self.store, &latest)?
        {
            return Ok(UpdateOutcome::Skipped);
        }

        if version::compare(self.current_version, &latest) != Ordering::Less {
            info!("already running the latest version");
            return Ok(UpdateOutcome::UpToDate);
        }

        info!("new version {latest} available");
        let release = ReleaseInfo {
            download_url: self.feed.download_url(&latest).map_err(Error::Fetch)?,
            version: latest,
        };

        if self.noupdate {
            return Err(Error::NoUpdateRequested {
                version: release.version,
            });
        }

        info!(
            "downloading release {} from {}",
            release.version, release.download_url
        );
        match self
            .executor
            .execute(&release.download_url, self.current_version)
            .map_err(Error::Execute)?
        {
            ExecOutcome::UpToDate => Ok(UpdateOutcome::UpToDate),
            ExecOutcome::Installed => Ok(UpdateOutcome::RestartRequested),
        }
    }

    /// Entry point handed to the wake-cycle scheduler: runs one pass and
    /// triggers the injected device reset when a new image was installed.
    ///
    /// Returns whether a restart was triggered. Under normal operation a
    /// `true` return is never observed, because the device resets first.
    pub fn check_and_update(&mut self) -> Result<bool, Error> {
        match self.run_once()? {
            UpdateOutcome::RestartRequested => {
                info!("update successful, restarting");
                self.reset.restart().map_err(Error::Reset)?;
                Ok(true)
            }
            UpdateOutcome::Skipped | UpdateOutcome::UpToDate => Ok(false),
        }
    }
}
