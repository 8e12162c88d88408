//! End-to-end passes of the orchestration flow against fake collaborators.
use reqwest::StatusCode;
use trmnl_update_agent::{
    executor::{self, ExecOutcome, Executor},
    feed::{self, ReleaseFeed},
    orchestrator::{Error, Orchestrator},
    reset::DeviceReset,
};
use trmnl_update_agent_core::{
    gate::{CHECK_COUNTER_KEY, LAST_CHECKED_VERSION_KEY},
    store::{MemoryStore, StateStore},
    UpdateGate, UpdateOutcome,
};

const CURRENT_VERSION: &str = "1.0.1";
const ASSET_URL: &str =
    "https://github.com/Dreadmond/TRMNL-Weather-Display/releases/download/1.0.2/firmware.bin";

/// Feed fake: `latest: None` simulates an unreachable feed.
struct FakeFeed {
    latest: Option<&'static str>,
    asset_url: &'static str,
}

impl FakeFeed {
    fn reachable(latest: &'static str) -> Self {
        Self {
            latest: Some(latest),
            asset_url: ASSET_URL,
        }
    }

    fn unreachable() -> Self {
        Self {
            latest: None,
            asset_url: ASSET_URL,
        }
    }
}

impl ReleaseFeed for FakeFeed {
    fn fetch_latest(&self) -> Result<String, feed::Error> {
        self.latest
            .map(str::to_owned)
            .ok_or(feed::Error::Status {
                status_code: StatusCode::SERVICE_UNAVAILABLE,
            })
    }

    fn download_url(&self, _version: &str) -> Result<String, feed::Error> {
        Ok(self.asset_url.to_owned())
    }
}

/// Executor fake recording every invocation.
struct FakeExecutor {
    outcome: Result<ExecOutcome, &'static str>,
    calls: Vec<(String, String)>,
}

impl FakeExecutor {
    fn succeeding() -> Self {
        Self {
            outcome: Ok(ExecOutcome::Installed),
            calls: Vec::new(),
        }
    }

    fn flash_failing(diagnostic: &'static str) -> Self {
        Self {
            outcome: Err(diagnostic),
            calls: Vec::new(),
        }
    }
}

impl Executor for FakeExecutor {
    fn execute(
        &mut self,
        download_url: &str,
        current_version: &str,
    ) -> Result<ExecOutcome, executor::Error> {
        self.calls
            .push((download_url.to_owned(), current_version.to_owned()));
        self.outcome
            .map_err(|diagnostic| executor::Error::Flash(eyre::eyre!(diagnostic)))
    }
}

#[derive(Default)]
struct FakeReset {
    restarts: usize,
}

impl DeviceReset for FakeReset {
    fn restart(&mut self) -> eyre::Result<()> {
        self.restarts += 1;
        Ok(())
    }
}

fn orchestrator(
    interval: u32,
    feed: FakeFeed,
    executor: FakeExecutor,
) -> Orchestrator<MemoryStore, FakeFeed, FakeExecutor, FakeReset> {
    Orchestrator {
        gate: UpdateGate::new(interval),
        store: MemoryStore::new(),
        feed,
        executor,
        reset: FakeReset::default(),
        current_version: CURRENT_VERSION,
        noupdate: false,
    }
}

#[test]
fn pass_is_gated_until_the_interval_is_reached() {
    // An unreachable feed would turn any premature check into an error.
    let mut orch = orchestrator(12, FakeFeed::unreachable(), FakeExecutor::succeeding());
    for _ in 1..12 {
        assert_eq!(UpdateOutcome::Skipped, orch.run_once().unwrap());
    }
    assert!(orch.executor.calls.is_empty());
}

#[test]
fn same_remote_tag_reports_up_to_date_without_transfer() {
    let mut orch = orchestrator(1, FakeFeed::reachable("1.0.1"), FakeExecutor::succeeding());
    assert_eq!(UpdateOutcome::UpToDate, orch.run_once().unwrap());
    assert!(orch.executor.calls.is_empty());
}

#[test]
fn newer_tag_drives_the_executor_and_requests_a_restart() {
    let mut orch = orchestrator(1, FakeFeed::reachable("1.0.2"), FakeExecutor::succeeding());
    assert_eq!(UpdateOutcome::RestartRequested, orch.run_once().unwrap());
    assert_eq!(
        vec![(ASSET_URL.to_owned(), CURRENT_VERSION.to_owned())],
        orch.executor.calls,
    );
}

#[test]
fn successful_install_triggers_the_injected_reset() {
    let mut orch = orchestrator(1, FakeFeed::reachable("1.0.2"), FakeExecutor::succeeding());
    assert!(orch.check_and_update().expect("pass should succeed"));
    assert_eq!(1, orch.reset.restarts);
}

#[test]
fn unreachable_feed_fails_the_pass_but_leaves_state_committed() {
    let mut orch = orchestrator(1, FakeFeed::unreachable(), FakeExecutor::succeeding());

    assert!(matches!(orch.run_once(), Err(Error::Fetch(_))));

    // The counter was reset before the network was touched, and no remote
    // version was observed.
    assert_eq!(
        Some(0),
        orch.store.get_u32(CHECK_COUNTER_KEY).unwrap(),
    );
    assert_eq!(
        None,
        orch.store.get_string(LAST_CHECKED_VERSION_KEY).unwrap(),
    );
}

#[test]
fn observed_tag_is_skipped_on_the_next_gated_pass() {
    let mut orch = orchestrator(1, FakeFeed::reachable("1.0.2"), FakeExecutor::flash_failing("no space"));

    assert!(matches!(orch.run_once(), Err(Error::Execute(_))));
    assert_eq!(UpdateOutcome::Skipped, orch.run_once().unwrap());
    assert_eq!(1, orch.executor.calls.len());
}

#[test]
fn flash_failure_keeps_the_device_on_current_firmware() {
    let mut orch = orchestrator(1, FakeFeed::reachable("1.0.2"), FakeExecutor::flash_failing("verify failed"));

    let err = orch.check_and_update().expect_err("flash failure must fail the pass");
    assert!(matches!(err, Error::Execute(executor::Error::Flash(_))));
    assert_eq!(0, orch.reset.restarts);
}

#[test]
fn noupdate_refuses_to_install_a_newer_release() {
    let mut orch = orchestrator(1, FakeFeed::reachable("1.0.2"), FakeExecutor::succeeding());
    orch.noupdate = true;

    assert!(matches!(
        orch.run_once(),
        Err(Error::NoUpdateRequested { version }) if version == "1.0.2",
    ));
    assert!(orch.executor.calls.is_empty());
}

#[test]
fn executor_up_to_date_is_reported_as_up_to_date() {
    let mut orch = orchestrator(1, FakeFeed::reachable("1.0.2"), FakeExecutor::succeeding());
    orch.executor.outcome = Ok(ExecOutcome::UpToDate);

    assert_eq!(UpdateOutcome::UpToDate, orch.run_once().unwrap());
}
