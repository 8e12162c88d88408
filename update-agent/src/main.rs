use std::{borrow::Cow, path::Path};

use clap::Parser as _;
use eyre::WrapErr as _;
use tracing::{debug, error, info, warn};
use trmnl_update_agent::{
    executor::HttpExecutor, feed::GithubFeed, flash::RawFlasher,
    orchestrator::Orchestrator, reset::SystemReset, store::FileStore, Args, Settings,
    FIRMWARE_VERSION,
};
use trmnl_update_agent_core::UpdateGate;

mod agent_result;
use agent_result::AgentResult;

const CFG_DEFAULT_PATH: &str = "/etc/trmnl_update_agent.conf";
const ENV_VAR_PREFIX: &str = "TRMNL_UPDATE_AGENT_";
const CFG_ENV_VAR: &str = const_format::concatcp!(ENV_VAR_PREFIX, "CONFIG");
const SYSLOG_IDENTIFIER: &str = "trmnl-update-agent";

fn main() -> AgentResult {
    let telemetry = trmnl_telemetry::TelemetryConfig::new()
        .with_journald(SYSLOG_IDENTIFIER)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(_) => {
            telemetry.flush_blocking();
            AgentResult::Success
        }
        Err(err) => {
            error!("{err:?}");
            telemetry.flush_blocking();
            err.into()
        }
    }
}

fn get_config_source(args: &Args) -> Cow<'_, Path> {
    if let Some(config) = &args.config {
        info!("using config provided by command line argument: `{config}`");
        Cow::Borrowed(config.as_ref())
    } else if let Some(config) = figment::providers::Env::var(CFG_ENV_VAR) {
        info!("using config set in environment variable `{CFG_ENV_VAR}={config}`");
        Cow::Owned(std::path::PathBuf::from(config))
    } else {
        info!("using default config at `{CFG_DEFAULT_PATH}`");
        Cow::Borrowed(CFG_DEFAULT_PATH.as_ref())
    }
}

fn run(args: &Args) -> eyre::Result<bool> {
    let config_path = get_config_source(args);
    let settings = Settings::get(args, config_path, ENV_VAR_PREFIX)
        .wrap_err("failed reading settings")?;

    let settings_ser = match serde_json::to_string(&settings) {
        Ok(ser) => ser,
        Err(e) => {
            warn!("failed serializing settings as json, printing debug string: {e:?}");
            format!("{settings:?}")
        }
    };
    debug!("running with the following settings: {settings_ser}");

    let store = FileStore::open(&settings.statefile).wrap_err_with(|| {
        format!(
            "failed opening check state at `{}`",
            settings.statefile.display(),
        )
    })?;

    let mut orchestrator = Orchestrator {
        gate: UpdateGate::new(settings.check_interval),
        store,
        feed: GithubFeed::new(
            settings.feed_url.clone(),
            &settings.owner,
            &settings.repo,
        ),
        executor: HttpExecutor::new(RawFlasher::new(&settings.firmware_dst)),
        reset: SystemReset::new(settings.reset_grace),
        current_version: FIRMWARE_VERSION,
        noupdate: settings.noupdate,
    };

    let restarting = orchestrator
        .check_and_update()
        .wrap_err("update pass failed")?;
    if !restarting {
        debug!("no update this pass; returning to the wake-cycle scheduler");
    }
    Ok(restarting)
}
