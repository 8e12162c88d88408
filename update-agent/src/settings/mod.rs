use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use figment::providers::Format as _;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use trmnl_update_agent_core::gate::DEFAULT_CHECK_INTERVAL;
use url::Url;

mod args;
pub use args::Args;


/// `Settings` are the configurable options for running the update agent.
///
/// The only entry point to construct `Settings` is `Settings::get`.
#[serde_as]
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Owner of the repository publishing firmware releases.
    pub owner: String,
    /// Name of the repository publishing firmware releases.
    pub repo: String,
    /// Base URL of the release feed.
    #[serde(default = "default_feed_url")]
    pub feed_url: Url,
    /// Number of wake cycles between release feed checks.
    #[serde(default = "default_check_interval")]
    pub check_interval: u32,
    /// Path of the persisted check-state file.
    pub statefile: PathBuf,
    /// Flash target the firmware image is written to.
    pub firmware_dst: PathBuf,
    /// Fetch and compare release metadata, but do not install.
    #[serde(default)]
    pub noupdate: bool,
    /// Grace period between a successful install and the device reset.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(default = "default_reset_grace")]
    pub reset_grace: Duration,
}

fn default_feed_url() -> Url {
    Url::parse("https://api.github.com").expect("default feed URL must parse")
}

fn default_check_interval() -> u32 {
    DEFAULT_CHECK_INTERVAL
}

fn default_reset_grace() -> Duration {
    Duration::from_millis(1000)
}

impl Settings {
    /// Constructs `Settings` from a config file, environment variables, and command line
    /// arguments. Command line arguments always take precedence over environment variables, which
    /// in turn take precedence over the config file.
    pub fn get<P: AsRef<Path>>(
        args: &Args,
        config: P,
        env_prefix: &str,
    ) -> figment::error::Result<Settings> {
        figment::Figment::new()
            .merge(figment::providers::Toml::file(config))
            .merge(figment::providers::Env::prefixed(env_prefix))
            .merge(figment::providers::Serialized::defaults(args))
            .extract()
    }
}
