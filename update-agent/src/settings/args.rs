use clap::Parser;
use serde::Serialize;

/// An update utility performing OTA firmware updates of the TRMNL weather
/// station.
///
/// Invoked once per wake cycle by the scheduler. Most cycles only bump the
/// persisted check counter and exit; when the counter reaches the configured
/// interval the agent queries the release feed, and installs and reboots
/// into any release newer than the running firmware.
#[derive(Debug, Parser, Serialize)]
#[command(author, version)]
pub struct Args {
    /// The path to the config file.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    /// Owner of the repository publishing firmware releases.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Name of the repository publishing firmware releases.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// Base URL of the release feed.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_url: Option<String>,
    /// Number of wake cycles between release feed checks.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_interval: Option<u32>,
    /// The path of the persisted check-state file.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statefile: Option<String>,
    /// The flash target the firmware image is written to.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_dst: Option<String>,
    /// Fetches and compares release metadata, but does not download or flash
    /// the image.
    #[arg(long)]
    // Serialization is skipped if not set because command line args always take
    // precedence over env vars and a config file. This would otherwise make it
    // impossible to set this config option outside of cli args.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub noupdate: bool,
    /// Milliseconds to wait after a successful install before resetting the
    /// device.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_grace: Option<u64>,
}
