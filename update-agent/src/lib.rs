//! The update agent checks the release feed for newer firmware builds and
//! replaces the running image over the air.
//!
//! Effectively it's a very simple state machine that performs the following
//! steps once per wake cycle:
//!
//! 1. increment the persisted wake-cycle counter and decide whether this
//!    cycle should check the release feed at all;
//! 2. query the feed for the tag of the latest published release;
//! 3. record the observed tag, skipping tags already checked on a previous
//!    cycle;
//! 4. compare the tag against the running firmware version;
//! 5. resolve the download location of the firmware binary attached to the
//!    release;
//! 6. stream the binary into the flash primitive and restart into the new
//!    image.
//!
//! Every path short of a successful install returns control to the
//! wake-cycle scheduler so the device can resume its normal duties.

pub mod client;
pub mod executor;
pub mod feed;
pub mod flash;
pub mod json;
pub mod orchestrator;
pub mod reset;
pub mod settings;
pub mod store;

pub use settings::{Args, Settings};

/// Version of the firmware image this agent ships in. Must match the release
/// tag the image was published under.
pub const FIRMWARE_VERSION: &str = "1.0.1";

/// The running firmware version, as exposed to the rest of the device
/// services.
pub fn firmware_version() -> &'static str {
    FIRMWARE_VERSION
}
