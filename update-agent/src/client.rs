use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

/// Identifying header sent with every outbound request.
const APP_USER_AGENT: &str = "TRMNL-Weather/1.0";

/// Bounded timeout for release metadata requests.
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(10);
/// Longer timeout appropriate for the multi-hundred-kilobyte firmware
/// binary transfer.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

static METADATA_INSTANCE: OnceCell<Client> = OnceCell::new();
static DOWNLOAD_INSTANCE: OnceCell<Client> = OnceCell::new();

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("failed initializing HTTP client")]
    BuildClient(#[source] reqwest::Error),
}

/// HTTPS client used for release metadata requests.
pub fn metadata() -> Result<&'static Client, Error> {
    METADATA_INSTANCE.get_or_try_init(|| initialize(METADATA_TIMEOUT))
}

/// HTTPS client used for the firmware binary transfer.
pub fn download() -> Result<&'static Client, Error> {
    DOWNLOAD_INSTANCE.get_or_try_init(|| initialize(DOWNLOAD_TIMEOUT))
}

fn initialize(timeout: Duration) -> Result<Client, Error> {
    // We explicitly do not validate the release feed's certificate.
    //
    // This is to avoid a circumstance where a station falls out of sync with
    // the root CA's certificates after an extended period of going without
    // updates and is then unable to pull itself back up to date. The
    // transport stays encrypted; only the peer identity goes unchecked.
    Client::builder()
        .danger_accept_invalid_certs(true)
        .https_only(true)
        .user_agent(APP_USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(Error::BuildClient)
}
