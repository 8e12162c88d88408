//! Drives the firmware binary transfer and the flash primitive.
use std::io;

use reqwest::StatusCode;
use tracing::info;

use crate::client;

/// Header carrying the running firmware version as a conditional-request
/// hint. A server that tracks device versions may answer 304 instead of
/// re-serving the image.
pub const VERSION_HEADER: &str = "x-firmware-version";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed initializing client to download the firmware image")]
    InitClient(#[from] client::Error),
    #[error("failed sending firmware download request")]
    DownloadRequest(#[source] reqwest::Error),
    #[error("firmware download request returned status `{status_code}`, expected 200-299")]
    DownloadStatus { status_code: StatusCode },
    #[error("firmware flash primitive reported failure: {0:?}")]
    Flash(eyre::Report),
}

/// Result of a completed execution attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecOutcome {
    /// The server judged the running image current; nothing was written.
    UpToDate,
    /// A new image was written and verified; the device must restart into
    /// it.
    Installed,
}

/// The execution seam the orchestrator drives.
pub trait Executor {
    fn execute(
        &mut self,
        download_url: &str,
        current_version: &str,
    ) -> Result<ExecOutcome, Error>;
}

/// The platform firmware-replacement primitive: consumes the image stream
/// and makes it the next boot image.
///
/// Failure diagnostics are preserved through [`Error::Flash`] for logging.
pub trait Flasher {
    fn flash(
        &mut self,
        image: &mut dyn io::Read,
        expected_len: Option<u64>,
    ) -> eyre::Result<()>;
}

/// Transfers the firmware binary over HTTPS and hands the stream to the
/// flash primitive.
pub struct HttpExecutor<F> {
    flasher: F,
}

impl<F> HttpExecutor<F> {
    pub fn new(flasher: F) -> Self {
        Self { flasher }
    }
}

impl<F: Flasher> Executor for HttpExecutor<F> {
    fn execute(
        &mut self,
        download_url: &str,
        current_version: &str,
    ) -> Result<ExecOutcome, Error> {
        info!("starting firmware transfer from {download_url}");

        let client = client::download()?;
        let resp = client
            .get(download_url)
            .header(VERSION_HEADER, current_version)
            .send()
            .map_err(Error::DownloadRequest)?;

        let status = resp.status();
        if status == StatusCode::NOT_MODIFIED {
            info!("server reports the running image is current; nothing to install");
            return Ok(ExecOutcome::UpToDate);
        }
        if !status.is_success() {
            return Err(Error::DownloadStatus {
                status_code: status,
            });
        }

        let expected_len = resp.content_length();
        let mut image = resp;
        self.flasher
            .flash(&mut image, expected_len)
            .map_err(Error::Flash)?;

        info!("firmware image installed");
        Ok(ExecOutcome::Installed)
    }
}
