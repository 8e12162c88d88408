//! Host-side flash primitive writing the image over a raw target file.
use std::{fs::File, io, path::PathBuf};

use eyre::{ensure, WrapErr as _};
use tracing::debug;

use crate::executor::Flasher;

/// Writes the downloaded image over the staging firmware target, typically a
/// partition device node or a staging file picked up by the bootloader.
pub struct RawFlasher {
    target: PathBuf,
}

impl RawFlasher {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Flasher for RawFlasher {
    fn flash(
        &mut self,
        image: &mut dyn io::Read,
        expected_len: Option<u64>,
    ) -> eyre::Result<()> {
        let mut target = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.target)
            .wrap_err_with(|| {
                format!("failed to open flash target `{}`", self.target.display())
            })?;

        let written = io::copy(image, &mut target).wrap_err_with(|| {
            format!(
                "I/O copy failed writing image to flash target `{}`",
                self.target.display()
            )
        })?;
        debug!("-- copied {written} bytes");

        if let Some(expected) = expected_len {
            ensure!(
                written == expected,
                "image transfer was truncated: expected {expected} bytes, wrote {written}",
            );
        }

        target.sync_all().wrap_err_with(|| {
            format!("flash target `{}` sync failed", self.target.display())
        })?;
        debug!("-- flushed!");

        Ok(())
    }
}
