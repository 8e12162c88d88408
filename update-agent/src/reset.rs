//! Full device reset into the freshly installed image.
use std::{io::Write as _, process::Command, thread, time::Duration};

use eyre::{ensure, WrapErr as _};
use tracing::debug;

/// Restarts the device.
///
/// Invoked only after the orchestration pass reaches its restart-requested
/// terminal state. Implementations are expected not to return under normal
/// operation.
pub trait DeviceReset {
    fn restart(&mut self) -> eyre::Result<()>;
}

/// Reboots the host through `systemctl` after flushing pending diagnostic
/// output and waiting out a short grace period.
pub struct SystemReset {
    grace: Duration,
}

impl SystemReset {
    pub fn new(grace: Duration) -> Self {
        Self { grace }
    }
}

impl DeviceReset for SystemReset {
    fn restart(&mut self) -> eyre::Result<()> {
        std::io::stdout().flush().ok();
        std::io::stderr().flush().ok();
        thread::sleep(self.grace);

        debug!("issuing reboot through `/bin/systemctl`");
        let output = Command::new("/bin/systemctl")
            .arg("reboot")
            .output()
            .wrap_err("failed spawning `/bin/systemctl reboot`")?;
        ensure!(
            output.status.success(),
            "command `/bin/systemctl reboot` failed with status code `{:?}` and stderr `{:?}`",
            output.status,
            String::from_utf8_lossy(&output.stderr),
        );
        Ok(())
    }
}
