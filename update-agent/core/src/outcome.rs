/// Observable result of one orchestration pass.
///
/// A failed pass travels through the error arm of the pass result rather
/// than a variant here, so the underlying diagnostic chain stays available
/// for logging.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UpdateOutcome {
    /// The gate decided not to check this cycle, or the observed remote
    /// version had already been checked on a previous cycle.
    Skipped,
    /// The running firmware is at least as new as the latest published
    /// release.
    UpToDate,
    /// A new image was installed; the device must now restart into it.
    /// Control does not return to the wake-cycle scheduler once the reset
    /// collaborator acts on this.
    RestartRequested,
}
