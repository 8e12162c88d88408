#![forbid(unsafe_code)]
#![warn(unreachable_pub)]

pub mod gate;
mod outcome;
mod release;
pub mod store;
pub mod version;

pub use gate::UpdateGate;
pub use outcome::UpdateOutcome;
pub use release::ReleaseInfo;
pub use store::{MemoryStore, StateStore};
pub use version::Version;
