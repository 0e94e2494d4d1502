//! Seams between the request client and its collaborators.

mod navigator;
mod refresher;
mod transport;

pub use navigator::{Navigator, NoopNavigator};
pub use refresher::{RefreshOutcome, Refresher};
pub use transport::Transport;
