pub mod config;
pub mod error;
pub mod models;
pub mod api;
pub mod storage;
pub mod session;
pub mod progress;
pub mod views;
pub mod render;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, ViewConfig};
pub use error::{Error, Result};
pub use api::{ApiClient, Backend};
pub use session::{Session, SessionState};
pub use storage::Storage;
pub use progress::{PollHandle, ProgressPoller, ProgressState};
pub use views::{Dashboard, Notice, TeamsView};
