pub mod poller;
pub mod state;

pub use poller::{PollHandle, ProgressPoller};
pub use state::{ProgressState, PROGRESS_DONE};
