pub mod dashboard;
pub mod notice;
pub mod selection;
pub mod teams;

pub use dashboard::{Dashboard, DashboardView, Overview};
pub use notice::{Notice, NoticeLevel};
pub use selection::{RepoSelection, SelectionError, MAX_SELECTED_REPOS};
pub use teams::{TeamDraft, TeamsView};
