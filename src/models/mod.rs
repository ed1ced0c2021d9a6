pub mod user;
pub mod metrics;
pub mod team;

pub use user::*;
pub use metrics::*;
pub use team::*;
