pub mod backend;
pub mod client;
pub mod teams;
pub mod users;

pub use backend::Backend;
pub use client::ApiClient;
