// Per-user session state and the handlers that drive it.

pub mod handlers;
pub mod models;
pub mod store;
