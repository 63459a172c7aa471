pub mod categories;
pub mod health;
pub mod routes;
pub mod subscriptions;

pub use routes::{json_config, routes};
