mod checkers;
pub(crate) mod handlers;
pub(crate) mod models;

pub use handlers::router;
