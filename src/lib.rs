pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use auth::Credentials;
pub use db::VaxStorage;
pub use error::VaxError;
