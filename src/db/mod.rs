//! Database module: models, schema and the storage handle.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows plus request payloads
//! - `schema.rs`: SQL DDL for initializing the database
//! - `seed.rs`: vaccine catalog seed file parsing
//! - `store.rs`: account, catalog and dose operations over a SQLite pool

pub mod models;
pub mod schema;
pub mod seed;
pub mod store;

pub use models::{Dose, NewDose, NewUser, User, UserPatch, Vaccine};
pub use schema::SQLITE_INIT;
pub use store::{SqlitePool, VaxStorage};
