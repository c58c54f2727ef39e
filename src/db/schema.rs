//! SQL DDL for initializing the vaccination-record storage.

/// SQLite schema:
/// - `users` owns its credential blobs; both are CHECK-constrained to 32
///   bytes, the salt is UNIQUE per account.
/// - `doses` rows are owned by an account (ON DELETE CASCADE) and reference
///   a vaccine without cascade, so a referenced vaccine cannot be deleted.
///
/// `PRAGMA foreign_keys` is per-connection in SQLite and therefore set on the
/// pool's connect options, not here.
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    birth TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    pwd_hash BLOB NOT NULL,
    pwd_salt BLOB NOT NULL UNIQUE,
    CHECK(length(pwd_hash) = 32),
    CHECK(length(pwd_salt) = 32)
);

CREATE TABLE IF NOT EXISTS vaccines (
    vac_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    num_doses INTEGER NOT NULL,
    obs TEXT,
    CHECK(num_doses > 0)
);

CREATE TABLE IF NOT EXISTS doses (
    dose_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    vac_id INTEGER NOT NULL REFERENCES vaccines(vac_id),
    date_taken TEXT NOT NULL
)
"#;
