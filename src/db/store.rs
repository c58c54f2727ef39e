use crate::auth::Credentials;
use crate::db::models::{Dose, NewDose, NewUser, User, UserPatch, Vaccine};
use crate::db::schema::SQLITE_INIT;
use crate::db::seed::VaccineSeed;
use crate::error::VaxError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite, Transaction};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

/// Plan for the credential columns inside an account update transaction.
/// `Replace` carries a freshly issued salt+digest pair; the old salt is
/// never reused.
enum CredentialChange {
    Keep,
    Replace(Credentials),
}

/// Storage handle for accounts, the vaccine catalog and the dose ledger.
///
/// Cloneable and explicitly passed; all shared state lives in the pool.
#[derive(Clone)]
pub struct VaxStorage {
    pool: SqlitePool,
}

impl VaxStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the SQLite database behind `database_url`.
    /// Foreign keys are enforced on every pooled connection.
    pub async fn connect(database_url: &str) -> Result<Self, VaxError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), VaxError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Idempotent catalog seeding: rows whose name is already present are
    /// skipped. Returns the number of rows inserted.
    pub async fn seed_vaccines(&self, seeds: &[VaccineSeed]) -> Result<u64, VaxError> {
        let mut inserted = 0;
        for seed in seeds {
            let res = sqlx::query(
                "INSERT OR IGNORE INTO vaccines (name, num_doses, obs) VALUES (?, ?, ?)",
            )
            .bind(&seed.name)
            .bind(seed.num_doses)
            .bind(&seed.obs)
            .execute(&self.pool)
            .await?;
            inserted += res.rows_affected();
        }
        Ok(inserted)
    }

    /// Register a new account: issue fresh credentials, persist the row, then
    /// re-read through [`Self::authenticate`] to return the canonical stored
    /// representation.
    pub async fn create_user(&self, new: NewUser) -> Result<User, VaxError> {
        let creds = Credentials::issue(&new.password)?;

        sqlx::query(
            r#"
            INSERT INTO users (username, name, birth, email, pwd_hash, pwd_salt)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.username)
        .bind(&new.name)
        .bind(&new.birth)
        .bind(&new.email)
        .bind(creds.hash.to_vec())
        .bind(creds.salt.to_vec())
        .execute(&self.pool)
        .await?;

        self.authenticate(&new.username, &new.password).await
    }

    /// Resolve a username and verify the supplied password against the stored
    /// credentials. This is the single authorization gate: every other
    /// authenticated operation calls through here first.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, VaxError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, username, name, birth, email, pwd_hash, pwd_salt
            FROM users WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(VaxError::NotFound);
        };

        let creds = Self::credentials_from_row(&row)?;
        if !creds.verify(password) {
            return Err(VaxError::InvalidCredentials);
        }

        Ok(User {
            user_id: row.try_get("user_id")?,
            username: row.try_get("username")?,
            name: row.try_get("name")?,
            birth: row.try_get("birth")?,
            email: row.try_get("email")?,
        })
    }

    /// Apply a partial update to an authenticated account.
    ///
    /// Absent patch fields are copied forward from the current row. When the
    /// patch carries a new password, a brand-new salt+digest pair replaces the
    /// credential columns in the same transaction as the profile columns:
    /// either both commit or neither does.
    pub async fn update_user(
        &self,
        username: &str,
        password: &str,
        patch: UserPatch,
    ) -> Result<User, VaxError> {
        let current = self.authenticate(username, password).await?;

        // Randomness is checked before any persistence attempt.
        let plan = match patch.new_password.as_deref() {
            Some(pwd) => CredentialChange::Replace(Credentials::issue(pwd)?),
            None => CredentialChange::Keep,
        };

        let name = patch.name.unwrap_or(current.name);
        let birth = patch.birth.unwrap_or(current.birth);
        let email = patch.email.unwrap_or(current.email);

        let mut tx = self.pool.begin().await?;
        if let Err(err) =
            Self::apply_update(&mut tx, current.user_id, &name, &birth, &email, &plan).await
        {
            // A failed rollback is reported in place of the original error.
            return match tx.rollback().await {
                Ok(()) => Err(err),
                Err(rollback_err) => Err(rollback_err.into()),
            };
        }
        tx.commit().await?;

        self.user_by_id(current.user_id).await
    }

    async fn apply_update(
        tx: &mut Transaction<'_, Sqlite>,
        user_id: i64,
        name: &str,
        birth: &str,
        email: &str,
        plan: &CredentialChange,
    ) -> Result<(), VaxError> {
        if let CredentialChange::Replace(creds) = plan {
            sqlx::query("UPDATE users SET pwd_hash = ?, pwd_salt = ? WHERE user_id = ?")
                .bind(creds.hash.to_vec())
                .bind(creds.salt.to_vec())
                .bind(user_id)
                .execute(&mut **tx)
                .await?;
        }

        sqlx::query("UPDATE users SET name = ?, birth = ?, email = ? WHERE user_id = ?")
            .bind(name)
            .bind(birth)
            .bind(email)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Delete an authenticated account. Dependent dose rows are removed by
    /// the `ON DELETE CASCADE` foreign key.
    pub async fn delete_user(&self, username: &str, password: &str) -> Result<(), VaxError> {
        let user = self.authenticate(username, password).await?;
        sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(user.user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_vaccines(&self) -> Result<Vec<Vaccine>, VaxError> {
        let vaccines = sqlx::query_as::<_, Vaccine>(
            "SELECT vac_id, name, num_doses, obs FROM vaccines ORDER BY vac_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(vaccines)
    }

    /// Dose records owned by the authenticated account, oldest first.
    pub async fn list_doses(&self, username: &str, password: &str) -> Result<Vec<Dose>, VaxError> {
        let user = self.authenticate(username, password).await?;
        let doses = sqlx::query_as::<_, Dose>(
            r#"
            SELECT dose_id, user_id, vac_id, date_taken
            FROM doses WHERE user_id = ? ORDER BY dose_id
            "#,
        )
        .bind(user.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(doses)
    }

    /// Append a dose record for the authenticated account and return the
    /// persisted row.
    pub async fn register_dose(
        &self,
        username: &str,
        password: &str,
        new: NewDose,
    ) -> Result<Dose, VaxError> {
        let user = self.authenticate(username, password).await?;

        let known: Option<(i64,)> = sqlx::query_as("SELECT vac_id FROM vaccines WHERE vac_id = ?")
            .bind(new.vac_id)
            .fetch_optional(&self.pool)
            .await?;
        if known.is_none() {
            return Err(VaxError::UnknownVaccine(new.vac_id));
        }

        let res = sqlx::query("INSERT INTO doses (user_id, vac_id, date_taken) VALUES (?, ?, ?)")
            .bind(user.user_id)
            .bind(new.vac_id)
            .bind(&new.date_taken)
            .execute(&self.pool)
            .await?;

        self.dose_by_id(res.last_insert_rowid()).await
    }

    async fn user_by_id(&self, user_id: i64) -> Result<User, VaxError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, name, birth, email FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn dose_by_id(&self, dose_id: i64) -> Result<Dose, VaxError> {
        let dose = sqlx::query_as::<_, Dose>(
            "SELECT dose_id, user_id, vac_id, date_taken FROM doses WHERE dose_id = ?",
        )
        .bind(dose_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(dose)
    }

    fn credentials_from_row(row: &SqliteRow) -> Result<Credentials, VaxError> {
        let hash: Vec<u8> = row.try_get("pwd_hash")?;
        let salt: Vec<u8> = row.try_get("pwd_salt")?;
        Credentials::from_parts(&hash, &salt).ok_or_else(|| {
            VaxError::Storage(sqlx::Error::ColumnDecode {
                index: "pwd_hash".into(),
                source: "stored credential blob is not 32 bytes".into(),
            })
        })
    }
}
