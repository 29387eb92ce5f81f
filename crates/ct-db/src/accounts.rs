//! Email/password accounts.
//!
//! Passwords are stored as argon2 PHC strings. Emails are compared
//! case-insensitively and stored lowercased.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::{DateTime, Utc};
use ct_core::OwnerId;
use rand_core::OsRng;
use rusqlite::{OptionalExtension, params};
use thiserror::Error;
use uuid::Uuid;

use crate::{Database, DbError, format_timestamp, invalid, parse_timestamp};

/// Minimum password length accepted at sign-up and password change.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Authentication and account errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("password should be at least 6 characters")]
    WeakPassword,
    #[error("email already in use: {0}")]
    EmailInUse(String),
    /// Unknown email or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("account not found")]
    AccountNotFound,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Storage(#[from] DbError),
}

impl From<rusqlite::Error> for AuthError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(err))
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: OwnerId,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

struct AccountRow {
    id: String,
    email: String,
    password_hash: String,
    display_name: Option<String>,
    created_at: String,
}

impl AccountRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            display_name: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn into_account(self) -> Result<Account, DbError> {
        let created_at = parse_timestamp(&self.created_at, &self.id)?;
        let id = OwnerId::new(self.id).map_err(|e| invalid("account", &e))?;
        Ok(Account {
            id,
            email: self.email,
            display_name: self.display_name,
            created_at,
        })
    }
}

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, display_name, created_at";

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty() && !domain.contains('@'));
    if valid {
        Ok(email)
    } else {
        Err(AuthError::InvalidEmail(email))
    }
}

fn check_strength(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AuthError::Hash(err.to_string()))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored).map_err(|err| AuthError::Hash(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

impl Database {
    /// Registers a new account.
    pub fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Account, AuthError> {
        let email = normalize_email(email)?;
        check_strength(password)?;
        if self.account_row_by_email(&email)?.is_some() {
            return Err(AuthError::EmailInUse(email));
        }

        let account = Account {
            id: OwnerId::new(Uuid::new_v4().to_string()).map_err(|e| invalid("account", &e))?,
            email,
            display_name: None,
            created_at: now,
        };
        self.insert_account(&account, &hash_password(password)?)?;
        tracing::debug!(account = %account.id, "account created");
        Ok(account)
    }

    /// Inserts the account row. A concurrent sign-up that claimed the same
    /// email first surfaces as [`AuthError::EmailInUse`].
    fn insert_account(&self, account: &Account, password_hash: &str) -> Result<(), AuthError> {
        let inserted = self.conn.execute(
            "INSERT INTO users (id, email, password_hash, display_name, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                account.id.as_str(),
                account.email,
                password_hash,
                account.display_name,
                format_timestamp(account.created_at),
            ],
        );
        match inserted {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(AuthError::EmailInUse(account.email.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Checks credentials and returns the matching account.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let Ok(email) = normalize_email(email) else {
            return Err(AuthError::InvalidCredentials);
        };
        let Some(row) = self.account_row_by_email(&email)? else {
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(password, &row.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(row.into_account()?)
    }

    /// Looks up an account by ID.
    pub fn account(&self, id: &OwnerId) -> Result<Option<Account>, AuthError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = ?"),
                [id.as_str()],
                AccountRow::from_row,
            )
            .optional()?;
        Ok(row.map(AccountRow::into_account).transpose()?)
    }

    /// Sets the display name. Blank input clears it.
    pub fn update_display_name(
        &mut self,
        id: &OwnerId,
        name: Option<&str>,
    ) -> Result<Account, AuthError> {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        let updated = self.conn.execute(
            "UPDATE users SET display_name = ? WHERE id = ?",
            params![name, id.as_str()],
        )?;
        if updated == 0 {
            return Err(AuthError::AccountNotFound);
        }
        self.account(id)?.ok_or(AuthError::AccountNotFound)
    }

    /// Replaces the password after the same strength check as sign-up.
    pub fn update_password(&mut self, id: &OwnerId, new_password: &str) -> Result<(), AuthError> {
        check_strength(new_password)?;
        let updated = self.conn.execute(
            "UPDATE users SET password_hash = ? WHERE id = ?",
            params![hash_password(new_password)?, id.as_str()],
        )?;
        if updated == 0 {
            return Err(AuthError::AccountNotFound);
        }
        tracing::debug!(account = %id, "password updated");
        Ok(())
    }

    fn account_row_by_email(&self, email: &str) -> Result<Option<AccountRow>, AuthError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE email = ?"),
                [email],
                AccountRow::from_row,
            )
            .optional()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn sign_up_then_sign_in() {
        let mut db = Database::open_in_memory().unwrap();
        let account = db.sign_up(" Ada@Example.com ", "secret1", now()).unwrap();
        assert_eq!(account.email, "ada@example.com");
        assert_eq!(account.display_name, None);

        let signed_in = db.sign_in("ADA@example.com", "secret1").unwrap();
        assert_eq!(signed_in, account);
    }

    #[test]
    fn duplicate_insert_maps_to_email_in_use() {
        let mut db = Database::open_in_memory().unwrap();
        let first = db.sign_up("ada@example.com", "secret1", now()).unwrap();

        let racing = Account {
            id: OwnerId::new("racing-account").unwrap(),
            ..first
        };
        let err = db.insert_account(&racing, "hash").unwrap_err();
        assert!(matches!(err, AuthError::EmailInUse(email) if email == "ada@example.com"));
    }

    #[test]
    fn sign_in_rejects_wrong_password_and_unknown_email() {
        let mut db = Database::open_in_memory().unwrap();
        db.sign_up("ada@example.com", "secret1", now()).unwrap();

        assert!(matches!(
            db.sign_in("ada@example.com", "wrong-password"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            db.sign_in("bob@example.com", "secret1"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            db.sign_in("not-an-email", "secret1"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn sign_up_validates_input() {
        let mut db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.sign_up("nobody", "secret1", now()),
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            db.sign_up("ada@example.com", "12345", now()),
            Err(AuthError::WeakPassword)
        ));

        db.sign_up("ada@example.com", "secret1", now()).unwrap();
        assert!(matches!(
            db.sign_up("ADA@example.com", "another1", now()),
            Err(AuthError::EmailInUse(_))
        ));
    }

    #[test]
    fn password_is_not_stored_in_plain_text() {
        let mut db = Database::open_in_memory().unwrap();
        let account = db.sign_up("ada@example.com", "secret1", now()).unwrap();
        let stored: String = db
            .conn
            .query_row(
                "SELECT password_hash FROM users WHERE id = ?",
                [account.id.as_str()],
                |row| row.get(0),
            )
            .unwrap();
        assert!(stored.starts_with("$argon2"));
        assert!(!stored.contains("secret1"));
    }

    #[test]
    fn profile_updates() {
        let mut db = Database::open_in_memory().unwrap();
        let account = db.sign_up("ada@example.com", "secret1", now()).unwrap();

        let named = db.update_display_name(&account.id, Some(" Ada ")).unwrap();
        assert_eq!(named.display_name.as_deref(), Some("Ada"));
        let cleared = db.update_display_name(&account.id, Some("  ")).unwrap();
        assert_eq!(cleared.display_name, None);

        assert!(matches!(
            db.update_password(&account.id, "short"),
            Err(AuthError::WeakPassword)
        ));
        db.update_password(&account.id, "better-secret").unwrap();
        assert!(db.sign_in("ada@example.com", "secret1").is_err());
        assert!(db.sign_in("ada@example.com", "better-secret").is_ok());
    }

    #[test]
    fn unknown_account_is_reported() {
        let mut db = Database::open_in_memory().unwrap();
        let ghost = OwnerId::new("ghost").unwrap();
        assert_eq!(db.account(&ghost).unwrap(), None);
        assert!(matches!(
            db.update_display_name(&ghost, Some("x")),
            Err(AuthError::AccountNotFound)
        ));
    }
}
