//! Administrator accounts

use serde::{Deserialize, Serialize};

/// Collection holding administrator accounts
pub const ADMINS: &str = "admin";

/// bcrypt work factor for new password hashes
pub const HASH_COST: u32 = bcrypt::DEFAULT_COST;

/// Stored administrator document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccount {
    #[serde(default)]
    pub id: String,
    pub username: String,
    pub password_hash: String,
}

impl AdminAccount {
    /// Hash `password` with bcrypt at `cost`.
    pub fn new(username: &str, password: &str, cost: u32) -> Result<Self, bcrypt::BcryptError> {
        Ok(Self {
            id: String::new(),
            username: username.trim().to_owned(),
            password_hash: bcrypt::hash(password, cost)?,
        })
    }

    /// A malformed stored hash counts as a mismatch.
    pub fn verify(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}

/// Login form
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
