use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Driver,
    Passenger,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Driver => "DRIVER",
            Role::Passenger => "PASSENGER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRIVER" => Some(Role::Driver),
            "PASSENGER" => Some(Role::Passenger),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_digest: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-user public profile carrying the rating aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub rating: f64,
    pub number_of_ratings: i32,
    pub is_verified: bool,
}

impl Profile {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            phone: None,
            bio: None,
            rating: 0.0,
            number_of_ratings: 0,
            is_verified: false,
        }
    }
}

/// Salted SHA-256 digest, hex encoded as "salt$hash".
pub fn password_digest(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let hash = hasher.finalize();

    let mut out = String::with_capacity(salt.len() + 1 + hash.len() * 2);
    out.push_str(salt);
    out.push('$');
    for byte in hash {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

pub fn verify_password(password: &str, digest: &str) -> bool {
    match digest.split_once('$') {
        Some((salt, _)) => password_digest(password, salt) == digest,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let digest = password_digest("hunter2", "a1b2c3");
        assert!(verify_password("hunter2", &digest));
        assert!(!verify_password("hunter3", &digest));
    }

    #[test]
    fn test_malformed_digest_rejected() {
        assert!(!verify_password("anything", "no-separator"));
    }
}
