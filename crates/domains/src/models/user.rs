use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use crate::error::ValidationError;
use crate::validation::{
    validate_email, validate_external_uid, validate_username, Validate,
};

/// A community member.
///
/// `username`, `email` and `firebase_uid` are each globally unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub username: String,
    pub email: String,
    /// Opaque token issued by the external identity provider. It doubles as
    /// the bearer credential, so it is never written out.
    #[serde(skip_serializing)]
    pub firebase_uid: String,
    pub reputation: f64,
    /// Reference to a stored profile picture, 0 when unset
    pub profile_picture: i64,
}

impl User {
    pub fn can_be_edited_by(&self, caller: UserId) -> bool {
        self.id == caller
    }

    pub fn can_be_deleted_by(&self, caller: UserId) -> bool {
        self.id == caller
    }
}

impl Validate for User {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_external_uid(&self.firebase_uid)?;
        if self.reputation < 0.0 || self.reputation.is_nan() {
            return Err(ValidationError::new("reputation", "reputation cannot be negative"));
        }
        if self.profile_picture < 0 {
            return Err(ValidationError::new(
                "profile_picture",
                "profile_picture cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Insert payload for a user. Reputation and picture start at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub firebase_uid: String,
}

impl NewUser {
    /// Trims every field and lowercases the email.
    pub fn normalized(req: &UserCreateRequest) -> Self {
        Self {
            username: req.username.trim().to_string(),
            email: req.email.trim().to_lowercase(),
            firebase_uid: req.firebase_uid.trim().to_string(),
        }
    }
}

impl Validate for NewUser {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_external_uid(&self.firebase_uid)
    }
}

/// Signup request.
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreateRequest {
    pub username: String,
    pub email: String,
    pub firebase_uid: String,
}

/// Partial update; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdateRequest {
    pub username: Option<String>,
    pub reputation: Option<f64>,
    pub profile_picture: Option<i64>,
}
