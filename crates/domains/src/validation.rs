//! Field rules shared by entities and their creation drafts.
//!
//! Lengths are counted in characters, not bytes.

use crate::error::ValidationError;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 50;
pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 5_000;
pub const TUTORIAL_MAX: usize = 10_000;
pub const COMMENT_MAX: usize = 1_000;
pub const LIST_NAME_MAX: usize = 100;

/// Implemented by every entity and draft that crosses the repository boundary.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

pub(crate) fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Username legality: 3–50 chars of ASCII letters, digits, `_` or `-`,
/// checked after trimming surrounding whitespace.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ValidationError::new("username", "username is required"));
    }
    let len = char_len(username);
    if len < USERNAME_MIN {
        return Err(ValidationError::new(
            "username",
            format!("username must be at least {USERNAME_MIN} characters long"),
        ));
    }
    if len > USERNAME_MAX {
        return Err(ValidationError::new(
            "username",
            format!("username cannot exceed {USERNAME_MAX} characters"),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ValidationError::new(
            "username",
            "username can only contain letters, numbers, underscores, and hyphens",
        ));
    }
    Ok(())
}

/// Basic shape check: one `@`, non-empty halves, a dot in the domain.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::new("email", "email is required"));
    }
    let invalid = || ValidationError::new("email", "invalid email format");
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_external_uid(uid: &str) -> Result<(), ValidationError> {
    if uid.trim().is_empty() {
        return Err(ValidationError::new("firebase_uid", "firebase_uid is required"));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::new("title", "title is required"));
    }
    let len = char_len(title);
    if !(TITLE_MIN..=TITLE_MAX).contains(&len) {
        return Err(ValidationError::new(
            "title",
            format!("title must be between {TITLE_MIN} and {TITLE_MAX} characters"),
        ));
    }
    Ok(())
}

pub fn validate_max_len(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if char_len(value) > max {
        return Err(ValidationError::new(
            field,
            format!("{field} cannot exceed {max} characters"),
        ));
    }
    Ok(())
}

pub fn validate_comment_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::new("content", "content is required"));
    }
    validate_max_len("content", content, COMMENT_MAX)
}

pub fn validate_list_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("name", "name is required"));
    }
    validate_max_len("name", name, LIST_NAME_MAX)
}

/// Ratings carry an integer value in 1..=5.
pub fn validate_rating_value(field: &str, value: i32) -> Result<(), ValidationError> {
    if !(1..=5).contains(&value) {
        return Err(ValidationError::new(
            field,
            format!("{field} must be between 1 and 5"),
        ));
    }
    Ok(())
}

pub fn validate_id(field: &str, id: i64) -> Result<(), ValidationError> {
    if id <= 0 {
        return Err(ValidationError::new(field, format!("valid {field} is required")));
    }
    Ok(())
}
