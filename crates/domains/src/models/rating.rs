use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ProjectId, RatingId, UserId};
use crate::error::ValidationError;
use crate::validation::{validate_id, validate_rating_value, Validate};

/// One user's 1–5 score for one project. At most one exists per (user, project).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: RatingId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub value: i32,
    pub user_id: UserId,
    pub project_id: ProjectId,
}

impl Rating {
    pub fn can_be_edited_by(&self, caller: UserId) -> bool {
        self.user_id == caller
    }

    pub fn can_be_deleted_by(&self, caller: UserId) -> bool {
        self.user_id == caller
    }
}

impl Validate for Rating {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_rating_value("value", self.value)?;
        validate_id("user_id", self.user_id)?;
        validate_id("project_id", self.project_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRating {
    pub value: i32,
    pub user_id: UserId,
    pub project_id: ProjectId,
}

impl Validate for NewRating {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_rating_value("value", self.value)?;
        validate_id("user_id", self.user_id)?;
        validate_id("project_id", self.project_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingCreateRequest {
    pub project_id: ProjectId,
    pub value: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatingUpdateRequest {
    pub value: Option<i32>,
}

/// A rating annotated with the rater's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingResponse {
    #[serde(flatten)]
    pub rating: Rating,
    pub username: String,
}
