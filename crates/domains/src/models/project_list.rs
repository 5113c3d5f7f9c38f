use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ProjectId, ProjectListId, UserId};
use crate::error::ValidationError;
use crate::validation::{validate_id, validate_list_name, Validate};

/// A user's curated collection of projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectList {
    pub id: ProjectListId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: UserId,
    pub name: String,
    pub is_public: bool,
}

impl ProjectList {
    /// Public lists are visible to anyone, private ones only to their owner.
    pub fn can_be_accessed_by(&self, viewer: Option<UserId>) -> bool {
        self.is_public || viewer == Some(self.user_id)
    }

    /// Editing is owner-only regardless of visibility.
    pub fn can_be_edited_by(&self, caller: UserId) -> bool {
        self.user_id == caller
    }

    pub fn can_be_deleted_by(&self, caller: UserId) -> bool {
        self.user_id == caller
    }
}

impl Validate for ProjectList {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_list_name(&self.name)?;
        validate_id("user_id", self.user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProjectList {
    pub user_id: UserId,
    pub name: String,
    pub is_public: bool,
}

impl Validate for NewProjectList {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_list_name(&self.name)?;
        validate_id("user_id", self.user_id)
    }
}

/// Membership row; a project appears at most once per list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectListItem {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub project_list_id: ProjectListId,
    pub project_id: ProjectId,
}

impl Validate for ProjectListItem {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_id("project_list_id", self.project_list_id)?;
        validate_id("project_id", self.project_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewProjectListItem {
    pub project_list_id: ProjectListId,
    pub project_id: ProjectId,
}

impl Validate for NewProjectListItem {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_id("project_list_id", self.project_list_id)?;
        validate_id("project_id", self.project_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectListCreateRequest {
    pub name: String,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectListUpdateRequest {
    pub name: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AddProjectRequest {
    pub project_id: ProjectId,
}

/// A project as shown inside a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedProject {
    pub id: ProjectId,
    pub title: String,
    pub portrait: String,
    pub average_rating: f64,
    pub rating_count: i64,
    pub added_at: DateTime<Utc>,
}

/// List metadata with its membership count and, for detail views, its projects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectListResponse {
    #[serde(flatten)]
    pub list: ProjectList,
    pub project_count: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<ListedProject>,
}
