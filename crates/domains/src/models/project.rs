use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ProjectId, UserId};
use crate::error::ValidationError;
use crate::pagination::Pagination;
use crate::validation::{
    validate_id, validate_max_len, validate_title, Validate, DESCRIPTION_MAX, TUTORIAL_MAX,
};

/// Owner-editable content of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetails {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tutorial: String,
    #[serde(default)]
    pub materials: BTreeSet<String>,
    #[serde(default)]
    pub tools: BTreeSet<String>,
    #[serde(default)]
    pub style: BTreeSet<String>,
    #[serde(default)]
    pub environment: BTreeSet<String>,
    /// Cover image reference
    #[serde(default)]
    pub portrait: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// Minutes
    #[serde(default)]
    pub time_to_build: i64,
}

impl Validate for ProjectDetails {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_max_len("description", &self.description, DESCRIPTION_MAX)?;
        validate_max_len("tutorial", &self.tutorial, TUTORIAL_MAX)?;
        if self.time_to_build < 0 {
            return Err(ValidationError::new(
                "time_to_build",
                "time to build cannot be negative",
            ));
        }
        Ok(())
    }
}

/// A published woodworking project.
///
/// `average_rating` and `rating_count` are derived from the project's ratings
/// and are only ever written by the aggregate recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: UserId,
    #[serde(flatten)]
    pub details: ProjectDetails,
    pub average_rating: f64,
    pub rating_count: i64,
}

impl Project {
    pub fn can_be_edited_by(&self, caller: UserId) -> bool {
        self.owner == caller
    }

    pub fn can_be_deleted_by(&self, caller: UserId) -> bool {
        self.owner == caller
    }

    /// Projects are public.
    pub fn can_be_accessed_by(&self, _viewer: Option<UserId>) -> bool {
        true
    }
}

impl Validate for Project {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_id("owner", self.owner)?;
        self.details.validate()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub owner: UserId,
    pub details: ProjectDetails,
}

impl Validate for NewProject {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_id("owner", self.owner)?;
        self.details.validate()
    }
}

/// Partial update; only present fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tutorial: Option<String>,
    pub materials: Option<BTreeSet<String>>,
    pub tools: Option<BTreeSet<String>>,
    pub style: Option<BTreeSet<String>>,
    pub environment: Option<BTreeSet<String>>,
    pub portrait: Option<String>,
    pub images: Option<Vec<String>>,
    pub time_to_build: Option<i64>,
}

impl ProjectUpdateRequest {
    pub fn apply_to(self, details: &mut ProjectDetails) {
        if let Some(title) = self.title {
            details.title = title;
        }
        if let Some(description) = self.description {
            details.description = description;
        }
        if let Some(tutorial) = self.tutorial {
            details.tutorial = tutorial;
        }
        if let Some(materials) = self.materials {
            details.materials = materials;
        }
        if let Some(tools) = self.tools {
            details.tools = tools;
        }
        if let Some(style) = self.style {
            details.style = style;
        }
        if let Some(environment) = self.environment {
            details.environment = environment;
        }
        if let Some(portrait) = self.portrait {
            details.portrait = portrait;
        }
        if let Some(images) = self.images {
            details.images = images;
        }
        if let Some(time_to_build) = self.time_to_build {
            details.time_to_build = time_to_build;
        }
    }
}

/// Search filters. Every filter is optional; results are ranked by
/// average rating, then newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectSearchFilters {
    pub title: Option<String>,
    pub style: Option<String>,
    pub environment: Option<String>,
    pub materials: Option<String>,
    pub tools: Option<String>,
    pub max_time_to_build: Option<i64>,
    pub min_rating: Option<f64>,
    pub page: Pagination,
}
