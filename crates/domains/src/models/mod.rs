//! # Domain Models
//!
//! The entities of the woodworking community. Identities are numeric and
//! assigned by the store on creation.

pub mod comment;
pub mod project;
pub mod project_list;
pub mod rating;
pub mod user;

pub use comment::*;
pub use project::*;
pub use project_list::*;
pub use rating::*;
pub use user::*;

pub type UserId = i64;
pub type ProjectId = i64;
pub type CommentId = i64;
pub type RatingId = i64;
pub type ProjectListId = i64;
