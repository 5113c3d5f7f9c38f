//! Fixture builders shared by the service tests.

use chrono::Utc;
use domains::*;

pub fn user(id: UserId) -> User {
    User {
        id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        username: format!("user{id}"),
        email: format!("user{id}@woodys.dev"),
        firebase_uid: format!("fu{id}"),
        reputation: 0.0,
        profile_picture: 0,
    }
}

pub fn project(id: ProjectId, owner: UserId) -> Project {
    Project {
        id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        owner,
        details: ProjectDetails {
            title: "Oak Table".into(),
            ..Default::default()
        },
        average_rating: 0.0,
        rating_count: 0,
    }
}

pub fn comment(id: CommentId, project_id: ProjectId, user_id: UserId) -> Comment {
    Comment {
        id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        project_id,
        user_id,
        body: CommentBody::Active {
            content: "Lovely dovetails".into(),
        },
        rating: None,
        parent_comment_id: None,
    }
}

pub fn rating(id: RatingId, user_id: UserId, project_id: ProjectId, value: i32) -> Rating {
    Rating {
        id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        value,
        user_id,
        project_id,
    }
}

pub fn project_list(id: ProjectListId, owner: UserId, is_public: bool) -> ProjectList {
    ProjectList {
        id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        user_id: owner,
        name: "Favorites".into(),
        is_public,
    }
}
