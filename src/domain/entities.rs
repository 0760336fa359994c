//! Domain entities mirrored from persistent storage.
//!
//! Serialized field names follow the public JSON shape (`camelCase`), which is
//! also the shape stored in the article cache.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Outward view of a user embedded in every article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRecord {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub publish_date: OffsetDateTime,
    pub author: AuthorRecord,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ArticleRecord {
    pub fn is_authored_by(&self, user: &ActingUser) -> bool {
        self.author.id == user.id()
    }
}

/// Stored user row. The credential hash never leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub token_prefix: String,
    #[serde(skip_serializing)]
    pub credential_hash: Vec<u8>,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&UserRecord> for AuthorRecord {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Already-authenticated identity handed to write operations.
///
/// Only identity equality matters to the article layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActingUser {
    id: Uuid,
}

impl ActingUser {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl From<&UserRecord> for ActingUser {
    fn from(user: &UserRecord) -> Self {
        Self::new(user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserRecord {
        let now = OffsetDateTime::now_utc();
        UserRecord {
            id: Uuid::new_v4(),
            email: "writer@example.com".to_string(),
            token_prefix: "abc123def456".to_string(),
            credential_hash: vec![1, 2, 3],
            first_name: "Ada".to_string(),
            last_name: "Writer".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn user_serialization_omits_credentials() {
        let json = serde_json::to_value(sample_user()).expect("serialize user");
        let object = json.as_object().expect("object");
        assert!(object.contains_key("firstName"));
        assert!(!object.contains_key("credentialHash"));
        assert!(!object.contains_key("tokenPrefix"));
    }

    #[test]
    fn authorship_compares_identity_only() {
        let user = sample_user();
        let now = OffsetDateTime::now_utc();
        let article = ArticleRecord {
            id: Uuid::new_v4(),
            title: "Title".to_string(),
            description: "Description text".to_string(),
            publish_date: now,
            author: AuthorRecord::from(&user),
            created_at: now,
            updated_at: now,
        };

        assert!(article.is_authored_by(&ActingUser::from(&user)));
        assert!(!article.is_authored_by(&ActingUser::new(Uuid::new_v4())));
    }
}
