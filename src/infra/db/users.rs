use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreateUserParams, RepoError, UsersRepo};
use crate::domain::entities::UserRecord;

use super::PostgresRepositories;
use super::util::map_sqlx_error;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    token_prefix: String,
    credential_hash: Vec<u8>,
    first_name: String,
    last_name: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            token_prefix: row.token_prefix,
            credential_hash: row.credential_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (
                id, email, token_prefix, credential_hash, first_name, last_name,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id, email, token_prefix, credential_hash, first_name, last_name,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(params.email)
        .bind(params.token_prefix)
        .bind(params.credential_hash)
        .bind(params.first_name)
        .bind(params.last_name)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_by_token_prefix(&self, prefix: &str) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, token_prefix, credential_hash, first_name, last_name,
                   created_at, updated_at
            FROM users
            WHERE token_prefix = $1
            "#,
        )
        .bind(prefix)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }
}
