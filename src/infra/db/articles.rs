use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    ArticlePage, ArticlesRepo, ArticlesWriteRepo, CreateArticleParams, RepoError,
    ResolvedArticleFilter,
};
use crate::domain::entities::{ArticleRecord, AuthorRecord};

use super::PostgresRepositories;
use super::util::{like_pattern, map_sqlx_error};

const ARTICLE_COLUMNS: &str = "a.id, a.title, a.description, a.publish_date, \
     a.created_at, a.updated_at, \
     u.id AS author_id, u.email AS author_email, u.first_name AS author_first_name, \
     u.last_name AS author_last_name, u.created_at AS author_created_at, \
     u.updated_at AS author_updated_at";

const RETURNED_ARTICLE: &str =
    "RETURNING id, title, description, publish_date, author_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ArticleRow {
    id: Uuid,
    title: String,
    description: String,
    publish_date: OffsetDateTime,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    author_id: Uuid,
    author_email: String,
    author_first_name: String,
    author_last_name: String,
    author_created_at: OffsetDateTime,
    author_updated_at: OffsetDateTime,
}

impl From<ArticleRow> for ArticleRecord {
    fn from(row: ArticleRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            publish_date: row.publish_date,
            author: AuthorRecord {
                id: row.author_id,
                email: row.author_email,
                first_name: row.author_first_name,
                last_name: row.author_last_name,
                created_at: row.author_created_at,
                updated_at: row.author_updated_at,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PostgresRepositories {
    fn apply_article_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ResolvedArticleFilter) {
        if let Some(search) = filter.search.as_ref() {
            let pattern = like_pattern(search);
            qb.push(" AND (a.title ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR a.description ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        if let Some(range) = filter.publish_range {
            qb.push(" AND a.publish_date BETWEEN ");
            qb.push_bind(range.from);
            qb.push(" AND ");
            qb.push_bind(range.to);
        }

        if let Some(author_id) = filter.author_id {
            qb.push(" AND a.author_id = ");
            qb.push_bind(author_id);
        }
    }
}

#[async_trait]
impl ArticlesRepo for PostgresRepositories {
    async fn query_articles(
        &self,
        filter: &ResolvedArticleFilter,
    ) -> Result<ArticlePage, RepoError> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM articles a WHERE 1=1");
        Self::apply_article_filter(&mut count_qb, filter);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let offset = i64::try_from(filter.offset())
            .map_err(|_| RepoError::InvalidInput {
                message: "page offset exceeds supported range".to_string(),
            })?;

        let mut qb = QueryBuilder::new(format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles a \
             INNER JOIN users u ON u.id = a.author_id WHERE 1=1"
        ));
        Self::apply_article_filter(&mut qb, filter);
        qb.push(" ORDER BY a.publish_date DESC, a.id DESC LIMIT ");
        qb.push_bind(i64::from(filter.limit));
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb
            .build_query_as::<ArticleRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(ArticlePage::new(
            rows.into_iter().map(ArticleRecord::from).collect(),
            Self::convert_count(total)?,
        ))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ArticleRecord>, RepoError> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles a \
             INNER JOIN users u ON u.id = a.author_id WHERE a.id = $1"
        );
        let row = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(ArticleRecord::from))
    }
}

#[async_trait]
impl ArticlesWriteRepo for PostgresRepositories {
    async fn create_article(
        &self,
        params: CreateArticleParams,
    ) -> Result<ArticleRecord, RepoError> {
        let CreateArticleParams {
            title,
            description,
            publish_date,
            author_id,
        } = params;

        let sql = format!(
            "WITH a AS ( \
                 INSERT INTO articles \
                     (id, title, description, publish_date, author_id, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $6) {RETURNED_ARTICLE} \
             ) \
             SELECT {ARTICLE_COLUMNS} FROM a INNER JOIN users u ON u.id = a.author_id"
        );
        let row = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(title)
            .bind(description)
            .bind(publish_date)
            .bind(author_id)
            .bind(OffsetDateTime::now_utc())
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn save_article(&self, article: &ArticleRecord) -> Result<ArticleRecord, RepoError> {
        let sql = format!(
            "WITH a AS ( \
                 UPDATE articles \
                 SET title = $2, description = $3, publish_date = $4, updated_at = $5 \
                 WHERE id = $1 {RETURNED_ARTICLE} \
             ) \
             SELECT {ARTICLE_COLUMNS} FROM a INNER JOIN users u ON u.id = a.author_id"
        );
        let row = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(article.id)
            .bind(&article.title)
            .bind(&article.description)
            .bind(article.publish_date)
            .bind(OffsetDateTime::now_utc())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepoError::NotFound)?;

        Ok(row.into())
    }

    async fn delete_article(&self, article: &ArticleRecord) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(article.id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
