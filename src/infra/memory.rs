//! Process-local repositories with the same query semantics as Postgres.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::repos::{
    ArticlePage, ArticlesRepo, ArticlesWriteRepo, CreateArticleParams, CreateUserParams,
    RepoError, ResolvedArticleFilter, UsersRepo,
};
use crate::domain::entities::{ArticleRecord, AuthorRecord, UserRecord};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, UserRecord>,
    articles: HashMap<Uuid, ArticleRecord>,
}

#[derive(Default)]
pub struct InMemoryArticles {
    state: RwLock<State>,
}

impl InMemoryArticles {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn article_count(&self) -> usize {
        self.state.read().await.articles.len()
    }
}

fn matches_filter(article: &ArticleRecord, filter: &ResolvedArticleFilter) -> bool {
    if let Some(search) = filter.search.as_ref() {
        let needle = search.to_lowercase();
        if !article.title.to_lowercase().contains(&needle)
            && !article.description.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    if let Some(range) = filter.publish_range
        && !range.contains(article.publish_date)
    {
        return false;
    }
    if let Some(author_id) = filter.author_id
        && article.author.id != author_id
    {
        return false;
    }
    true
}

#[async_trait]
impl ArticlesRepo for InMemoryArticles {
    async fn query_articles(
        &self,
        filter: &ResolvedArticleFilter,
    ) -> Result<ArticlePage, RepoError> {
        let state = self.state.read().await;
        let mut matching: Vec<&ArticleRecord> = state
            .articles
            .values()
            .filter(|article| matches_filter(article, filter))
            .collect();
        matching.sort_by(|a, b| {
            b.publish_date
                .cmp(&a.publish_date)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as u64;
        let offset = usize::try_from(filter.offset()).unwrap_or(usize::MAX);
        let articles = matching
            .into_iter()
            .skip(offset)
            .take(filter.limit as usize)
            .cloned()
            .collect();

        Ok(ArticlePage::new(articles, total))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ArticleRecord>, RepoError> {
        Ok(self.state.read().await.articles.get(&id).cloned())
    }
}

#[async_trait]
impl ArticlesWriteRepo for InMemoryArticles {
    async fn create_article(
        &self,
        params: CreateArticleParams,
    ) -> Result<ArticleRecord, RepoError> {
        let mut state = self.state.write().await;
        let author = state
            .users
            .get(&params.author_id)
            .map(AuthorRecord::from)
            .ok_or_else(|| RepoError::InvalidInput {
                message: format!("author `{}` does not exist", params.author_id),
            })?;

        let now = OffsetDateTime::now_utc();
        let article = ArticleRecord {
            id: Uuid::new_v4(),
            title: params.title,
            description: params.description,
            publish_date: params.publish_date,
            author,
            created_at: now,
            updated_at: now,
        };
        state.articles.insert(article.id, article.clone());
        Ok(article)
    }

    async fn save_article(&self, article: &ArticleRecord) -> Result<ArticleRecord, RepoError> {
        let mut state = self.state.write().await;
        let stored = state
            .articles
            .get_mut(&article.id)
            .ok_or(RepoError::NotFound)?;
        stored.title = article.title.clone();
        stored.description = article.description.clone();
        stored.publish_date = article.publish_date;
        stored.updated_at = OffsetDateTime::now_utc();
        Ok(stored.clone())
    }

    async fn delete_article(&self, article: &ArticleRecord) -> Result<(), RepoError> {
        self.state
            .write()
            .await
            .articles
            .remove(&article.id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UsersRepo for InMemoryArticles {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let mut state = self.state.write().await;
        if state.users.values().any(|user| user.email == params.email) {
            return Err(RepoError::Duplicate {
                constraint: "users_email_key".to_string(),
            });
        }

        let now = OffsetDateTime::now_utc();
        let user = UserRecord {
            id: Uuid::new_v4(),
            email: params.email,
            token_prefix: params.token_prefix,
            credential_hash: params.credential_hash,
            first_name: params.first_name,
            last_name: params.last_name,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_token_prefix(&self, prefix: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|user| user.token_prefix == prefix)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::application::repos::ArticleQueryFilter;

    async fn seed_user(repo: &InMemoryArticles, email: &str) -> UserRecord {
        repo.create_user(CreateUserParams {
            email: email.to_string(),
            first_name: "Test".into(),
            last_name: "User".into(),
            token_prefix: email.to_string(),
            credential_hash: vec![0; 32],
        })
        .await
        .expect("create user")
    }

    async fn seed_article(
        repo: &InMemoryArticles,
        author: &UserRecord,
        title: &str,
        publish_date: OffsetDateTime,
    ) -> ArticleRecord {
        repo.create_article(CreateArticleParams {
            title: title.to_string(),
            description: format!("{title} description"),
            publish_date,
            author_id: author.id,
        })
        .await
        .expect("create article")
    }

    #[tokio::test]
    async fn query_orders_newest_first_and_reports_total() {
        let repo = InMemoryArticles::new();
        let author = seed_user(&repo, "a@example.com").await;
        seed_article(&repo, &author, "Old", datetime!(2024-01-01 0:00 UTC)).await;
        seed_article(&repo, &author, "New", datetime!(2024-03-01 0:00 UTC)).await;
        seed_article(&repo, &author, "Mid", datetime!(2024-02-01 0:00 UTC)).await;

        let filter = ArticleQueryFilter {
            limit: Some(2),
            ..Default::default()
        };
        let resolved = filter.resolve().expect("resolve");
        let page = repo.query_articles(&resolved).await.expect("query");
        assert_eq!(page.total, 3);
        let titles: Vec<_> = page.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Mid"]);
    }

    #[tokio::test]
    async fn query_filters_by_search_range_and_author() {
        let repo = InMemoryArticles::new();
        let ada = seed_user(&repo, "ada@example.com").await;
        let bob = seed_user(&repo, "bob@example.com").await;
        seed_article(&repo, &ada, "Rust caching", datetime!(2024-01-10 0:00 UTC)).await;
        seed_article(&repo, &ada, "Gardening", datetime!(2024-01-20 0:00 UTC)).await;
        seed_article(&repo, &bob, "More rust", datetime!(2024-02-10 0:00 UTC)).await;

        let filter = ArticleQueryFilter {
            search: Some("RUST".into()),
            from_date: Some(datetime!(2024-01-01 0:00 UTC)),
            to_date: Some(datetime!(2024-01-31 0:00 UTC)),
            author_id: Some(ada.id),
            ..Default::default()
        };
        let resolved = filter.resolve().expect("resolve");
        let page = repo.query_articles(&resolved).await.expect("query");
        assert_eq!(page.total, 1);
        assert_eq!(page.articles[0].title, "Rust caching");
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty_with_total() {
        let repo = InMemoryArticles::new();
        let author = seed_user(&repo, "a@example.com").await;
        seed_article(&repo, &author, "Only", datetime!(2024-01-01 0:00 UTC)).await;

        let filter = ArticleQueryFilter {
            page: Some(5),
            ..Default::default()
        };
        let resolved = filter.resolve().expect("resolve");
        let page = repo.query_articles(&resolved).await.expect("query");
        assert!(page.articles.is_empty());
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn create_requires_existing_author() {
        let repo = InMemoryArticles::new();
        let err = repo
            .create_article(CreateArticleParams {
                title: "Orphan".into(),
                description: "No author here".into(),
                publish_date: OffsetDateTime::now_utc(),
                author_id: Uuid::new_v4(),
            })
            .await
            .expect_err("missing author");
        assert!(matches!(err, RepoError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn save_never_changes_author() {
        let repo = InMemoryArticles::new();
        let ada = seed_user(&repo, "ada@example.com").await;
        let bob = seed_user(&repo, "bob@example.com").await;
        let mut article = seed_article(&repo, &ada, "Mine", OffsetDateTime::now_utc()).await;

        article.author = AuthorRecord::from(&bob);
        article.title = "Still mine".into();
        let saved = repo.save_article(&article).await.expect("save");
        assert_eq!(saved.author.id, ada.id);
        assert_eq!(saved.title, "Still mine");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = InMemoryArticles::new();
        seed_user(&repo, "a@example.com").await;
        let err = repo
            .create_user(CreateUserParams {
                email: "a@example.com".into(),
                first_name: "Again".into(),
                last_name: "User".into(),
                token_prefix: "other".into(),
                credential_hash: vec![1; 32],
            })
            .await
            .expect_err("duplicate");
        assert!(matches!(err, RepoError::Duplicate { .. }));
    }
}
