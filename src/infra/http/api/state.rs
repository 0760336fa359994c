use std::sync::Arc;

use crate::application::articles::ArticleService;
use crate::application::auth::AuthService;
use crate::cache::CacheStore;
use crate::infra::db::PostgresRepositories;

#[derive(Clone)]
pub struct ApiState {
    pub articles: Arc<ArticleService>,
    pub auth: Arc<AuthService>,
    pub cache: Arc<dyn CacheStore>,
    /// Probed by `/health`. Absent when running on in-memory repositories.
    pub db: Option<Arc<PostgresRepositories>>,
}
