use std::sync::Arc;

use crate::application::repos::{ArticlesRepo, ArticlesWriteRepo};
use crate::cache::CacheStore;

#[derive(Clone)]
pub struct ArticleService {
    pub(crate) reader: Arc<dyn ArticlesRepo>,
    pub(crate) writer: Arc<dyn ArticlesWriteRepo>,
    pub(crate) cache: Arc<dyn CacheStore>,
}

impl ArticleService {
    pub fn new(
        reader: Arc<dyn ArticlesRepo>,
        writer: Arc<dyn ArticlesWriteRepo>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
        }
    }
}
