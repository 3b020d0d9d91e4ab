//! Tag normalization and tag queries

use crate::{
    error::AppResult,
    forms::sanitize_text,
    models::{
        post::{Post, PostQuery},
        tag::TagWithCount,
    },
    repository::Repository,
};

/// Split a comma-separated tag string into the names that get stored.
///
/// Each name is trimmed and escaped like any other form text, then empty names
/// are dropped and duplicates removed keeping the first occurrence. Comparison
/// is case-sensitive: "Rust" and "rust" are two tags.
pub fn split_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for name in raw.split(',').map(sanitize_text).filter(|n| !n.is_empty()) {
        if !tags.contains(&name) {
            tags.push(name);
        }
    }
    tags
}

#[derive(Clone)]
pub struct TagsService {
    repository: Repository,
}

impl TagsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<TagWithCount>> {
        self.repository.tags.list_with_counts().await
    }

    /// Posts carrying the tag `name`; 404 if the tag does not exist
    pub async fn posts_for(&self, name: &str, mut query: PostQuery) -> AppResult<(Vec<Post>, i64)> {
        let tag = self.repository.tags.get_by_name(name).await?;
        query.tag = Some(tag.name);
        self.repository.posts.search(&query).await
    }

    pub async fn delete(&self, name: &str) -> AppResult<()> {
        self.repository.tags.delete(name).await?;
        tracing::info!(tag = %name, "tag deleted");
        Ok(())
    }
}
