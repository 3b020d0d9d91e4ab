//! Blog posts service

use crate::{
    error::AppResult,
    models::{
        enums::EntityType,
        post::{Post, PostInput, PostQuery, SearchQuery},
    },
    policy::Principal,
    repository::{posts::PostsRepository, tags::TagsRepository, Repository},
};

#[derive(Clone)]
pub struct BlogService {
    repository: Repository,
}

impl BlogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn search_posts(&self, query: &PostQuery) -> AppResult<(Vec<Post>, i64)> {
        self.repository.posts.search(query).await
    }

    /// Free-text search over titles, contents and tag names
    pub async fn search(&self, query: &SearchQuery) -> AppResult<(Vec<Post>, i64)> {
        let query = PostQuery {
            search: query.q.clone(),
            page: query.page,
            per_page: query.per_page,
            ..Default::default()
        };
        self.repository.posts.search(&query).await
    }

    pub async fn get_post(&self, id: i32) -> AppResult<Post> {
        self.repository.posts.get_by_id(id).await
    }

    /// Create a post owned by `author`; tags are created as needed
    pub async fn create_post(&self, author: &Principal, input: &PostInput) -> AppResult<Post> {
        let mut tx = self.repository.pool.begin().await?;

        let id = PostsRepository::insert(&mut *tx, author.user_id, input).await?;
        if let Some(names) = &input.tags {
            let tags = TagsRepository::ensure(&mut *tx, names).await?;
            let ids: Vec<i32> = tags.iter().map(|t| t.id).collect();
            TagsRepository::replace_post_tags(&mut *tx, id, &ids).await?;
        }

        tx.commit().await?;
        tracing::info!(post_id = id, author_id = author.user_id, "post created");
        self.repository.posts.get_by_id(id).await
    }

    /// Update a post. Only its author or an admin may do so.
    /// Tags are replaced only when `input.tags` is present.
    pub async fn update_post(&self, caller: &Principal, id: i32, input: &PostInput) -> AppResult<Post> {
        let owner = self.repository.posts.get_owner(id).await?;
        caller.require_owner(owner, EntityType::Post)?;

        let mut tx = self.repository.pool.begin().await?;

        PostsRepository::update(&mut *tx, id, input).await?;
        if let Some(names) = &input.tags {
            let tags = TagsRepository::ensure(&mut *tx, names).await?;
            let ids: Vec<i32> = tags.iter().map(|t| t.id).collect();
            TagsRepository::replace_post_tags(&mut *tx, id, &ids).await?;
        }

        tx.commit().await?;
        self.repository.posts.get_by_id(id).await
    }

    pub async fn delete_post(&self, caller: &Principal, id: i32) -> AppResult<()> {
        let owner = self.repository.posts.get_owner(id).await?;
        caller.require_owner(owner, EntityType::Post)?;

        self.repository.posts.delete(id).await?;
        tracing::info!(post_id = id, deleted_by = caller.user_id, "post deleted");
        Ok(())
    }
}
