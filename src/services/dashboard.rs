//! Per-user dashboard

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        author::AuthorShort,
        book::BookShort,
        enums::{Action, EntityType, Role},
        library::LibraryShort,
        post::PostShort,
    },
    policy::{self, Principal},
    repository::Repository,
};

const RECENT: i64 = 5;

/// Count and latest records of one entity type
#[derive(Debug, Serialize, ToSchema)]
pub struct Section<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub count: i64,
    pub recent: Vec<T>,
}

/// Entity sections are omitted when the caller may not view that entity
#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub username: String,
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Section<AuthorShort>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub books: Option<Section<BookShort>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libraries: Option<Section<LibraryShort>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<Section<PostShort>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<i64>,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
}

impl DashboardService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn for_user(&self, principal: &Principal) -> AppResult<Dashboard> {
        let repo = &self.repository;
        let may_view = |entity| policy::can(Some(principal), Action::View, entity);

        let authors = if may_view(EntityType::Author) {
            Some(Section {
                count: repo.authors.count().await?,
                recent: repo.authors.recent(RECENT).await?,
            })
        } else {
            None
        };

        let books = if may_view(EntityType::Book) {
            Some(Section {
                count: repo.books.count().await?,
                recent: repo.books.recent(RECENT).await?,
            })
        } else {
            None
        };

        let libraries = if may_view(EntityType::Library) {
            Some(Section {
                count: repo.libraries.count().await?,
                recent: repo.libraries.recent(RECENT).await?,
            })
        } else {
            None
        };

        let posts = if may_view(EntityType::Post) {
            Some(Section {
                count: repo.posts.count().await?,
                recent: repo.posts.recent(RECENT).await?,
            })
        } else {
            None
        };

        let users = if may_view(EntityType::User) {
            Some(repo.users.count().await?)
        } else {
            None
        };

        let tags = if may_view(EntityType::Tag) {
            Some(repo.tags.count().await?)
        } else {
            None
        };

        Ok(Dashboard {
            username: principal.username.clone(),
            role: principal.role,
            authors,
            books,
            libraries,
            posts,
            users,
            tags,
        })
    }
}
