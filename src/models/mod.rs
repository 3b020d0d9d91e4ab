//! Data models for Shelfmark

pub mod author;
pub mod book;
pub mod enums;
pub mod library;
pub mod post;
pub mod tag;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use enums::{Action, EntityType, Role};
pub use library::{Librarian, Library};
pub use post::Post;
pub use tag::Tag;
pub use user::{Account, UserClaims};
