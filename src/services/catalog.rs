//! Catalog management service: authors, books, libraries and librarians

use crate::{
    error::{AppError, AppResult},
    forms::FieldErrors,
    models::{
        author::{Author, AuthorInput, AuthorQuery},
        book::{Book, BookInput, BookQuery},
        library::{
            Librarian, LibrarianInput, LibrarianQuery, Library, LibraryInput, LibraryQuery,
        },
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn search_authors(&self, query: &AuthorQuery) -> AppResult<(Vec<Author>, i64)> {
        self.repository.authors.search(query).await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(&self, input: &AuthorInput) -> AppResult<Author> {
        let author = self.repository.authors.create(input).await?;
        tracing::info!(author_id = author.id, "author created");
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, input: &AuthorInput) -> AppResult<Author> {
        self.repository.authors.update(id, input).await
    }

    /// Delete an author together with all of its books
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        let books = self.repository.authors.delete(id).await?;
        tracing::info!(author_id = id, books_removed = books, "author deleted");
        Ok(())
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        self.repository.books.search(query).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    async fn check_author(&self, author_id: i32) -> AppResult<()> {
        if self.repository.authors.exists(author_id).await? {
            Ok(())
        } else {
            Err(FieldErrors::single(
                "author_id",
                format!("Author with id {} does not exist.", author_id),
            )
            .into())
        }
    }

    pub async fn create_book(&self, input: &BookInput) -> AppResult<Book> {
        self.check_author(input.author_id).await?;
        let book = self.repository.books.create(input).await?;
        tracing::info!(book_id = book.id, author_id = book.author_id, "book created");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, input: &BookInput) -> AppResult<Book> {
        self.check_author(input.author_id).await?;
        self.repository.books.update(id, input).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }

    // =========================================================================
    // LIBRARIES
    // =========================================================================

    pub async fn search_libraries(&self, query: &LibraryQuery) -> AppResult<(Vec<Library>, i64)> {
        self.repository.libraries.search(query).await
    }

    pub async fn get_library(&self, id: i32) -> AppResult<Library> {
        self.repository.libraries.get_by_id(id).await
    }

    pub async fn create_library(&self, input: &LibraryInput) -> AppResult<Library> {
        let library = self.repository.libraries.create(input).await?;
        tracing::info!(library_id = library.id, "library created");
        Ok(library)
    }

    pub async fn update_library(&self, id: i32, input: &LibraryInput) -> AppResult<Library> {
        self.repository.libraries.update(id, input).await
    }

    /// Replace the set of books a library holds. Unknown book ids reject the
    /// whole request and leave the current set untouched.
    pub async fn set_library_books(&self, id: i32, book_ids: &[i32]) -> AppResult<Library> {
        if !self.repository.libraries.exists(id).await? {
            return Err(AppError::NotFound(format!("Library with id {} not found", id)));
        }

        let mut ids = book_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let missing = self.repository.books.missing_ids(&ids).await?;
        if !missing.is_empty() {
            let listed: Vec<String> = missing.iter().map(|id| id.to_string()).collect();
            return Err(FieldErrors::single(
                "book_ids",
                format!("Unknown book ids: {}", listed.join(", ")),
            )
            .into());
        }

        let library = self.repository.libraries.set_books(id, &ids).await?;
        tracing::info!(library_id = id, books = ids.len(), "library books replaced");
        Ok(library)
    }

    /// Delete a library; its books are kept
    pub async fn delete_library(&self, id: i32) -> AppResult<()> {
        self.repository.libraries.delete(id).await?;
        tracing::info!(library_id = id, "library deleted");
        Ok(())
    }

    // =========================================================================
    // LIBRARIANS
    // =========================================================================

    pub async fn search_librarians(&self, query: &LibrarianQuery) -> AppResult<(Vec<Librarian>, i64)> {
        self.repository.libraries.search_librarians(query).await
    }

    pub async fn get_librarian(&self, id: i32) -> AppResult<Librarian> {
        self.repository.libraries.get_librarian(id).await
    }

    async fn check_library(&self, library_id: i32) -> AppResult<()> {
        if self.repository.libraries.exists(library_id).await? {
            Ok(())
        } else {
            Err(FieldErrors::single(
                "library_id",
                format!("Library with id {} does not exist.", library_id),
            )
            .into())
        }
    }

    pub async fn create_librarian(&self, input: &LibrarianInput) -> AppResult<Librarian> {
        self.check_library(input.library_id).await?;
        let librarian = self.repository.libraries.create_librarian(input).await?;
        tracing::info!(librarian_id = librarian.id, library_id = librarian.library_id, "librarian created");
        Ok(librarian)
    }

    pub async fn update_librarian(&self, id: i32, input: &LibrarianInput) -> AppResult<Librarian> {
        self.check_library(input.library_id).await?;
        self.repository.libraries.update_librarian(id, input).await
    }

    pub async fn delete_librarian(&self, id: i32) -> AppResult<()> {
        self.repository.libraries.delete_librarian(id).await
    }
}
