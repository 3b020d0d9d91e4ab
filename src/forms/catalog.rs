//! Catalog forms: authors, books, libraries, librarians

use super::{rules, FieldErrors, Pipeline, Rule};
use crate::models::{
    author::{AuthorForm, AuthorInput},
    book::{BookForm, BookInput},
    library::{LibrarianForm, LibrarianInput, LibraryForm, LibraryInput},
};

const NAME_RULES: &[Rule] = &[rules::no_sql_keywords, rules::no_script];
const FREE_TEXT: &[Rule] = &[rules::no_script];

impl AuthorForm {
    pub fn clean(self) -> Result<AuthorInput, FieldErrors> {
        let mut p = Pipeline::start(&self);

        let name = p.required("name", &self.name, NAME_RULES, rules::NAME_MAX);
        let bio = p.optional_text("bio", self.bio.as_deref(), FREE_TEXT);

        if let (Some(born), Some(died)) = (self.date_of_birth, self.date_of_death) {
            if died < born {
                p.error("date_of_death", "Date of death cannot precede date of birth.");
            }
        }

        p.finish(AuthorInput {
            name,
            bio,
            date_of_birth: self.date_of_birth,
            date_of_death: self.date_of_death,
        })
    }
}

impl BookForm {
    pub fn clean(self) -> Result<BookInput, FieldErrors> {
        let mut p = Pipeline::start(&self);

        let title = p.required("title", &self.title, NAME_RULES, rules::TITLE_MAX);
        let description = p.optional_text("description", self.description.as_deref(), FREE_TEXT);
        let isbn = match self.isbn.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => p.check("isbn", rules::isbn(raw)).unwrap_or_default(),
            _ => String::new(),
        };
        let publication_year = p
            .check("publication_year", rules::publication_year(self.publication_year))
            .unwrap_or(self.publication_year);

        p.finish(BookInput {
            title,
            author_id: self.author_id,
            isbn,
            publication_year,
            description,
            is_available: self.is_available.unwrap_or(true),
        })
    }
}

impl LibraryForm {
    pub fn clean(self) -> Result<LibraryInput, FieldErrors> {
        let mut p = Pipeline::start(&self);

        let name = p.required("name", &self.name, NAME_RULES, rules::NAME_MAX);
        let address = p.optional_text("address", self.address.as_deref(), FREE_TEXT);
        let opening_hours = p.optional_text("opening_hours", self.opening_hours.as_deref(), FREE_TEXT);
        let email = p.optional_limited("email", self.email.as_deref(), FREE_TEXT, rules::EMAIL_MAX);
        let phone_number = match self.phone_number.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => p.text("phone_number", raw, &[rules::phone_number]),
            _ => String::new(),
        };

        p.finish(LibraryInput {
            name,
            address,
            phone_number,
            email,
            opening_hours,
        })
    }
}

impl LibrarianForm {
    pub fn clean(self) -> Result<LibrarianInput, FieldErrors> {
        let mut p = Pipeline::start(&self);
        let name = p.required("name", &self.name, NAME_RULES, rules::NAME_MAX);
        p.finish(LibrarianInput {
            name,
            library_id: self.library_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate, Utc};

    use super::*;

    fn book(title: &str, year: i32) -> BookForm {
        BookForm {
            title: title.to_string(),
            author_id: 1,
            isbn: Some("978-0-00-000000-0".to_string()),
            publication_year: year,
            description: Some("  A <b>classic</b>  ".to_string()),
            is_available: None,
        }
    }

    #[test]
    fn test_book_clean_normalizes() {
        let input = book("  The Hobbit ", 1937).clean().unwrap();
        assert_eq!(input.title, "The Hobbit");
        assert_eq!(input.isbn, "9780000000000");
        assert_eq!(input.description, "A bclassic/b");
        assert!(input.is_available);
    }

    #[test]
    fn test_book_year_bounds() {
        let current = Utc::now().year();
        assert!(book("Gutenberg Bible", 1450).clean().is_ok());
        assert!(book("Now", current).clean().is_ok());
        let errors = book("Too Early", 1449).clean().unwrap_err();
        assert!(errors.contains("publication_year"));
        let errors = book("Future", current + 1).clean().unwrap_err();
        assert!(errors.contains("publication_year"));
    }

    #[test]
    fn test_book_rejects_sql_in_title_any_case() {
        for title in ["SELECT * FROM books", "select * from books", "Select * From books"] {
            let errors = book(title, 2000).clean().unwrap_err();
            assert!(errors.contains("title"), "{}", title);
        }
    }

    #[test]
    fn test_book_reports_every_invalid_field() {
        let mut form = book(&"x".repeat(201), 1200);
        form.isbn = Some("123".to_string());
        form.description = Some("<script>alert(1)</script>".to_string());
        let errors = form.clean().unwrap_err();
        assert!(errors.contains("title"));
        assert!(errors.contains("isbn"));
        assert!(errors.contains("publication_year"));
        assert!(errors.contains("description"));
    }

    #[test]
    fn test_author_name_required_and_checked() {
        let form = AuthorForm {
            name: "   ".to_string(),
            bio: None,
            date_of_birth: None,
            date_of_death: None,
        };
        assert!(form.clean().unwrap_err().contains("name"));

        let form = AuthorForm {
            name: "Robert'); DROP TABLE authors;--".to_string(),
            bio: None,
            date_of_birth: None,
            date_of_death: None,
        };
        assert!(form.clean().unwrap_err().contains("name"));
    }

    #[test]
    fn test_name_empty_after_stripping_is_required() {
        let form = AuthorForm {
            name: "<>".to_string(),
            bio: None,
            date_of_birth: None,
            date_of_death: None,
        };
        assert!(form.clean().unwrap_err().contains("name"));

        let form = LibrarianForm {
            name: " <<>> ".to_string(),
            library_id: 1,
        };
        assert!(form.clean().unwrap_err().contains("name"));
    }

    #[test]
    fn test_title_length_is_checked_after_escaping() {
        // 200 raw characters pass the declarative rule but escape to 1200
        let errors = book(&"\"".repeat(200), 2000).clean().unwrap_err();
        assert!(errors.contains("title"));

        let input = book(&"a".repeat(200), 2000).clean().unwrap();
        assert_eq!(input.title.chars().count(), 200);
    }

    #[test]
    fn test_name_length_is_checked_after_escaping() {
        let form = LibraryForm {
            name: "R&D ".repeat(25),
            address: None,
            phone_number: None,
            email: None,
            opening_hours: None,
        };
        assert!(form.clean().unwrap_err().contains("name"));
    }

    #[test]
    fn test_non_ascii_isbn_is_a_field_error() {
        let mut form = book("Dune", 1965);
        form.isbn = Some("12345678é".to_string());
        assert!(form.clean().unwrap_err().contains("isbn"));
    }

    #[test]
    fn test_author_dates_ordered() {
        let form = AuthorForm {
            name: "J.R.R. Tolkien".to_string(),
            bio: Some("Philologist".to_string()),
            date_of_birth: NaiveDate::from_ymd_opt(1892, 1, 3),
            date_of_death: NaiveDate::from_ymd_opt(1891, 9, 2),
        };
        assert!(form.clean().unwrap_err().contains("date_of_death"));
    }

    #[test]
    fn test_library_phone_and_email() {
        let form = LibraryForm {
            name: "Central Library".to_string(),
            address: Some("1 Main St".to_string()),
            phone_number: Some("12-34".to_string()),
            email: Some("not-an-email".to_string()),
            opening_hours: None,
        };
        let errors = form.clean().unwrap_err();
        assert!(errors.contains("phone_number"));
        assert!(errors.contains("email"));

        let form = LibraryForm {
            name: "Central Library".to_string(),
            address: None,
            phone_number: Some("+44 20 7946 0958".to_string()),
            email: Some("desk@library.org".to_string()),
            opening_hours: Some("9-17".to_string()),
        };
        let input = form.clean().unwrap();
        assert_eq!(input.phone_number, "+44 20 7946 0958");
    }
}
