//! Database tests. Each test gets a fresh migrated database.
//!
//! Run with: DATABASE_URL=postgres://... cargo test --test store_tests -- --ignored

use sqlx::PgPool;

use shelfmark::{
    config::AuthConfig,
    error::AppError,
    forms::sanitize_text,
    models::{
        author::{AuthorInput, AuthorQuery},
        book::{BookInput, BookQuery},
        enums::Role,
        library::{LibrarianInput, LibraryInput},
        post::{PostInput, PostQuery},
        user::NewAccount,
    },
    policy::Principal,
    repository::Repository,
    services::Services,
};

fn services(pool: PgPool) -> (Services, Repository) {
    let repository = Repository::new(pool);
    let services = Services::new(repository.clone(), AuthConfig::default());
    (services, repository)
}

fn author(name: &str) -> AuthorInput {
    AuthorInput {
        name: name.to_string(),
        bio: String::new(),
        date_of_birth: None,
        date_of_death: None,
    }
}

fn book(title: &str, author_id: i32, year: i32) -> BookInput {
    BookInput {
        title: title.to_string(),
        author_id,
        isbn: String::new(),
        publication_year: year,
        description: String::new(),
        is_available: true,
    }
}

fn library(name: &str) -> LibraryInput {
    LibraryInput {
        name: name.to_string(),
        address: String::new(),
        phone_number: String::new(),
        email: String::new(),
        opening_hours: String::new(),
    }
}

fn post(tags: Option<&[&str]>) -> PostInput {
    PostInput {
        title: "Notes".to_string(),
        content: "Some notes".to_string(),
        tags: tags.map(|t| t.iter().map(|s| s.to_string()).collect()),
    }
}

async fn member(services: &Services, username: &str) -> Principal {
    let response = services
        .auth
        .register(NewAccount {
            username: username.to_string(),
            email: format!("{}@example.org", username),
            password: "correct horse battery".to_string(),
        })
        .await
        .unwrap();
    Principal {
        user_id: response.user.id,
        username: response.user.username,
        role: response.user.role,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_deleting_author_deletes_books(pool: PgPool) {
    let (services, repo) = services(pool);

    let herbert = services.catalog.create_author(&author("Frank Herbert")).await.unwrap();
    let dune = services.catalog.create_book(&book("Dune", herbert.id, 1965)).await.unwrap();
    services.catalog.create_book(&book("Dune Messiah", herbert.id, 1969)).await.unwrap();

    assert_eq!(services.catalog.get_author(herbert.id).await.unwrap().book_count, 2);

    services.catalog.delete_author(herbert.id).await.unwrap();
    assert!(matches!(
        services.catalog.get_book(dune.id).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(repo.books.count().await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_deleting_library_keeps_books(pool: PgPool) {
    let (services, repo) = services(pool);

    let le_guin = services.catalog.create_author(&author("Ursula K. Le Guin")).await.unwrap();
    let earthsea = services.catalog.create_book(&book("A Wizard of Earthsea", le_guin.id, 1968)).await.unwrap();
    let central = services.catalog.create_library(&library("Central")).await.unwrap();

    let central = services
        .catalog
        .set_library_books(central.id, &[earthsea.id, earthsea.id])
        .await
        .unwrap();
    assert_eq!(central.books.map(|b| b.len()), Some(1));

    let held = services.catalog.get_book(earthsea.id).await.unwrap();
    assert_eq!(held.libraries.map(|l| l.len()), Some(1));

    services.catalog.delete_library(central.id).await.unwrap();
    assert_eq!(repo.books.count().await.unwrap(), 1);
    let orphan = services.catalog.get_book(earthsea.id).await.unwrap();
    assert_eq!(orphan.libraries.map(|l| l.len()), Some(0));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_library_books_reject_unknown_ids(pool: PgPool) {
    let (services, _) = services(pool);

    let central = services.catalog.create_library(&library("Central")).await.unwrap();
    let err = services.catalog.set_library_books(central.id, &[999]).await.unwrap_err();
    match err {
        AppError::Validation(fields) => assert!(fields.contains("book_ids")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_book_with_unknown_author_is_a_field_error(pool: PgPool) {
    let (services, _) = services(pool);

    let err = services.catalog.create_book(&book("Ghost", 42, 2000)).await.unwrap_err();
    match err {
        AppError::Validation(fields) => assert!(fields.contains("author_id")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_one_librarian_per_library(pool: PgPool) {
    let (services, _) = services(pool);

    let central = services.catalog.create_library(&library("Central")).await.unwrap();
    let first = LibrarianInput { name: "Ada".to_string(), library_id: central.id };
    services.catalog.create_librarian(&first).await.unwrap();

    let second = LibrarianInput { name: "Grace".to_string(), library_id: central.id };
    let err = services.catalog.create_librarian(&second).await.unwrap_err();
    match err {
        AppError::Validation(fields) => assert!(fields.contains("library_id")),
        other => panic!("unexpected error: {:?}", other),
    }

    let detail = services.catalog.get_library(central.id).await.unwrap();
    assert_eq!(detail.librarian.map(|l| l.name), Some("Ada".to_string()));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_book_filters_and_ordering(pool: PgPool) {
    let (services, _) = services(pool);

    let asimov = services.catalog.create_author(&author("Isaac Asimov")).await.unwrap();
    services.catalog.create_book(&book("Foundation", asimov.id, 1951)).await.unwrap();
    services.catalog.create_book(&book("I, Robot", asimov.id, 1950)).await.unwrap();
    services.catalog.create_book(&book("The Gods Themselves", asimov.id, 1972)).await.unwrap();

    let query = BookQuery {
        publication_year_max: Some(1960),
        ordering: Some("-publication_year".to_string()),
        ..Default::default()
    };
    let (books, total) = services.catalog.search_books(&query).await.unwrap();
    assert_eq!(total, 2);
    let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Foundation", "I, Robot"]);

    let query = BookQuery {
        search: Some("asimov".to_string()),
        per_page: Some(1),
        ..Default::default()
    };
    let (books, total) = services.catalog.search_books(&query).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(books.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_post_tags_replace_and_keep(pool: PgPool) {
    let (services, repo) = services(pool);
    let jane = member(&services, "jane").await;

    let created = services.blog.create_post(&jane, &post(Some(&["a", "b"][..]))).await.unwrap();
    assert_eq!(created.tags, vec!["a", "b"]);

    let updated = services.blog.update_post(&jane, created.id, &post(Some(&["c"][..]))).await.unwrap();
    assert_eq!(updated.tags, vec!["c"]);

    let kept = services.blog.update_post(&jane, created.id, &post(None)).await.unwrap();
    assert_eq!(kept.tags, vec!["c"]);

    let cleared = services.blog.update_post(&jane, created.id, &post(Some(&[][..]))).await.unwrap();
    assert!(cleared.tags.is_empty());

    // Tags outlive the posts that used them
    assert_eq!(repo.tags.count().await.unwrap(), 3);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_shared_tags_are_not_duplicated(pool: PgPool) {
    let (services, _) = services(pool);
    let jane = member(&services, "jane").await;
    let john = member(&services, "john").await;

    services.blog.create_post(&jane, &post(Some(&["rust"][..]))).await.unwrap();
    services.blog.create_post(&john, &post(Some(&["rust", "Rust"][..]))).await.unwrap();

    let tags = services.tags.list().await.unwrap();
    let mut counts: Vec<(&str, i64)> = tags.iter().map(|t| (t.name.as_str(), t.post_count)).collect();
    counts.sort();
    assert_eq!(counts, vec![("Rust", 1), ("rust", 2)]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_only_owner_edits_post(pool: PgPool) {
    let (services, _) = services(pool);
    let jane = member(&services, "jane").await;
    let john = member(&services, "john").await;

    let created = services.blog.create_post(&jane, &post(None)).await.unwrap();
    let err = services.blog.delete_post(&john, created.id).await.unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));

    services.blog.delete_post(&jane, created.id).await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_register_login_and_duplicate_username(pool: PgPool) {
    let (services, _) = services(pool);
    member(&services, "jane").await;

    let login = services.auth.login("JANE", "correct horse battery").await.unwrap();
    assert_eq!(login.user.username, "jane");

    let err = services.auth.login("jane", "wrong").await.unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)));

    let err = services
        .auth
        .register(NewAccount {
            username: "Jane".to_string(),
            email: "other@example.org".to_string(),
            password: "correct horse battery".to_string(),
        })
        .await
        .unwrap_err();
    match err {
        AppError::Validation(fields) => assert!(fields.contains("username")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_usernames_are_unique_regardless_of_case(pool: PgPool) {
    let (services, repo) = services(pool);
    member(&services, "jane").await;

    let hash = services.auth.hash_password("correct horse battery").unwrap();
    let twin = NewAccount {
        username: "JANE".to_string(),
        email: "twin@example.org".to_string(),
        password: String::new(),
    };
    let err = repo.users.create(&twin, &hash).await.unwrap_err();
    match err {
        AppError::Validation(fields) => assert!(fields.contains("username")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_token_follows_current_role_and_account(pool: PgPool) {
    let (services, _) = services(pool.clone());
    let jane = member(&services, "jane").await;
    services.auth.set_role(jane.user_id, Role::Admin).await.unwrap();
    let token = services.auth.login("jane", "correct horse battery").await.unwrap().token;

    let caller = services.auth.principal_from_token(&token).await.unwrap();
    assert_eq!(caller.role, Some(Role::Admin));

    services.auth.set_role(jane.user_id, Role::Member).await.unwrap();
    let caller = services.auth.principal_from_token(&token).await.unwrap();
    assert_eq!(caller.role, Some(Role::Member));

    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(jane.user_id)
        .execute(&pool)
        .await
        .unwrap();
    let err = services.auth.principal_from_token(&token).await.unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)));

    let admin = member(&services, "admin").await;
    services.auth.delete_user(&admin, jane.user_id).await.unwrap();
    let err = services.auth.principal_from_token(&token).await.unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_lookups_match_escaped_stored_text(pool: PgPool) {
    let (services, _) = services(pool);
    let jane = member(&services, "jane").await;

    let obrien = services
        .catalog
        .create_author(&author(&sanitize_text("O'Brien")))
        .await
        .unwrap();
    assert_eq!(obrien.name, "O&#x27;Brien");

    for query in [
        AuthorQuery { name: Some("o'brien".to_string()), ..Default::default() },
        AuthorQuery { search: Some("O'Bri".to_string()), ..Default::default() },
    ] {
        let (authors, total) = services.catalog.search_authors(&query).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(authors[0].id, obrien.id);
    }

    let tagged = services
        .blog
        .create_post(&jane, &post(Some(&[sanitize_text("R&D").as_str()][..])))
        .await
        .unwrap();
    assert_eq!(tagged.tags, vec!["R&amp;D"]);

    let (posts, total) = services.tags.posts_for("R&D", PostQuery::default()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(posts[0].id, tagged.id);

    services.tags.delete("R&D").await.unwrap();
    assert!(services.tags.list().await.unwrap().is_empty());
}
