//! Catalog management service: authors, genres and books

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorPatch, AuthorPayload},
        book::{adjusted_count, Book, BookPatch, BookPayload, CountChange},
        genre::{Genre, GenrePatch, GenrePayload},
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

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(&self, data: &AuthorPayload) -> AppResult<Author> {
        data.validate()?;
        let author = self.repository.authors.create(data).await?;
        tracing::info!("Created author id={}", author.id);
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, data: &AuthorPayload) -> AppResult<Author> {
        data.validate()?;
        self.repository.authors.update(id, data).await
    }

    pub async fn patch_author(&self, id: i32, data: &AuthorPatch) -> AppResult<Author> {
        data.validate()?;
        self.repository.authors.patch(id, data).await
    }

    /// Rejected with `Protected` while any book refers to the author
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await.map_err(log_protected)?;
        tracing::info!("Deleted author id={}", id);
        Ok(())
    }

    // =========================================================================
    // GENRES
    // =========================================================================

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        self.repository.genres.get_by_id(id).await
    }

    pub async fn create_genre(&self, data: &GenrePayload) -> AppResult<Genre> {
        data.validate()?;
        let genre = self.repository.genres.create(data).await?;
        tracing::info!("Created genre id={}", genre.id);
        Ok(genre)
    }

    pub async fn update_genre(&self, id: i32, data: &GenrePayload) -> AppResult<Genre> {
        data.validate()?;
        self.repository.genres.update(id, data).await
    }

    pub async fn patch_genre(&self, id: i32, data: &GenrePatch) -> AppResult<Genre> {
        data.validate()?;
        self.repository.genres.patch(id, data).await
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete(id).await.map_err(log_protected)?;
        tracing::info!("Deleted genre id={}", id);
        Ok(())
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    /// All books, with aggregates computed for `caller`
    pub async fn list_books(&self, caller: Option<i32>) -> AppResult<Vec<Book>> {
        let rows = self.repository.books.list(caller).await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    pub async fn get_book(&self, id: i32, caller: Option<i32>) -> AppResult<Book> {
        self.repository.books.get_by_id(id, caller).await.map(Book::from)
    }

    pub async fn create_book(&self, data: &BookPayload, caller: Option<i32>) -> AppResult<Book> {
        data.validate()?;
        let id = self.repository.books.create(data).await?;
        tracing::info!("Created book id={}", id);
        self.get_book(id, caller).await
    }

    pub async fn update_book(&self, id: i32, data: &BookPayload, caller: Option<i32>) -> AppResult<Book> {
        data.validate()?;
        self.repository.books.update(id, data).await?;
        self.get_book(id, caller).await
    }

    pub async fn patch_book(&self, id: i32, data: &BookPatch, caller: Option<i32>) -> AppResult<Book> {
        data.validate()?;
        self.repository.books.patch(id, data).await?;
        self.get_book(id, caller).await
    }

    /// Delete a book together with its reviews and ratings
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    pub async fn inventory_count(&self, id: i32) -> AppResult<i32> {
        self.repository
            .books
            .inventory_count(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Apply a signed delta to a book's inventory count, `current` being the
    /// count the caller observed.
    ///
    /// The write is a guarded relative update, so concurrent adjustments never
    /// overwrite each other and never push the count below zero.
    pub async fn change_count(&self, id: i32, current: i32, delta: i64) -> AppResult<CountChange> {
        adjusted_count(current, delta)?;

        if let Some(change) = self.repository.books.adjust_inventory_count(id, delta).await? {
            tracing::info!(
                "Book id={} inventory count changed by {} to {}",
                id,
                delta,
                change.inventory_count
            );
            return Ok(change);
        }

        // A concurrent request changed the count between the check and the update
        if self.repository.books.exists(id).await? {
            tracing::warn!("Concurrent inventory change on book id={}, rejected delta {}", id, delta);
            Err(AppError::invalid("value", "resulting count cannot be negative"))
        } else {
            Err(AppError::NotFound(format!("Book {} not found", id)))
        }
    }
}

fn log_protected(e: AppError) -> AppError {
    if let AppError::Protected(ref msg) = e {
        tracing::warn!("{}", msg);
    }
    e
}
