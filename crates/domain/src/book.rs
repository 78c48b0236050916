//! Catalog item types.
//!
//! The backend owns these records; the client only ever holds a cached copy
//! that is replaced wholesale on every successful load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::record::document_id;

/// A book as returned by the catalog API.
///
/// Decoding accepts the key as `_id`, `id` or both; encoding writes `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "BookRecord")]
pub struct Book {
    /// Server-assigned opaque identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// ISBN as entered by the merchant.
    pub isbn: String,
    /// Year of publication.
    pub published_year: i32,
    /// Whether the book can currently be ordered.
    pub available: bool,
    /// Genre or category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unit price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Units in stock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    /// Creation timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookRecord {
    #[serde(rename = "_id", default)]
    stored_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    title: String,
    author: String,
    #[serde(default)]
    isbn: String,
    #[serde(default)]
    published_year: i32,
    #[serde(default = "default_available")]
    available: bool,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    stock: Option<u32>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<BookRecord> for Book {
    type Error = DomainError;

    fn try_from(record: BookRecord) -> DomainResult<Self> {
        Ok(Self {
            id: document_id(record.stored_id, record.id)?,
            title: record.title,
            author: record.author,
            isbn: record.isbn,
            published_year: record.published_year,
            available: record.available,
            genre: record.genre,
            description: record.description,
            price: record.price,
            stock: record.stock,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

const fn default_available() -> bool {
    true
}

impl Book {
    /// Creates a book with the required fields and everything else defaulted.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            isbn: String::new(),
            published_year: 0,
            available: true,
            genre: None,
            description: None,
            price: None,
            stock: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Fields for creating a new book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    /// Title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// ISBN.
    pub isbn: String,
    /// Year of publication.
    pub published_year: i32,
    /// Availability; the backend defaults to `true` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    /// Genre or category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unit price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Units in stock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl BookDraft {
    /// Creates a draft with the required fields.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        published_year: i32,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            published_year,
            available: None,
            genre: None,
            description: None,
            price: None,
            stock: None,
        }
    }

    /// Checks that the required text fields are present.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingField` naming the first blank field.
    pub fn validate(&self) -> DomainResult<()> {
        for (name, value) in [
            ("title", &self.title),
            ("author", &self.author),
            ("isbn", &self.isbn),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::MissingField(name));
            }
        }
        Ok(())
    }
}

/// Partial update for an existing book. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// New ISBN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    /// New publication year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    /// New availability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    /// New genre.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// New stock level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl BookPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.isbn.is_none()
            && self.published_year.is_none()
            && self.available.is_none()
            && self.genre.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_book_deserializes_backend_document() {
        let json = r#"{
            "_id": "65f0c2",
            "title": "Dune",
            "author": "Frank Herbert",
            "isbn": "978-0441013593",
            "publishedYear": 1965,
            "createdAt": "2024-03-01T10:00:00.000Z",
            "updatedAt": "2024-03-02T10:00:00.000Z",
            "__v": 0
        }"#;

        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.id, "65f0c2");
        assert_eq!(book.published_year, 1965);
        assert!(book.available, "availability defaults to true");
        assert!(book.created_at.is_some());
        assert_eq!(book.genre, None);
    }

    #[test]
    fn test_book_accepts_plain_id() {
        let json = r#"{"id": "b1", "title": "Emma", "author": "Jane Austen"}"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.id, "b1");
    }

    #[test]
    fn test_book_with_both_keys_prefers_stored_id() {
        let json = r#"{"_id": "b1", "id": "virtual", "title": "Emma", "author": "Jane Austen"}"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.id, "b1");

        let page: Vec<Book> = serde_json::from_str(
            r#"[{"_id": "a", "id": "a", "title": "A", "author": "X"}, {"id": "b", "title": "B", "author": "Y"}]"#,
        )
        .unwrap();
        assert_eq!(page[1].id, "b");
    }

    #[test]
    fn test_book_without_any_key_is_rejected() {
        let err = serde_json::from_str::<Book>(r#"{"title": "Emma", "author": "Jane Austen"}"#).unwrap_err();
        assert!(err.to_string().contains("_id is required"));
    }

    #[test]
    fn test_book_serializes_stored_key() {
        let value = serde_json::to_value(Book::new("b1", "Emma", "Jane Austen")).unwrap();
        assert_eq!(value["_id"], "b1");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_draft_validation_names_missing_field() {
        let draft = BookDraft::new("Dune", "  ", "isbn", 1965);
        assert_eq!(draft.validate(), Err(DomainError::MissingField("author")));

        let draft = BookDraft::new("Dune", "Frank Herbert", "isbn", 1965);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = BookPatch {
            available: Some(false),
            published_year: Some(1966),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"available": false, "publishedYear": 1966})
        );
        assert!(!patch.is_empty());
        assert!(BookPatch::default().is_empty());
    }
}
