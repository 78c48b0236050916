//! Catalog endpoints over [`ApiClient`].

use async_trait::async_trait;
use folio_domain::{ApiEnvelope, Book, BookDraft, BookPage, BookPatch, PaginationMeta, QueryFilters};
use serde::Serialize;

use crate::api::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::ports::{BookGateway, HttpMethod};

/// Unwraps a `{ success, data }` envelope, treating `success: false` as a
/// rejection. Returns the payload and any pagination block.
pub(crate) fn unwrap_envelope<T>(envelope: ApiEnvelope<T>) -> ApiResult<(T, Option<PaginationMeta>)> {
    if !envelope.success {
        return Err(ApiError::Rejected {
            message: envelope.message,
        });
    }
    let pagination = envelope.pagination;
    envelope
        .data
        .map(|data| (data, pagination))
        .ok_or_else(|| ApiError::Decode("response envelope has no data".to_string()))
}

pub(crate) fn to_body<T: Serialize>(value: &T) -> ApiResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}

/// Pagination for a list response that carried none: a single page holding
/// exactly what was returned.
fn single_page(filters: &QueryFilters, count: usize) -> PaginationMeta {
    let total = u64::try_from(count).unwrap_or(u64::MAX);
    PaginationMeta {
        page: 1,
        limit: filters.limit,
        total,
        pages: u32::from(count > 0),
    }
}

fn book_path(id: &str) -> ApiResult<String> {
    let id = id.trim();
    if id.is_empty() || id.contains('/') {
        return Err(ApiError::InvalidRequest(format!("invalid book id: {id:?}")));
    }
    Ok(format!("books/{id}"))
}

#[async_trait]
impl BookGateway for ApiClient {
    async fn list_books(&self, filters: &QueryFilters) -> ApiResult<BookPage> {
        let envelope: ApiEnvelope<Vec<Book>> = self
            .request(HttpMethod::Get, "books", &filters.to_params(), None)
            .await?;
        let (items, pagination) = unwrap_envelope(envelope)?;
        let pagination = pagination.unwrap_or_else(|| single_page(filters, items.len()));
        Ok(BookPage { items, pagination })
    }

    async fn get_book(&self, id: &str) -> ApiResult<Book> {
        let envelope: ApiEnvelope<Book> = self
            .request(HttpMethod::Get, &book_path(id)?, &[], None)
            .await?;
        unwrap_envelope(envelope).map(|(book, _)| book)
    }

    async fn create_book(&self, draft: &BookDraft) -> ApiResult<Book> {
        draft.validate()?;
        let envelope: ApiEnvelope<Book> = self
            .request(HttpMethod::Post, "books", &[], Some(to_body(draft)?))
            .await?;
        unwrap_envelope(envelope).map(|(book, _)| book)
    }

    async fn update_book(&self, id: &str, patch: &BookPatch) -> ApiResult<Book> {
        let envelope: ApiEnvelope<Book> = self
            .request(HttpMethod::Put, &book_path(id)?, &[], Some(to_body(patch)?))
            .await?;
        unwrap_envelope(envelope).map(|(book, _)| book)
    }

    async fn delete_book(&self, id: &str) -> ApiResult<()> {
        let envelope: ApiEnvelope<serde_json::Value> = self
            .request(HttpMethod::Delete, &book_path(id)?, &[], None)
            .await?;
        if envelope.success {
            Ok(())
        } else {
            Err(ApiError::Rejected {
                message: envelope.message,
            })
        }
    }
}
