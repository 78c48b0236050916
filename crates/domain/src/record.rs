//! Identifier handling for backend documents.
//!
//! Backend documents carry their key as `_id`, as `id`, or as both when
//! virtuals are serialized alongside the stored key.

use crate::error::{DomainError, DomainResult};

/// Picks the document key, preferring `_id` over `id`. Blank keys count as
/// absent.
pub(crate) fn document_id(stored: Option<String>, virtual_id: Option<String>) -> DomainResult<String> {
    stored
        .filter(|id| !id.is_empty())
        .or_else(|| virtual_id.filter(|id| !id.is_empty()))
        .ok_or(DomainError::MissingField("_id"))
}
