//! Catalog query filters.
//!
//! `QueryFilters` is an immutable value: every change produces a new value
//! through [`QueryFilters::merge`], so equality checks are always structural.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Fields the backend accepts as a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortField {
    /// Creation time (default).
    #[default]
    #[serde(rename = "createdAt")]
    CreatedAt,
    /// Title.
    #[serde(rename = "title")]
    Title,
    /// Author.
    #[serde(rename = "author")]
    Author,
    /// Publication year.
    #[serde(rename = "publishedYear")]
    PublishedYear,
    /// Price.
    #[serde(rename = "price")]
    Price,
}

impl SortField {
    /// Returns the wire name used in the `sortBy` query parameter.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::Title => "title",
            Self::Author => "author",
            Self::PublishedYear => "publishedYear",
            Self::Price => "price",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(Self::CreatedAt),
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "publishedYear" => Ok(Self::PublishedYear),
            "price" => Ok(Self::Price),
            other => Err(DomainError::InvalidFilter(format!("unknown sort field '{other}'"))),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending (default).
    #[default]
    Desc,
}

impl SortOrder {
    /// Returns the wire name used in the `sortOrder` query parameter.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(DomainError::InvalidFilter(format!("unknown sort order '{other}'"))),
        }
    }
}

/// Default page size.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// The combined search, sort and pagination request shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilters {
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Free-text search over title, author and genre.
    pub search: String,
    /// Sort key.
    pub sort_by: SortField,
    /// Sort direction.
    pub sort_order: SortOrder,
    /// Restrict to available (`Some(true)`) or unavailable (`Some(false)`) books.
    pub available: Option<bool>,
}

impl Default for QueryFilters {
    fn default() -> Self {
        Self::with_limit(DEFAULT_PAGE_LIMIT)
    }
}

impl QueryFilters {
    /// Default filters with a custom page size.
    #[must_use]
    pub fn with_limit(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            search: String::new(),
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            available: None,
        }
    }

    /// Returns a new value with every key present in `patch` overriding this one.
    ///
    /// `page` and `limit` are clamped to at least 1.
    #[must_use]
    pub fn merge(&self, patch: &FiltersPatch) -> Self {
        Self {
            page: patch.page.unwrap_or(self.page).max(1),
            limit: patch.limit.unwrap_or(self.limit).max(1),
            search: patch
                .search
                .clone()
                .unwrap_or_else(|| self.search.clone()),
            sort_by: patch.sort_by.unwrap_or(self.sort_by),
            sort_order: patch.sort_order.unwrap_or(self.sort_order),
            available: patch.available.unwrap_or(self.available),
        }
    }

    /// Query parameters in wire form. Unset values are `None`; the API client
    /// strips those and empty strings before sending.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("page", Some(self.page.to_string())),
            ("limit", Some(self.limit.to_string())),
            ("search", Some(self.search.clone())),
            ("sortBy", Some(self.sort_by.as_str().to_string())),
            ("sortOrder", Some(self.sort_order.as_str().to_string())),
            ("available", self.available.map(|a| a.to_string())),
        ]
    }
}

/// A partial set of filter overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiltersPatch {
    /// Page override.
    pub page: Option<u32>,
    /// Page size override.
    pub limit: Option<u32>,
    /// Search text override.
    pub search: Option<String>,
    /// Sort key override.
    pub sort_by: Option<SortField>,
    /// Sort direction override.
    pub sort_order: Option<SortOrder>,
    /// Availability override; `Some(None)` clears the filter.
    pub available: Option<Option<bool>>,
}

impl FiltersPatch {
    /// Patch that only moves to `page`.
    #[must_use]
    pub const fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            limit: None,
            search: None,
            sort_by: None,
            sort_order: None,
            available: None,
        }
    }

    /// Patch for a new search term; resets to the first page.
    #[must_use]
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            page: Some(1),
            search: Some(text.into()),
            ..Self::default()
        }
    }

    /// Patch for a new sort; resets to the first page.
    #[must_use]
    pub fn sort(field: SortField, order: SortOrder) -> Self {
        Self {
            page: Some(1),
            sort_by: Some(field),
            sort_order: Some(order),
            ..Self::default()
        }
    }

    /// Returns true if the patch overrides nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
