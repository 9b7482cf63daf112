//! Pagination metadata and page requests for list endpoints.

use crate::serde_ext::page_sentinel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sort direction for list endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// A list response that violates the pagination contract
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("current_page must be at least 1, got {0}")]
    PageOutOfRange(u32),

    #[error("total_entries is {total_entries} but the page holds {items} items")]
    EntryCountMismatch { total_entries: u32, items: usize },

    #[error("page {current_page} of {total_pages} cannot link to {link} page {page}")]
    DanglingLink {
        link: &'static str,
        page: u32,
        current_page: u32,
        total_pages: u32,
    },
}

/// Where a page of results sits within the full result set.
///
/// `previous_page` and `next_page` are `None` at the edges; the wire carries
/// `-1` for those and this type writes `-1` back out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_entries: u32,
    pub total_pages: u32,
    pub current_page: u32,
    pub per_page: u32,
    #[serde(default, with = "page_sentinel")]
    pub previous_page: Option<u32>,
    #[serde(default, with = "page_sentinel")]
    pub next_page: Option<u32>,
    pub order: String,
    pub order_asc_desc: SortOrder,
}

impl Pagination {
    pub fn is_first_page(&self) -> bool {
        self.previous_page.is_none()
    }

    pub fn is_last_page(&self) -> bool {
        self.next_page.is_none()
    }

    /// Request for the page after this one, if there is one
    pub fn next_request(&self) -> Option<PageRequest> {
        self.next_page.map(|page| PageRequest {
            page: Some(page),
            per_page: Some(self.per_page),
            order: Some(self.order.clone()),
            order_asc_desc: Some(self.order_asc_desc),
        })
    }

    /// Check the counts against the number of items actually returned
    pub fn check(&self, items: usize) -> Result<(), PaginationError> {
        if self.current_page < 1 {
            return Err(PaginationError::PageOutOfRange(self.current_page));
        }
        if (self.total_entries as usize) < items {
            return Err(PaginationError::EntryCountMismatch {
                total_entries: self.total_entries,
                items,
            });
        }
        let dangling = |link, page| PaginationError::DanglingLink {
            link,
            page,
            current_page: self.current_page,
            total_pages: self.total_pages,
        };
        if let Some(page) = self.previous_page {
            if self.current_page == 1 {
                return Err(dangling("previous", page));
            }
        }
        if let Some(page) = self.next_page {
            if self.current_page >= self.total_pages {
                return Err(dangling("next", page));
            }
        }
        Ok(())
    }
}

/// A list envelope: items plus the pagination block that came with them
pub trait Paginated {
    fn pagination(&self) -> &Pagination;

    fn item_count(&self) -> usize;

    fn check(&self) -> Result<(), PaginationError> {
        self.pagination().check(self.item_count())
    }
}

/// Paging parameters for list endpoints. Unset fields are left to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_asc_desc: Option<SortOrder>,
}

impl PageRequest {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn with_order(mut self, field: impl Into<String>, direction: SortOrder) -> Self {
        self.order = Some(field.into());
        self.order_asc_desc = Some(direction);
        self
    }
}
