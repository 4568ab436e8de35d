//! Pagination types
//!
//! Paging components index pages from 0; the backend counts from 1. The
//! translation happens in exactly two places: [`PageRequest::backend_page`]
//! on the way out and [`Paginated::page_index`] on the way back.

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use crate::constants::DEFAULT_PER_PAGE;

/// Paging metadata as reported by the backend (1-based `current_page`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub total: u64,
    pub last_page: u32,
    /// 1-based index of the first item on this page; `None` for an empty page
    #[serde(default)]
    #[cfg_attr(feature = "ts-gen", ts(type = "number | null"))]
    pub from: Option<u64>,
    #[serde(default)]
    #[cfg_attr(feature = "ts-gen", ts(type = "number | null"))]
    pub to: Option<u64>,
}

/// Navigation links some endpoints attach next to `meta`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct PageLinks {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

/// One page of a collection, with the envelope already stripped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
    #[serde(default)]
    pub links: Option<PageLinks>,
}

impl<T> Paginated<T> {
    /// Backend page number (1-based).
    pub fn current_page(&self) -> u32 {
        self.meta.current_page
    }

    /// Page index for a 0-based paging component.
    pub fn page_index(&self) -> u32 {
        self.meta.current_page.saturating_sub(1)
    }

    pub fn total(&self) -> u64 {
        self.meta.total
    }

    pub fn last_page(&self) -> u32 {
        self.meta.last_page
    }

    pub fn has_next(&self) -> bool {
        self.meta.current_page < self.meta.last_page
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Transform the items while keeping the paging metadata.
    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated { data: self.data.into_iter().map(f).collect(), meta: self.meta, links: self.links }
    }
}

/// Page selection coming from a 0-based paging component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct PageRequest {
    /// 0-based page index
    pub index: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { index: 0, per_page: DEFAULT_PER_PAGE }
    }
}

impl PageRequest {
    pub fn new(index: u32, per_page: u32) -> Self {
        Self { index, per_page: per_page.max(1) }
    }

    /// Request for the page a backend `current_page` refers to.
    pub fn from_backend_page(page: u32, per_page: u32) -> Self {
        Self::new(page.saturating_sub(1), per_page)
    }

    /// 1-based page number the backend expects.
    pub fn backend_page(&self) -> u32 {
        self.index.saturating_add(1)
    }

    /// Query parameters for the backend (`page` is 1-based).
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.backend_page().to_string()),
            ("per_page".to_string(), self.per_page.to_string()),
        ]
    }
}
