//! Page-number pagination and the list response envelope

use crate::core::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::IntErrorKind;
use url::Url;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Page size limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    /// Used when the client does not ask for a page size
    pub default_page_size: usize,

    /// Larger requested sizes are clamped to this value
    pub max_page_size: usize,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl PaginationSettings {
    /// Effective page size for a raw `page_size` parameter
    ///
    /// Anything that is not a positive integer falls back to the default.
    pub fn page_size(&self, raw: Option<&str>) -> usize {
        let Some(raw) = raw else {
            return self.default_page_size;
        };
        match raw.trim().parse::<u64>() {
            Ok(0) => self.default_page_size,
            Ok(n) => usize::try_from(n)
                .unwrap_or(usize::MAX)
                .min(self.max_page_size),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => self.max_page_size,
            Err(_) => self.default_page_size,
        }
    }
}

/// Requested page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNumber {
    /// 1-based page number
    Number(usize),
    /// Whatever the last page turns out to be
    Last,
}

impl PageNumber {
    /// Parse a raw `page` parameter; absent means page 1
    pub fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        match raw.map(str::trim) {
            None => Ok(PageNumber::Number(1)),
            Some("last") => Ok(PageNumber::Last),
            Some(value) => match value.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(PageNumber::Number(n)),
                _ => Err(ApiError::InvalidPage),
            },
        }
    }
}

/// One page of an ordered result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based number of this page
    pub number: usize,
    /// Effective page size
    pub page_size: usize,
    /// Total number of matching records
    pub count: usize,
    pub num_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Project the items, keeping the page metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            page_size: self.page_size,
            count: self.count,
            num_pages: self.num_pages,
        }
    }

    /// Link to the following page, derived from the current request URL
    pub fn next_link(&self, current: &Url) -> Option<String> {
        self.has_next()
            .then(|| replace_query_param(current, "page", &(self.number + 1).to_string()))
            .map(String::from)
    }

    /// Link to the preceding page; page 1 is linked without a `page` parameter
    pub fn previous_link(&self, current: &Url) -> Option<String> {
        if !self.has_previous() {
            return None;
        }
        let previous = self.number - 1;
        let url = if previous == 1 {
            remove_query_param(current, "page")
        } else {
            replace_query_param(current, "page", &previous.to_string())
        };
        Some(url.into())
    }

    /// Build the response envelope
    pub fn into_response(self, current: &Url) -> PaginatedResponse<T> {
        PaginatedResponse {
            next: self.next_link(current),
            previous: self.previous_link(current),
            count: self.count,
            limit: self.page_size,
            results: self.items,
        }
    }
}

/// Slice an ordered result set into the requested page
///
/// An empty result set still has one (empty) page. Any page outside
/// `1..=num_pages` is [`ApiError::InvalidPage`].
pub fn paginate<T>(items: Vec<T>, page: PageNumber, page_size: usize) -> Result<Page<T>, ApiError> {
    let page_size = page_size.max(1);
    let count = items.len();
    let num_pages = count.div_ceil(page_size).max(1);

    let number = match page {
        PageNumber::Number(n) => n,
        PageNumber::Last => num_pages,
    };
    if number == 0 || number > num_pages {
        return Err(ApiError::InvalidPage);
    }

    let items = items
        .into_iter()
        .skip((number - 1) * page_size)
        .take(page_size)
        .collect();

    Ok(Page {
        items,
        number,
        page_size,
        count,
        num_pages,
    })
}

/// Paginated list response
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Absolute URL of the following page
    pub next: Option<String>,

    /// Absolute URL of the preceding page
    pub previous: Option<String>,

    /// Total number of matching records
    pub count: usize,

    /// Page size used for this response
    pub limit: usize,

    pub results: Vec<T>,
}

/// Set a query parameter, keeping the others (sorted by key)
pub fn replace_query_param(url: &Url, key: &str, value: &str) -> Url {
    let mut pairs = query_without(url, key);
    pairs.insert(key.to_string(), value.to_string());
    with_query(url, pairs)
}

/// Drop a query parameter, keeping the others (sorted by key)
pub fn remove_query_param(url: &Url, key: &str) -> Url {
    with_query(url, query_without(url, key))
}

fn query_without(url: &Url, key: &str) -> BTreeMap<String, String> {
    url.query_pairs()
        .into_owned()
        .filter(|(k, _)| k != key)
        .collect()
}

fn with_query(url: &Url, pairs: BTreeMap<String, String>) -> Url {
    let mut url = url.clone();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs.iter());
    }
    url
}
