//! Page arithmetic for listing endpoints.
//!
//! Pages are 1-based. A missing, zero or negative page number means the first
//! page; a page past the end is simply empty.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u32,
    size: u32,
}

impl Page {
    /// `size` must be positive; it is clamped to 1 otherwise.
    pub fn new(requested: Option<i64>, size: u32) -> Self {
        let number = match requested {
            Some(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
            _ => 1,
        };
        Self {
            number,
            size: size.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }
}

/// Skip `offset` items and keep at most `limit`
pub fn slice<T>(sorted: impl IntoIterator<Item = T>, offset: u64, limit: u64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    sorted.into_iter().skip(offset).take(limit).collect()
}

/// One page of results plus the size of the whole collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total_items: u64,
}

impl<T> Paginated<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
        }
    }
}
