//! Fixed-size, 1-based pagination over an already-ordered slice.

use serde::Serialize;

/// Where a page sits within the full sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// 1-based page number.
    pub number: usize,
    /// `None` means the whole sequence is one page.
    pub size: Option<usize>,
    pub total: usize,
}

impl PageInfo {
    pub fn new(number: usize, size: Option<usize>, total: usize) -> Self {
        Self {
            number: number.max(1),
            size,
            total,
        }
    }

    pub fn page_count(&self) -> usize {
        match self.size {
            Some(size) if size > 0 => self.total.div_ceil(size).max(1),
            _ => 1,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// True while rows remain past this page.
    ///
    /// Decided from the total count, so a final page that happens to be full
    /// still disables "next".
    pub fn has_next(&self) -> bool {
        match self.size {
            Some(size) if size > 0 => self.number * size < self.total,
            _ => false,
        }
    }
}

/// Rows on page `number` (1-based). Out-of-range pages are empty.
pub fn paginate<T>(items: &[T], number: usize, size: Option<usize>) -> &[T] {
    let Some(size) = size.filter(|s| *s > 0) else {
        return items;
    };
    let start = number.max(1).saturating_sub(1).saturating_mul(size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}
