//! Fixed-size page window over the filtered list.

/// Items per page.
pub const PAGE_SIZE: usize = 20;

/// 1-based page cursor.
///
/// The cursor never leaves `[1, max(1, total_pages)]`; out-of-range moves are
/// ignored rather than clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page: usize,
    page_size: usize,
}

/// The slice of items visible on the current page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 1-based position of the first visible item (0 when empty)
    pub first: usize,
    /// 1-based position of the last visible item (0 when empty)
    pub last: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl Paginator {
    /// A paginator on page 1. A zero page size is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.page_size)
    }

    /// Back to page 1; called whenever the filtered list changes.
    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Moves to `target` if it is within `[1, total_pages]`.
    ///
    /// Returns whether the page changed position. An empty list only admits page 1.
    pub fn change_page(&mut self, target: usize, total_items: usize) -> bool {
        let total_pages = self.total_pages(total_items);
        let in_range = if total_pages == 0 {
            target == 1
        } else {
            (1..=total_pages).contains(&target)
        };
        if !in_range {
            return false;
        }
        self.page = target;
        true
    }

    /// Slices `items` to the current page.
    pub fn view<'a, T>(&self, items: &'a [T]) -> PageView<'a, T> {
        let total_items = items.len();
        let start = ((self.page - 1) * self.page_size).min(total_items);
        let end = (self.page * self.page_size).min(total_items);
        let visible = items.get(start..end).unwrap_or(&[]);
        let (first, last) = if visible.is_empty() {
            (0, 0)
        } else {
            (start + 1, end)
        };

        PageView {
            items: visible,
            page: self.page,
            total_pages: self.total_pages(total_items),
            total_items,
            first,
            last,
        }
    }
}
