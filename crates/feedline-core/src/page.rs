//! Keyset (cursor) pagination shared by every paginated listing.
//!
//! A page is requested as `size` plus an optional cursor, the identity of the
//! last item already seen. Stores return up to `size + 1` rows ordered by
//! identity descending and filtered to `identity < cursor`; the extra row only
//! signals that another page exists and is never returned. Newer rows inserted
//! between requests therefore never shift an in-progress scroll.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  size:   u32,
  cursor: Option<i64>,
}

impl PageRequest {
  /// Fails with [`Error::InvalidArgument`] unless `1 <= size <= 100`.
  pub fn new(size: u32, cursor: Option<i64>) -> Result<Self> {
    if !(1..=MAX_PAGE_SIZE).contains(&size) {
      return Err(Error::invalid(format!(
        "page size must be between 1 and {MAX_PAGE_SIZE}, got {size}"
      )));
    }
    Ok(Self { size, cursor })
  }

  /// The first page of `size` items.
  pub fn first(size: u32) -> Result<Self> { Self::new(size, None) }

  pub fn size(&self) -> u32 { self.size }

  pub fn cursor(&self) -> Option<i64> { self.cursor }

  /// How many rows a store should fetch for this request.
  pub fn fetch_limit(&self) -> u32 { self.size + 1 }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  pub items:       Vec<T>,
  /// Identity of the last returned item, present only when `has_next`.
  pub next_cursor: Option<i64>,
  pub has_next:    bool,
}

impl<T> Page<T> {
  pub fn empty() -> Self {
    Self { items: Vec::new(), next_cursor: None, has_next: false }
  }

  /// Cut a `size + 1` window fetched from a store down to a page of at most
  /// `size` items.
  pub fn from_window(
    mut rows: Vec<T>,
    size: u32,
    cursor_of: impl Fn(&T) -> i64,
  ) -> Self {
    let size = size as usize;
    let has_next = rows.len() > size;
    rows.truncate(size);
    let next_cursor = if has_next { rows.last().map(cursor_of) } else { None };
    Self { items: rows, next_cursor, has_next }
  }

  /// Transform every item, keeping the pagination metadata.
  pub fn try_map<U, E>(
    self,
    f: impl FnMut(T) -> Result<U, E>,
  ) -> Result<Page<U>, E> {
    Ok(Page {
      items:       self.items.into_iter().map(f).collect::<Result<_, E>>()?,
      next_cursor: self.next_cursor,
      has_next:    self.has_next,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn size_bounds_are_enforced() {
    assert!(PageRequest::first(0).is_err());
    assert!(PageRequest::first(101).is_err());
    assert!(PageRequest::first(1).is_ok());
    assert!(PageRequest::first(100).is_ok());
  }

  #[test]
  fn fetch_limit_is_one_past_size() {
    let req = PageRequest::new(20, Some(7)).unwrap();
    assert_eq!(req.fetch_limit(), 21);
    assert_eq!(req.cursor(), Some(7));
  }

  #[test]
  fn overfull_window_drops_last_row() {
    let page = Page::from_window(vec![9, 8, 7], 2, |id| *id);
    assert_eq!(page.items, vec![9, 8]);
    assert!(page.has_next);
    assert_eq!(page.next_cursor, Some(8));
  }

  #[test]
  fn short_window_is_final() {
    let page = Page::from_window(vec![9, 8], 2, |id| *id);
    assert_eq!(page.items, vec![9, 8]);
    assert!(!page.has_next);
    assert_eq!(page.next_cursor, None);
  }

  #[test]
  fn empty_window_is_empty_page() {
    let page = Page::from_window(Vec::<i64>::new(), 20, |id| *id);
    assert_eq!(page, Page::empty());
  }

  #[test]
  fn serialises_camel_case() {
    let page = Page::from_window(vec![3, 2], 1, |id| *id);
    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(
      json,
      serde_json::json!({ "items": [3], "nextCursor": 3, "hasNext": true })
    );
  }
}
