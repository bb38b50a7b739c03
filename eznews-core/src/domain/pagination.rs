//! Pagination window for listing views

use serde::Serialize;

/// How many numbered page buttons are shown at once
pub const MAX_PAGES_SHOWN: u32 = 5;

/// The page strip shown under a listing: prev, optional jump to the first
/// page, a run of numbered pages around the current one, optional jump to
/// the last page, next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub current: u32,
    pub total_pages: u32,
    /// Numbered pages to render, ascending
    pub pages: Vec<u32>,
    /// Render a separate "1" button before the run
    pub show_first: bool,
    /// Render "..." between the first page and the run
    pub leading_gap: bool,
    /// Render "..." between the run and the last page
    pub trailing_gap: bool,
    /// Render a separate last-page button after the run
    pub show_last: bool,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageWindow {
    /// Build the window, or `None` when there is nothing to paginate
    pub fn new(current: u32, total_pages: u32) -> Option<Self> {
        if total_pages <= 1 {
            return None;
        }
        let current = current.clamp(1, total_pages);

        let mut start = current.saturating_sub(MAX_PAGES_SHOWN / 2).max(1);
        let end = (start + MAX_PAGES_SHOWN - 1).min(total_pages);
        if end - start < MAX_PAGES_SHOWN - 1 {
            start = (end + 1).saturating_sub(MAX_PAGES_SHOWN).max(1);
        }

        Some(Self {
            current,
            total_pages,
            pages: (start..=end).collect(),
            show_first: start > 1,
            leading_gap: start > 2,
            trailing_gap: end + 1 < total_pages,
            show_last: end < total_pages,
            has_prev: current > 1,
            has_next: current < total_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_window_for_single_page() {
        assert!(PageWindow::new(1, 0).is_none());
        assert!(PageWindow::new(1, 1).is_none());
    }

    #[test]
    fn test_window_at_start() {
        let w = PageWindow::new(1, 10).unwrap();
        assert_eq!(w.pages, vec![1, 2, 3, 4, 5]);
        assert!(!w.show_first);
        assert!(!w.leading_gap);
        assert!(w.show_last);
        assert!(w.trailing_gap);
        assert!(!w.has_prev);
        assert!(w.has_next);
    }

    #[test]
    fn test_window_in_middle() {
        let w = PageWindow::new(6, 12).unwrap();
        assert_eq!(w.pages, vec![4, 5, 6, 7, 8]);
        assert!(w.show_first);
        assert!(w.leading_gap);
        assert!(w.show_last);
        assert!(w.trailing_gap);
    }

    #[test]
    fn test_window_at_end_shifts_left() {
        let w = PageWindow::new(10, 10).unwrap();
        assert_eq!(w.pages, vec![6, 7, 8, 9, 10]);
        assert!(w.show_first);
        assert!(!w.show_last);
        assert!(!w.has_next);
    }

    #[test]
    fn test_window_gap_only_when_pages_skipped() {
        // 1 [2 3 4 5 6] 7: neighbours, no ellipsis on either side
        let w = PageWindow::new(4, 7).unwrap();
        assert_eq!(w.pages, vec![2, 3, 4, 5, 6]);
        assert!(w.show_first && !w.leading_gap);
        assert!(w.show_last && !w.trailing_gap);
    }

    #[test]
    fn test_short_listing_shows_every_page() {
        let w = PageWindow::new(2, 3).unwrap();
        assert_eq!(w.pages, vec![1, 2, 3]);
        assert!(!w.show_first && !w.show_last);
    }
}
