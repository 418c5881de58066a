use serde::Serialize;

/// Page counts up to this size are listed in full.
const FULL_LIST_LIMIT: usize = 5;

/// Compact list of page links for `current_page` out of `total_pages`.
///
/// `None` marks an ellipsis. The result never has more than seven entries and
/// `current_page` past the end is tolerated.
pub fn generate_window(current_page: usize, total_pages: usize) -> Vec<Option<usize>> {
    if total_pages <= FULL_LIST_LIMIT {
        return (1..=total_pages).map(Some).collect();
    }

    if current_page <= 3 {
        vec![Some(1), Some(2), Some(3), None, Some(total_pages)]
    } else if current_page >= total_pages - 2 {
        vec![
            Some(1),
            None,
            Some(total_pages - 2),
            Some(total_pages - 1),
            Some(total_pages),
        ]
    } else {
        vec![
            Some(1),
            None,
            Some(current_page - 1),
            Some(current_page),
            Some(current_page + 1),
            None,
            Some(total_pages),
        ]
    }
}

/// Position within a paged list with bounds-checked navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    total_pages: usize,
}

impl Pager {
    /// A zero page is treated as the first one.
    pub fn new(page: usize, total_pages: usize) -> Self {
        Self {
            page: page.max(1),
            total_pages,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn has_previous(&self) -> bool {
        self.total_pages > 0 && self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn previous(&self) -> Option<usize> {
        self.has_previous().then(|| self.page - 1)
    }

    pub fn next(&self) -> Option<usize> {
        self.has_next().then(|| self.page + 1)
    }

    /// Page to actually fetch: the current one, pulled back to the last page
    /// when the total shrank underneath it.
    pub fn clamped(&self) -> usize {
        if self.total_pages == 0 {
            1
        } else {
            self.page.min(self.total_pages)
        }
    }

    pub fn window(&self) -> Vec<Option<usize>> {
        generate_window(self.page, self.total_pages)
    }
}

#[derive(Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub total_pages: usize,
    pub previous: Option<usize>,
    pub next: Option<usize>,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, current_page: usize, total_pages: usize) -> Self {
        let pager = Pager::new(current_page, total_pages);

        Self {
            items,
            pages: pager.window(),
            page: pager.page(),
            total_pages,
            previous: pager.previous(),
            next: pager.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lists_are_complete() {
        assert_eq!(generate_window(1, 0), Vec::<Option<usize>>::new());
        assert_eq!(generate_window(1, 1), vec![Some(1)]);
        for total in 0..=5 {
            let window = generate_window(1, total);
            assert_eq!(window.len(), total);
            assert!(window.iter().all(Option::is_some));
        }
    }

    #[test]
    fn window_near_start() {
        assert_eq!(
            generate_window(1, 10),
            vec![Some(1), Some(2), Some(3), None, Some(10)]
        );
        assert_eq!(
            generate_window(3, 10),
            vec![Some(1), Some(2), Some(3), None, Some(10)]
        );
    }

    #[test]
    fn window_near_end() {
        assert_eq!(
            generate_window(9, 10),
            vec![Some(1), None, Some(8), Some(9), Some(10)]
        );
        assert_eq!(
            generate_window(8, 10),
            vec![Some(1), None, Some(8), Some(9), Some(10)]
        );
    }

    #[test]
    fn window_in_the_middle() {
        assert_eq!(
            generate_window(5, 10),
            vec![
                Some(1),
                None,
                Some(4),
                Some(5),
                Some(6),
                None,
                Some(10)
            ]
        );
    }

    #[test]
    fn window_never_exceeds_seven_entries() {
        for total in 0..60 {
            for current in 1..=total + 3 {
                assert!(generate_window(current, total).len() <= 7);
            }
        }
    }

    #[test]
    fn page_past_the_end_renders_tail() {
        assert_eq!(
            generate_window(40, 6),
            vec![Some(1), None, Some(4), Some(5), Some(6)]
        );
    }

    #[test]
    fn navigation_is_disabled_at_the_edges() {
        let pager = Pager::new(1, 4);
        assert_eq!(pager.previous(), None);
        assert_eq!(pager.next(), Some(2));

        let pager = Pager::new(4, 4);
        assert_eq!(pager.previous(), Some(3));
        assert_eq!(pager.next(), None);

        let pager = Pager::new(7, 4);
        assert_eq!(pager.next(), None);
    }

    #[test]
    fn empty_and_single_page_lists_disable_both_directions() {
        for total in [0, 1] {
            let pager = Pager::new(1, total);
            assert!(!pager.has_previous());
            assert!(!pager.has_next());
        }
        assert!(Pager::new(1, 0).window().is_empty());
        assert_eq!(Pager::new(1, 1).window(), vec![Some(1)]);
    }

    #[test]
    fn clamps_after_total_shrinks() {
        assert_eq!(Pager::new(9, 4).clamped(), 4);
        assert_eq!(Pager::new(3, 0).clamped(), 1);
        assert_eq!(Pager::new(0, 5).clamped(), 1);
    }

    #[test]
    fn paginated_exposes_navigation() {
        let paginated = Paginated::new(vec!["a", "b"], 2, 3);
        assert_eq!(paginated.previous, Some(1));
        assert_eq!(paginated.next, Some(3));
        assert_eq!(paginated.pages, vec![Some(1), Some(2), Some(3)]);
    }
}
