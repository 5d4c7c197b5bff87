/// Above this many pages the button row collapses into windows.
const FULL_ROW_LIMIT: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, always within `1..=total_pages`.
    pub page: usize,
    /// Never less than 1, even for an empty view.
    pub total_pages: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageButton {
    Page(usize),
    Ellipsis,
}

/// Slices one page out of `items`, clamping `requested` into range.
/// A `page_size` of zero is treated as one.
pub fn paginate<T: Clone>(items: &[T], page_size: usize, requested: usize) -> Page<T> {
    let size = page_size.max(1);
    let total_pages = items.len().div_ceil(size).max(1);
    let page = requested.clamp(1, total_pages);
    let start = (page - 1) * size;
    let end = (start + size).min(items.len());
    let items = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();
    Page {
        items,
        page,
        total_pages,
    }
}

/// Page-number buttons for the pager row.
pub fn page_buttons(current: usize, total_pages: usize) -> Vec<PageButton> {
    let total = total_pages.max(1);
    let current = current.clamp(1, total);

    if total <= FULL_ROW_LIMIT {
        return (1..=total).map(PageButton::Page).collect();
    }

    let mut buttons = Vec::with_capacity(FULL_ROW_LIMIT);
    if current <= 4 {
        buttons.extend((1..=5).map(PageButton::Page));
        buttons.push(PageButton::Ellipsis);
        buttons.push(PageButton::Page(total));
    } else if current >= total - 3 {
        buttons.push(PageButton::Page(1));
        buttons.push(PageButton::Ellipsis);
        buttons.extend((total - 4..=total).map(PageButton::Page));
    } else {
        buttons.push(PageButton::Page(1));
        buttons.push(PageButton::Ellipsis);
        buttons.extend((current - 1..=current + 1).map(PageButton::Page));
        buttons.push(PageButton::Ellipsis);
        buttons.push(PageButton::Page(total));
    }
    buttons
}
