const SIBLINGS: usize = 1;
const BOUNDARIES: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Dots,
}

/// Buttons of the pagination control: both boundary pages, one sibling on
/// each side of `current`, ellipses over the gaps. Always seven slots once
/// there are enough pages.
pub fn page_items(total: usize, current: usize) -> Vec<PageItem> {
    let slots = SIBLINGS * 2 + 3 + BOUNDARIES * 2;
    if total <= slots {
        return (1..=total).map(PageItem::Page).collect();
    }

    let current = current.clamp(1, total);
    let left = current.saturating_sub(SIBLINGS).max(BOUNDARIES);
    let right = (current + SIBLINGS).min(total - BOUNDARIES);
    let left_dots = left > BOUNDARIES + 2;
    let right_dots = right + BOUNDARIES + 1 < total;
    let edge_run = SIBLINGS * 2 + BOUNDARIES + 2;

    let mut out = Vec::with_capacity(slots);
    match (left_dots, right_dots) {
        (false, _) => {
            out.extend((1..=edge_run).map(PageItem::Page));
            out.push(PageItem::Dots);
            out.extend((total - BOUNDARIES + 1..=total).map(PageItem::Page));
        }
        (true, false) => {
            out.extend((1..=BOUNDARIES).map(PageItem::Page));
            out.push(PageItem::Dots);
            out.extend((total - edge_run + 1..=total).map(PageItem::Page));
        }
        (true, true) => {
            out.extend((1..=BOUNDARIES).map(PageItem::Page));
            out.push(PageItem::Dots);
            out.extend((left..=right).map(PageItem::Page));
            out.push(PageItem::Dots);
            out.extend((total - BOUNDARIES + 1..=total).map(PageItem::Page));
        }
    }
    out
}

/// Pagination control. Every button is disabled while `disabled` is set.
pub fn render_pagination(total: usize, current: usize, disabled: bool) -> String {
    let disabled_attr = if disabled { " disabled" } else { "" };
    let prev = current.saturating_sub(1).max(1);
    let next = (current + 1).min(total.max(1));

    let mut html = format!(
        r#"<nav class="pagination" data-total="{total}" data-current="{current}"><form method="post" action="/ui/page/{prev}"><button class="page-step" aria-label="previous page"{disabled_attr}>&lsaquo;</button></form>"#
    );

    for item in page_items(total, current) {
        match item {
            PageItem::Page(n) => {
                let active = if n == current { " active" } else { "" };
                html.push_str(&format!(
                    r#"<form method="post" action="/ui/page/{n}"><button class="page{active}"{disabled_attr}>{n}</button></form>"#
                ));
            }
            PageItem::Dots => html.push_str(r#"<span class="page-dots">&hellip;</span>"#),
        }
    }

    html.push_str(&format!(
        r#"<form method="post" action="/ui/page/{next}"><button class="page-step" aria-label="next page"{disabled_attr}>&rsaquo;</button></form></nav>"#
    ));
    html
}
