use chrono::Local;
use news_core::FeedView;

/// Longest title shown on a row before it is cut.
pub const TITLE_WIDTH: usize = 60;

pub fn status_text(view: &FeedView) -> &'static str {
    if view.is_error {
        "Something went wrong..."
    } else {
        "Fetching..."
    }
}

/// Whether a view is worth printing. Intermediate loading views are skipped
/// while a page is already on screen.
pub fn should_render(view: &FeedView) -> bool {
    !(view.is_loading && !view.page.is_empty())
}

pub fn render(view: &FeedView) -> String {
    let mut lines = Vec::new();

    // Refresh is only offered while there is a page to move past.
    if view.page.is_empty() {
        lines.push("Top News Articles!".to_owned());
    } else {
        lines.push("Top News Articles!   [r] refresh".to_owned());
    }

    if let Some(pin) = &view.pinned {
        lines.push(format!("  📌 {}", pin.title));
    }

    if view.page.is_empty() {
        lines.push(format!("  {}", status_text(view)));
    } else {
        for (row, record) in view.page.iter().enumerate() {
            lines.push(format!("{:>3}. {}", row + 1, record.display_title(TITLE_WIDTH)));
        }
    }

    if let Some(at) = view.last_refreshed {
        lines.push(format!(
            "  updated {}",
            at.with_timezone(&Local).format("%H:%M:%S")
        ));
    }

    lines.push(String::new());
    lines.join("\n")
}
