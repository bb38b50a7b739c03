//! Output formatting utilities

use chrono::Utc;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};

use eznews_core::domain::EXCERPT_CHARS;
use eznews_core::{ArticleSummary, Error, Identity, PageWindow};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Print an error, one line per field for validation failures
pub fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<Error>() {
        Some(Error::Validation(fields)) => {
            for field in fields.iter() {
                eprintln!("{} {}", format!("{}:", field.field).red().bold(), field.message);
            }
        }
        _ => error(&err.to_string()),
    }
}

/// News cards as a table
pub fn article_table(articles: &[ArticleSummary]) -> Table {
    let now = Utc::now();
    let mut table = create_table();
    table.set_header(vec!["ID", "Title", "Category", "Published", "Excerpt"]);

    for article in articles {
        let title = if article.is_bookmarked {
            format!("{} *", article.title)
        } else {
            article.title.clone()
        };
        table.add_row(vec![
            article.id.to_string(),
            title,
            article
                .category
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            article.published_ago(now),
            article.excerpt(EXCERPT_CHARS / 2),
        ]);
    }
    table
}

/// Page strip, e.g. `‹ 1 … 4 5 [6] 7 8 … 20 ›`
pub fn page_strip(window: &PageWindow) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(if window.has_prev { "‹".to_string() } else { "‹".dimmed().to_string() });
    if window.show_first {
        parts.push("1".to_string());
    }
    if window.leading_gap {
        parts.push("…".to_string());
    }
    for page in &window.pages {
        if *page == window.current {
            parts.push(format!("[{}]", page).bold().to_string());
        } else {
            parts.push(page.to_string());
        }
    }
    if window.trailing_gap {
        parts.push("…".to_string());
    }
    if window.show_last {
        parts.push(window.total_pages.to_string());
    }
    parts.push(if window.has_next { "›".to_string() } else { "›".dimmed().to_string() });

    parts.join(" ")
}

pub fn identity_table(identity: &Identity) -> Table {
    let mut table = create_table();
    table.add_row(vec!["Name", identity.full_name.as_str()]);
    table.add_row(vec!["Email", identity.email.as_str()]);
    table.add_row(vec!["Role", if identity.is_admin() { "admin" } else { "user" }]);
    if let Some(created) = &identity.created_at {
        table.add_row(vec!["Member since", created.as_str()]);
    }
    table
}
