//! Article, category and bookmark domain models
//!
//! These are read-only projections of API responses. The client never
//! mutates them beyond replacing a whole page.

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Server-side category identifier
pub type CategoryId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// Article as it appears in listings (detail responses add `content`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: i64,
    pub title: String,
    /// Body text; the source of the card excerpt when present
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Set by the server when the request carried a token of a user who
    /// bookmarked this article
    #[serde(default)]
    pub is_bookmarked: bool,
}

/// Drop HTML tags and collapse runs of whitespace
fn strip_markup(content: &str) -> String {
    let (Ok(tag_re), Ok(whitespace_re)) = (Regex::new(r"<[^>]*>"), Regex::new(r"\s+")) else {
        return content.trim().to_string();
    };
    let text = tag_re.replace_all(content, " ");
    whitespace_re.replace_all(text.trim(), " ").into_owned()
}

/// Default excerpt length used by news cards
pub const EXCERPT_CHARS: usize = 150;

impl ArticleSummary {
    /// Plain-text excerpt of at most `max_chars` characters, with markup
    /// stripped. Empty when the payload carried no content.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let Some(content) = self.content.as_deref() else {
            return String::new();
        };

        let text = strip_markup(content);

        if text.chars().count() <= max_chars {
            return text;
        }
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated.trim_end())
    }

    /// Publication time, accepting both naive ISO timestamps and RFC 3339
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_date.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Short relative age ("3 hours ago"), or "just now" without a date
    pub fn published_ago(&self, now: DateTime<Utc>) -> String {
        let Some(published) = self.published_at() else {
            return "just now".to_string();
        };

        let elapsed = now.signed_duration_since(published);
        let (value, unit) = if elapsed.num_days() >= 365 {
            (elapsed.num_days() / 365, "year")
        } else if elapsed.num_days() >= 30 {
            (elapsed.num_days() / 30, "month")
        } else if elapsed.num_days() >= 1 {
            (elapsed.num_days(), "day")
        } else if elapsed.num_hours() >= 1 {
            (elapsed.num_hours(), "hour")
        } else if elapsed.num_minutes() >= 1 {
            (elapsed.num_minutes(), "minute")
        } else {
            return "just now".to_string();
        };

        if value == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", value, unit)
        }
    }
}

/// One page of a listing response: `{items, pages, total?, page?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticlePage {
    pub items: Vec<ArticleSummary>,
    #[serde(rename = "pages")]
    pub total_pages: u32,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
}

/// A saved article, as listed by `GET /bookmarks`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub article: ArticleSummary,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(content: Option<&str>, published: Option<&str>) -> ArticleSummary {
        ArticleSummary {
            id: 1,
            title: "Harga beras naik".to_string(),
            content: content.map(String::from),
            image_url: None,
            category: None,
            author_name: Some("Redaksi".to_string()),
            source_url: None,
            published_date: published.map(String::from),
            tags: Vec::new(),
            is_bookmarked: false,
        }
    }

    #[test]
    fn test_excerpt_strips_markup_and_truncates() {
        let a = article(Some("<p>Pasar   induk <b>ramai</b> pagi ini.</p>"), None);
        assert_eq!(a.excerpt(150), "Pasar induk ramai pagi ini.");
        assert_eq!(a.excerpt(11), "Pasar induk...");
        assert_eq!(article(None, None).excerpt(150), "");
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let a = article(Some("héllo wörld ünïcode"), None);
        assert_eq!(a.excerpt(5), "héllo...");
    }

    #[test]
    fn test_published_ago() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();

        assert_eq!(article(None, Some("2024-03-10T09:00:00")).published_ago(now), "3 hours ago");
        assert_eq!(article(None, Some("2024-03-09T12:00:00+00:00")).published_ago(now), "1 day ago");
        assert_eq!(article(None, Some("2024-03-10T11:59:30.5")).published_ago(now), "just now");
        assert_eq!(article(None, None).published_ago(now), "just now");
        assert_eq!(article(None, Some("not a date")).published_ago(now), "just now");
    }

    #[test]
    fn test_page_deserializes_listing_response() {
        let page: ArticlePage = serde_json::from_str(
            r#"{
                "items": [{"id": 4, "title": "Timnas menang", "category": {"id": 3, "name": "Olahraga", "slug": "olahraga"}, "tags": [], "is_bookmarked": true}],
                "total": 19, "page": 2, "limit": 9, "pages": 3
            }"#,
        )
        .unwrap();

        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total, Some(19));
        assert_eq!(page.items[0].category.as_ref().map(|c| c.id), Some(3));
        assert!(page.items[0].is_bookmarked);
    }
}
