//! Admin commands - dashboard and article management

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Args, Subcommand};
use colored::Colorize;
use dialoguer::Confirm;

use eznews_core::domain::{ArticleDraft, Tag};
use eznews_core::services::{EntryPoint, FetchOutcome, LogEvent};
use eznews_core::NewsContext;

use super::news::resolve_category;
use super::{get_context, get_logger, log_event, require_access, with_spinner};
use crate::output;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Article and category totals
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage articles
    Articles {
        #[command(subcommand)]
        command: ArticleCommands,
    },
    /// List tags
    Tags {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ArticleCommands {
    /// List articles
    List {
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Search term
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a new article
    Create {
        #[command(flatten)]
        fields: ArticleFields,
    },
    /// Edit an article; fields not given keep their current value
    Edit {
        /// Article ID
        id: i64,
        #[command(flatten)]
        fields: ArticleFields,
    },
    /// Delete an article
    Delete {
        /// Article ID
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Args)]
pub struct ArticleFields {
    #[arg(long)]
    title: Option<String>,
    /// Article body
    #[arg(long, conflicts_with = "content_file")]
    content: Option<String>,
    /// Read the article body from a file
    #[arg(long)]
    content_file: Option<PathBuf>,
    /// Category ID, slug or name
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    author: Option<String>,
    /// Image URL (empty string clears it)
    #[arg(long)]
    image_url: Option<String>,
    /// Source URL (empty string clears it)
    #[arg(long)]
    source_url: Option<String>,
    /// Publication time: RFC 3339, "YYYY-MM-DD HH:MM" or "YYYY-MM-DD" (UTC)
    #[arg(long)]
    published: Option<String>,
    /// Comma-separated tag IDs or names; replaces the current tags
    #[arg(long, value_delimiter = ',')]
    tags: Option<Vec<String>>,
}

pub async fn run(command: AdminCommands) -> Result<()> {
    let ctx = get_context()?;

    match command {
        AdminCommands::Dashboard { json } => {
            require_access(&ctx, "/admin")?;
            dashboard(&ctx, json).await
        }
        AdminCommands::Articles { command } => {
            require_access(&ctx, "/admin/articles")?;
            let logger = get_logger(EntryPoint::Cli);
            let result = articles(&ctx, command).await;
            if let Err(e) = &result {
                let event = LogEvent::new("admin_article_failed").with_page("/admin/articles");
                let event = match e.downcast_ref::<eznews_core::Error>() {
                    Some(core) => event.with_error(core),
                    None => event.with_message(e.to_string()),
                };
                log_event(&logger, event);
                if !ctx.session.is_authenticated() {
                    output::warning("Your session has expired. Please log in again.");
                }
            }
            result
        }
        AdminCommands::Tags { json } => {
            require_access(&ctx, "/admin")?;
            let tags = with_spinner("Loading tags...", json, ctx.admin.tags()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tags)?);
                return Ok(());
            }
            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name"]);
            for tag in &tags {
                table.add_row(vec![tag.id.to_string(), tag.name.clone()]);
            }
            println!("{}", table);
            Ok(())
        }
    }
}

async fn dashboard(ctx: &NewsContext, json: bool) -> Result<()> {
    let categories = with_spinner("Loading categories...", json, ctx.catalog.categories()).await?;
    let outcome = with_spinner("Loading articles...", json, ctx.listing.fetch()).await;
    if let FetchOutcome::Failed(message) = outcome {
        bail!("Could not load articles: {}", message);
    }
    let listing = ctx.listing.snapshot();
    let total_articles = listing.total.unwrap_or(listing.items.len() as u64);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "articles": total_articles,
                "categories": categories.len(),
                "api_url": ctx.config.api_url,
            })
        );
        return Ok(());
    }

    println!("{}", "Admin Dashboard".bold());
    let mut table = output::create_table();
    table.add_row(vec!["Articles".to_string(), total_articles.to_string()]);
    table.add_row(vec!["Categories".to_string(), categories.len().to_string()]);
    table.add_row(vec!["API".to_string(), ctx.config.api_url.clone()]);
    println!("{}", table);
    Ok(())
}

async fn articles(ctx: &NewsContext, command: ArticleCommands) -> Result<()> {
    match command {
        ArticleCommands::List { page, search, json } => {
            let search = search.unwrap_or_default();
            let page = with_spinner(
                "Loading articles...",
                json,
                ctx.admin.list(page, ctx.config.page_size, &search),
            )
            .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
                return Ok(());
            }
            if page.items.is_empty() {
                output::info("No articles found.");
                return Ok(());
            }
            println!("{}", output::article_table(&page.items));
            println!(
                "{}",
                format!("Page {} of {}", page.page.unwrap_or(1), page.total_pages.max(1)).dimmed()
            );
        }
        ArticleCommands::Create { fields } => {
            let mut draft = ArticleDraft::default();
            fields.apply(ctx, &mut draft).await?;
            let article = with_spinner("Publishing...", false, ctx.admin.create(&draft)).await?;
            output::success(&format!("Created article {}: \"{}\"", article.id, article.title));
        }
        ArticleCommands::Edit { id, fields } => {
            let existing = with_spinner("Loading article...", false, ctx.catalog.article(id)).await?;
            let mut draft = ArticleDraft::from(&existing);
            fields.apply(ctx, &mut draft).await?;
            let article = with_spinner("Saving...", false, ctx.admin.update(id, &draft)).await?;
            output::success(&format!("Updated article {}: \"{}\"", article.id, article.title));
        }
        ArticleCommands::Delete { id, force } => {
            if !force
                && !Confirm::new()
                    .with_prompt(format!("Delete article {}?", id))
                    .default(false)
                    .interact()?
            {
                println!("Cancelled.");
                return Ok(());
            }
            let message = with_spinner("Deleting...", false, ctx.admin.delete(id)).await?;
            output::success(&message);
        }
    }
    Ok(())
}

impl ArticleFields {
    /// Overwrite the fields given on the command line
    async fn apply(self, ctx: &NewsContext, draft: &mut ArticleDraft) -> Result<()> {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(content) = self.content {
            draft.content = content;
        }
        if let Some(path) = self.content_file {
            draft.content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
        }
        if let Some(author) = self.author {
            draft.author_name = author;
        }
        if self.image_url.is_some() {
            draft.image_url = self.image_url;
        }
        if self.source_url.is_some() {
            draft.source_url = self.source_url;
        }
        if let Some(published) = self.published {
            draft.published_date = Some(parse_published(&published)?);
        }
        if let Some(category) = self.category {
            let categories = ctx.catalog.categories().await?;
            match resolve_category(&category, &categories) {
                Some(id) => draft.category_id = Some(id),
                None => bail!("Unknown category '{}'", category),
            }
        }
        if let Some(tags) = self.tags {
            let known = ctx.admin.tags().await?;
            draft.tag_ids = tags
                .iter()
                .filter(|t| !t.trim().is_empty())
                .map(|t| resolve_tag(t, &known).with_context(|| format!("Unknown tag '{}'", t)))
                .collect::<Result<Vec<_>>>()?;
        }
        Ok(())
    }
}

fn resolve_tag(input: &str, tags: &[Tag]) -> Option<i64> {
    let input = input.trim();
    if let Ok(id) = input.parse::<i64>() {
        return tags.iter().find(|t| t.id == id).map(|t| t.id);
    }
    tags.iter().find(|t| t.name.eq_ignore_ascii_case(input)).map(|t| t.id)
}

fn parse_published(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M") {
        return Ok(naive.and_utc());
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid publication time '{}'", input))?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .context("Invalid publication time")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_tag_by_id_or_name() {
        let tags = vec![
            Tag { id: 1, name: "banjir".into() },
            Tag { id: 3, name: "Cuaca".into() },
        ];
        assert_eq!(resolve_tag("3", &tags), Some(3));
        assert_eq!(resolve_tag(" cuaca ", &tags), Some(3));
        assert_eq!(resolve_tag("7", &tags), None);
        assert_eq!(resolve_tag("gempa", &tags), None);
    }

    #[test]
    fn test_parse_published_formats() {
        let expected = "2024-05-01T08:30:00Z";
        assert_eq!(parse_published("2024-05-01T08:30:00Z").unwrap().to_rfc3339(), "2024-05-01T08:30:00+00:00");
        assert_eq!(
            parse_published("2024-05-01 08:30").unwrap(),
            DateTime::parse_from_rfc3339(expected).unwrap().with_timezone(&Utc)
        );
        assert_eq!(parse_published("2024-05-01").unwrap().to_rfc3339(), "2024-05-01T00:00:00+00:00");
        assert!(parse_published("kemarin").is_err());
    }
}
