//! News commands - list, read and browse categories

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;

use eznews_core::domain::CategoryId;
use eznews_core::services::{EntryPoint, FetchOutcome, LogEvent};
use eznews_core::{Category, NewsContext};

use super::{get_context, get_logger, log_event, with_spinner};
use crate::output;

#[derive(Subcommand)]
pub enum NewsCommands {
    /// List articles
    List {
        /// Search term
        #[arg(short, long)]
        search: Option<String>,
        /// Category ID, slug or name
        #[arg(short, long)]
        category: Option<String>,
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read one article
    Show {
        /// Article ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List categories
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: NewsCommands) -> Result<()> {
    match command {
        NewsCommands::List { search, category, page, json } => list(search, category, page, json).await,
        NewsCommands::Show { id, json } => show(id, json).await,
        NewsCommands::Categories { json } => categories(json).await,
    }
}

/// Resolve `--category` given as an ID, slug or name
pub fn resolve_category(input: &str, categories: &[Category]) -> Option<CategoryId> {
    if let Ok(id) = input.trim().parse::<CategoryId>() {
        return Some(id);
    }
    categories
        .iter()
        .find(|c| c.slug.eq_ignore_ascii_case(input.trim()) || c.name.eq_ignore_ascii_case(input.trim()))
        .map(|c| c.id)
}

/// Print the current listing state of `ctx`
pub fn print_listing(ctx: &NewsContext) {
    let snapshot = ctx.listing.snapshot();

    if let Some(error) = &snapshot.error {
        output::error(&format!("Could not load news: {}", error));
    }
    if snapshot.items.is_empty() {
        output::info("No news found.");
        return;
    }

    println!("{}", output::article_table(&snapshot.items));
    if let Some(window) = ctx.listing.page_window() {
        println!("{}", output::page_strip(&window));
    }
    if let Some(total) = snapshot.total {
        println!("{}", format!("{} articles", total).dimmed());
    }
}

async fn list(search: Option<String>, category: Option<String>, page: u32, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger(EntryPoint::Cli);

    if let Some(term) = search {
        ctx.listing.set_search_term(term.trim());
    }
    if let Some(category) = category {
        let categories = ctx.catalog.categories().await?;
        match resolve_category(&category, &categories) {
            Some(id) => ctx.listing.set_category_filter(Some(id)),
            None => bail!("Unknown category '{}'", category),
        }
    }
    ctx.listing.set_page(page)?;

    let outcome = with_spinner("Loading news...", json, ctx.listing.fetch()).await;
    if let FetchOutcome::Failed(message) = &outcome {
        log_event(&logger, LogEvent::new("listing_fetch_failed").with_page("/").with_message(message.clone()));
        bail!("Could not load news: {}", message);
    }

    if json {
        let snapshot = ctx.listing.snapshot();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "items": snapshot.items,
                "page": snapshot.query.page,
                "pages": snapshot.total_pages,
                "total": snapshot.total,
            }))?
        );
        return Ok(());
    }

    print_listing(&ctx);
    Ok(())
}

pub fn print_article(article: &eznews_core::ArticleSummary) {
    println!("{}", article.title.bold());
    let mut meta = Vec::new();
    if let Some(category) = &article.category {
        meta.push(category.name.clone());
    }
    if let Some(author) = &article.author_name {
        meta.push(author.clone());
    }
    meta.push(article.published_ago(chrono::Utc::now()));
    println!("{}", meta.join(" · ").dimmed());
    if article.is_bookmarked {
        println!("{}", "Bookmarked".yellow());
    }
    println!();
    // Full text, with markup stripped
    println!("{}", article.excerpt(usize::MAX));
    if !article.tags.is_empty() {
        let tags: Vec<String> = article.tags.iter().map(|t| format!("#{}", t.name)).collect();
        println!();
        println!("{}", tags.join(" ").cyan());
    }
}

async fn show(id: i64, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let article = with_spinner("Loading article...", json, ctx.catalog.article(id)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&article)?);
        return Ok(());
    }
    print_article(&article);
    Ok(())
}

async fn categories(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let categories = with_spinner("Loading categories...", json, ctx.catalog.categories()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Slug"]);
    for category in &categories {
        table.add_row(vec![category.id.to_string(), category.name.clone(), category.slug.clone()]);
    }
    println!("{}", table);
    Ok(())
}
