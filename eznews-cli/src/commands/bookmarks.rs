//! Bookmarks command - saved articles of the logged-in user

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use eznews_core::services::{AddBookmarkOutcome, EntryPoint, LogEvent};
use eznews_core::NewsContext;

use super::{get_context, get_logger, log_event, require_access, with_spinner};
use crate::output;

#[derive(Subcommand)]
pub enum BookmarksCommands {
    /// Show saved articles
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Bookmark an article
    Add {
        /// Article ID
        article_id: i64,
    },
    /// Remove a bookmark
    Remove {
        /// Article ID
        article_id: i64,
    },
}

pub async fn run(command: BookmarksCommands) -> Result<()> {
    let ctx = get_context()?;
    require_access(&ctx, "/bookmarks")?;
    let logger = get_logger(EntryPoint::Cli);

    let result = execute(&ctx, command).await;
    if let Err(e) = &result {
        log_event(&logger, LogEvent::new("bookmark_failed").with_page("/bookmarks").with_error(e));
        if !ctx.session.is_authenticated() {
            output::warning("Your session has expired. Please log in again.");
        }
    }
    Ok(result?)
}

async fn execute(ctx: &NewsContext, command: BookmarksCommands) -> eznews_core::domain::result::Result<()> {
    match command {
        BookmarksCommands::List { json } => {
            let bookmarks = with_spinner("Loading bookmarks...", json, ctx.bookmarks.list()).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&bookmarks)?);
                return Ok(());
            }
            if bookmarks.is_empty() {
                output::info("No bookmarks yet. Use 'ezn bookmarks add <article-id>'.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Article", "Title", "Saved"]);
            for bookmark in &bookmarks {
                table.add_row(vec![
                    bookmark.article.id.to_string(),
                    bookmark.article.title.clone(),
                    bookmark.created_at.clone().unwrap_or_default(),
                ]);
            }
            println!("{}", table);
        }
        BookmarksCommands::Add { article_id } => {
            let article = ctx.catalog.article(article_id).await?;
            match ctx.bookmarks.add(&article).await? {
                AddBookmarkOutcome::Added => {
                    output::success(&format!("Bookmarked \"{}\"", article.title));
                }
                AddBookmarkOutcome::AlreadyBookmarked => {
                    println!("{} \"{}\"", "Already bookmarked:".yellow(), article.title);
                }
            }
        }
        BookmarksCommands::Remove { article_id } => {
            ctx.bookmarks.remove(article_id).await?;
            output::success("Bookmark removed.");
        }
    }
    Ok(())
}
