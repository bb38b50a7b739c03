//! Browse command - interactive news reader
//!
//! Keeps one listing alive across page moves, searches and category changes,
//! so every move goes through the same last-request-wins controller.

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input, Select};
use tokio::sync::broadcast::error::RecvError;

use eznews_core::services::{
    AddBookmarkOutcome, DebouncedSearch, EntryPoint, GuardDecision, ListStatus, LogEvent, LoggingService,
};
use eznews_core::{Category, NewsContext};

use super::news::{print_article, print_listing};
use super::{get_context, get_logger, log_event, with_spinner};
use crate::output;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Prev,
    First,
    Last,
    Search,
    ClearSearch,
    Category,
    Open,
    Quit,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Action::Next => "Next page",
            Action::Prev => "Previous page",
            Action::First => "First page",
            Action::Last => "Last page",
            Action::Search => "Search",
            Action::ClearSearch => "Clear search",
            Action::Category => "Filter by category",
            Action::Open => "Read an article",
            Action::Quit => "Quit",
        }
    }
}

fn available_actions(ctx: &NewsContext) -> Vec<Action> {
    let snapshot = ctx.listing.snapshot();
    let window = ctx.listing.page_window();
    let mut actions = Vec::new();

    if window.as_ref().is_some_and(|w| w.has_next) {
        actions.push(Action::Next);
    }
    if window.as_ref().is_some_and(|w| w.has_prev) {
        actions.push(Action::Prev);
    }
    if window.is_some() {
        actions.extend([Action::First, Action::Last]);
    }
    actions.push(Action::Search);
    if !snapshot.query.search_term.is_empty() {
        actions.push(Action::ClearSearch);
    }
    actions.push(Action::Category);
    if !snapshot.items.is_empty() {
        actions.push(Action::Open);
    }
    actions.push(Action::Quit);
    actions
}

pub async fn run() -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger(EntryPoint::Browser);
    let search = ctx.search_input();
    let mut categories: Option<Vec<Category>> = None;

    if let Some(l) = &logger {
        let _ = l.log_page("/");
    }
    refresh(&ctx, &logger).await;

    loop {
        println!();
        print_listing(&ctx);
        println!();

        let actions = available_actions(&ctx);
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let choice = Select::new().with_prompt("What next?").items(&labels).default(0).interact()?;

        match actions[choice] {
            Action::Next => {
                ctx.listing.next_page();
            }
            Action::Prev => {
                ctx.listing.prev_page();
            }
            Action::First => {
                ctx.listing.first_page();
            }
            Action::Last => {
                ctx.listing.last_page();
            }
            Action::Search => {
                let current = ctx.listing.query().search_term;
                let term: String = Input::new()
                    .with_prompt("Search")
                    .with_initial_text(current)
                    .allow_empty(true)
                    .interact_text()?;
                run_search(&ctx, &search, term.trim()).await;
                continue;
            }
            Action::ClearSearch => {
                search.clear().await;
                continue;
            }
            Action::Category => {
                if categories.is_none() {
                    match with_spinner("Loading categories...", false, ctx.catalog.categories()).await {
                        Ok(list) => categories = Some(list),
                        Err(e) => {
                            output::error(&format!("Could not load categories: {}", e));
                            continue;
                        }
                    }
                }
                if let Some(list) = &categories {
                    ctx.listing.set_category_filter(pick_category(list)?);
                }
            }
            Action::Open => {
                open_article(&ctx, &logger).await?;
                continue;
            }
            Action::Quit => break,
        }

        refresh(&ctx, &logger).await;
    }

    Ok(())
}

/// Fetch if the query changed, behind a spinner
async fn refresh(ctx: &NewsContext, logger: &Option<LoggingService>) {
    if let Some(eznews_core::services::FetchOutcome::Failed(message)) =
        with_spinner("Loading news...", false, ctx.listing.refresh()).await
    {
        log_event(logger, LogEvent::new("listing_fetch_failed").with_page("/").with_message(message));
    }
}

/// Feed `term` through the debouncer and wait until its listing settles
async fn run_search(ctx: &NewsContext, search: &DebouncedSearch, term: &str) {
    if ctx.listing.query().search_term == term {
        return;
    }

    let mut events = ctx.listing.subscribe();
    search.input(term);

    let settled = async {
        loop {
            match events.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => {
                    let snapshot = ctx.listing.snapshot();
                    if snapshot.query.search_term == term
                        && matches!(snapshot.status, ListStatus::Loaded | ListStatus::Error)
                    {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    let limit = search.window() + ctx.config.timeout + Duration::from_secs(1);
    if with_spinner("Searching...", false, tokio::time::timeout(limit, settled))
        .await
        .is_err()
    {
        output::warning("Search is taking too long; showing the last results.");
    }
}

fn pick_category(categories: &[Category]) -> Result<Option<i64>> {
    let mut labels = vec!["All categories".to_string()];
    labels.extend(categories.iter().map(|c| c.name.clone()));

    let choice = Select::new().with_prompt("Category").items(&labels).default(0).interact()?;
    Ok(choice.checked_sub(1).map(|i| categories[i].id))
}

async fn open_article(ctx: &NewsContext, logger: &Option<LoggingService>) -> Result<()> {
    let items = ctx.listing.snapshot().items;
    let titles: Vec<&str> = items.iter().map(|a| a.title.as_str()).collect();
    let choice = Select::new().with_prompt("Article").items(&titles).default(0).interact()?;
    let id = items[choice].id;
    let page = format!("/articles/{}", id);

    if let Some(l) = logger {
        let _ = l.log_page(&page);
    }
    let article = match with_spinner("Loading article...", false, ctx.catalog.article(id)).await {
        Ok(article) => article,
        Err(e) => {
            log_event(logger, LogEvent::new("article_failed").with_page(page).with_error(&e));
            output::error(&e.to_string());
            return Ok(());
        }
    };

    println!();
    print_article(&article);
    println!();

    if article.is_bookmarked || ctx.guard("/bookmarks") != GuardDecision::Render {
        return Ok(());
    }
    if !Confirm::new().with_prompt("Bookmark this article?").default(false).interact()? {
        return Ok(());
    }

    match ctx.bookmarks.add(&article).await {
        Ok(AddBookmarkOutcome::Added) => output::success("Bookmarked."),
        Ok(AddBookmarkOutcome::AlreadyBookmarked) => println!("{}", "Already bookmarked.".yellow()),
        Err(e) => {
            log_event(logger, LogEvent::new("bookmark_failed").with_page("/bookmarks").with_error(&e));
            output::error(&e.to_string());
            if !ctx.session.is_authenticated() {
                output::warning("Your session has expired. Please log in again.");
            }
        }
    }
    Ok(())
}
