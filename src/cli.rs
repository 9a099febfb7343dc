use clap::{Parser, Subcommand};
use color_eyre::eyre::{self, eyre};

use crate::api::{FeedClient, fetch_collections};
use crate::config::{AppConfig, load_config};
use crate::store::{FeedRow, FeedStore, FeedView};
use crate::view_model::SortOrder;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "postfeed", about = "TUI and CLI for a searchable post feed")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand)]
pub enum CliCommand {
    /// Launch the interactive TUI (default)
    Tui,
    /// Print one feed page (JSONL)
    Page {
        /// Case-insensitive match on post title or author name
        #[arg(long, default_value = "")]
        search: String,
        /// Sort by post id: asc or desc
        #[arg(long)]
        sort: Option<SortOrder>,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Posts per page
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Print a post with its comments (JSON)
    Post {
        /// Post id
        id: u64,
    },
}

// ---------------------------------------------------------------------------
// Denormalization helpers
// ---------------------------------------------------------------------------

/// Build a self-contained JSON object for a feed row with its author, like
/// state and comment count embedded.
fn denormalize_row(row: &FeedRow<'_>) -> serde_json::Value {
    serde_json::json!({
        "post": row.post,
        "author": row.author,
        "like": row.like,
        "comment_count": row.comment_count,
    })
}

fn page_summary(view: &FeedView<'_>) -> serde_json::Value {
    serde_json::json!({
        "range": view.range.to_string(),
        "page": view.filter.page,
        "page_count": view.page_count,
        "page_size": view.filter.page_size,
        "total": view.filtered_total,
    })
}

// ---------------------------------------------------------------------------
// Client construction (shared with main.rs TUI path)
// ---------------------------------------------------------------------------

pub fn build_api_client(config: &AppConfig) -> eyre::Result<FeedClient> {
    config.validate()?;
    Ok(FeedClient::new(&config.base_url)?)
}

/// Fetch once into a fresh store. Any fetch failure is an error here.
async fn load_store(config: &AppConfig) -> eyre::Result<FeedStore> {
    let client = build_api_client(config)?;
    let mut store = FeedStore::new(config.store_options());
    let generation = store.begin_fetch();
    let collections = fetch_collections(&client).await?;
    store.apply_fetch::<String>(generation, Ok(collections));
    Ok(store)
}

// ---------------------------------------------------------------------------
// Command execution
// ---------------------------------------------------------------------------

pub async fn run_command(cmd: CliCommand) -> eyre::Result<()> {
    let config = load_config();

    match cmd {
        CliCommand::Tui => unreachable!("tui is handled in main"),

        CliCommand::Page {
            search,
            sort,
            page,
            page_size,
        } => {
            let mut store = load_store(&config).await?;
            if let Some(order) = sort {
                store.set_sort(order);
            }
            if let Some(size) = page_size {
                store.set_page_size(size);
            }
            store.set_search(search);
            store.set_page(page);

            let view = store.view();
            for row in &view.rows {
                println!("{}", serde_json::to_string(&denormalize_row(row))?);
            }
            println!("{}", serde_json::to_string(&page_summary(&view))?);
        }

        CliCommand::Post { id } => {
            let mut store = load_store(&config).await?;
            let like = store.like(id);
            let detail = store
                .open_detail(id)
                .map_err(|e| eyre!("post lookup failed: {e}"))?;
            let line = serde_json::to_string(&serde_json::json!({
                "post": detail.post,
                "author": detail.author,
                "like": like,
                "comments": detail.comments,
            }))?;
            println!("{line}");
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Post, User};
    use crate::store::LikeState;

    fn sample_post() -> Post {
        Post {
            id: 4,
            user_id: 1,
            title: "eum et est occaecati".into(),
            body: "ullam et saepe".into(),
        }
    }

    #[test]
    fn denormalize_row_embeds_author_and_like() {
        let post = sample_post();
        let user = User {
            id: 1,
            name: "Leanne Graham".into(),
        };
        let row = FeedRow {
            post: &post,
            author: Some(&user),
            like: LikeState {
                count: 12,
                liked: true,
            },
            comment_count: 5,
        };
        let value = denormalize_row(&row);
        assert_eq!(value["post"]["userId"], 1);
        assert_eq!(value["author"]["name"], "Leanne Graham");
        assert_eq!(value["like"]["count"], 12);
        assert_eq!(value["like"]["liked"], true);
        assert_eq!(value["comment_count"], 5);
    }

    #[test]
    fn denormalize_row_without_author_is_null() {
        let post = sample_post();
        let row = FeedRow {
            post: &post,
            author: None,
            like: LikeState::default(),
            comment_count: 0,
        };
        assert!(denormalize_row(&row)["author"].is_null());
    }

    #[test]
    fn page_summary_reports_range() {
        let store = FeedStore::default();
        let summary = page_summary(&store.view());
        assert_eq!(summary["range"], "0-0 of 0 items");
        assert_eq!(summary["page"], 1);
    }

    #[test]
    fn parses_page_subcommand() {
        let cli = Cli::try_parse_from([
            "postfeed",
            "page",
            "--search",
            "qui",
            "--sort",
            "desc",
            "--page",
            "2",
            "--page-size",
            "5",
        ])
        .unwrap();
        match cli.command {
            Some(CliCommand::Page {
                search,
                sort,
                page,
                page_size,
            }) => {
                assert_eq!(search, "qui");
                assert_eq!(sort, Some(SortOrder::Descending));
                assert_eq!(page, 2);
                assert_eq!(page_size, Some(5));
            }
            _ => panic!("expected page subcommand"),
        }
    }
}
