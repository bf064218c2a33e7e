//! Annoview CLI application entry point
//!
//! Explores an annotated image dataset the way a gallery view does: the
//! filter flags build a filter state, the engine serializes it to a
//! canonical query, and the matching images are loaded page by page.
//!
//! # Usage
//!
//! ```bash
//! # First page of cat images that are not blurry
//! annoview explore --data images.json -t cat -e blurry
//!
//! # Three pages of wide images with high sharpness, as JSON
//! annoview explore -d images.json --width 1920..4000 -m sharpness=0.8..1 -p 3 --json
//!
//! # Inspect the query a remote endpoint would receive
//! annoview query -t cat -t dog --all-tags
//!
//! # Where the configuration lives
//! annoview config path
//! ```
//!
//! # Configuration
//!
//! Settings are stored in the user's config directory
//! (`~/.config/annoview/config.toml` on Linux) and can be overridden with
//! `ANNOVIEW_*` environment variables.

use annoview::{
    AnnoviewError, ExploreSession, FilterState, ImageItem, MemorySource,
    cli::{Cli, Commands, ConfigCommands, FilterArgs},
    config::EngineConfig,
    logging, output,
    query::serialize,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

type Result<T> = std::result::Result<T, AnnoviewError>;

/// JSON shape printed by `explore --json`
#[derive(Serialize)]
struct ExploreReport<'a> {
    key: &'a str,
    total: Option<u64>,
    has_next_page: bool,
    items: Vec<&'a ImageItem>,
}

/// Build the filter for a command, honoring configured match modes
fn build_filters(config: &EngineConfig, args: &FilterArgs, catalog: Option<Vec<String>>) -> FilterState {
    let mut filters = FilterState::with_match_modes(config.include_match_mode, config.exclude_match_mode);
    filters.set_tag_catalog(catalog);
    args.apply(&mut filters);

    for tag in args.rejected_tags(&filters) {
        warn!(tag, "tag not present in dataset, ignoring");
    }
    filters
}

/// Handle the explore command
///
/// # Errors
///
/// Returns `AnnoviewError` if no dataset is given, the dataset cannot be
/// loaded, or a page fetch fails.
#[allow(clippy::too_many_arguments)]
fn handle_explore_command(
    config: &EngineConfig,
    data: Option<PathBuf>,
    filter: &FilterArgs,
    pages: usize,
    page_size: Option<usize>,
    select_all: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let path = data.or_else(|| config.dataset.clone()).ok_or_else(|| {
        AnnoviewError::InvalidInput(
            "No dataset given. Use --data <FILE> or set `dataset` in the config file.".into(),
        )
    })?;
    let source = MemorySource::load(&path)?;

    let filters = build_filters(config, filter, Some(source.tag_catalog().into_iter().collect()));
    let mut session: ExploreSession<ImageItem> =
        ExploreSession::new(filters, page_size.unwrap_or(config.page_size));
    let loaded = session.load_pages(&source, pages.max(1))?;

    if select_all {
        session.select_all_visible();
    }

    let cache = session.cache();
    if json {
        let items = if select_all {
            session.selected_items()
        } else {
            cache.items().collect()
        };
        let report = ExploreReport {
            key: session.key().as_str(),
            total: cache.total(),
            has_next_page: cache.has_next_page(),
            items,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !quiet {
        println!(
            "{}",
            output::summary(cache.len(), cache.total(), loaded, cache.has_next_page())
        );
    }
    for item in cache.items() {
        let selected = session.selection().is_selected(&item.id);
        if select_all && !selected {
            continue;
        }
        println!("{}", output::item_line(item, selected, quiet));
    }
    if select_all && !quiet {
        println!("{}", output::selection_summary(session.selection().len()));
    }

    Ok(())
}

/// Handle the query command
///
/// # Errors
///
/// Returns `AnnoviewError` if the query cannot be encoded.
fn handle_query_command(config: &EngineConfig, filter: &FilterArgs, pretty: bool) -> Result<()> {
    let query = serialize(&build_filters(config, filter, None));
    let json = if pretty {
        serde_json::to_string_pretty(&query)?
    } else {
        query.to_json()?
    };
    println!("{json}");
    Ok(())
}

/// Handle config subcommands
///
/// # Errors
///
/// Returns `AnnoviewError` if the config path cannot be determined or the
/// configuration cannot be encoded.
fn handle_config_command(config: &EngineConfig, command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let toml_string = toml::to_string_pretty(config)
                .map_err(|e| AnnoviewError::InvalidInput(format!("Failed to encode config: {e}")))?;
            print!("{toml_string}");
        }
        ConfigCommands::Path => {
            println!("{}", EngineConfig::config_path()?.display());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let config = EngineConfig::load()?;

    logging::init_logging(&config.log_level, cli.verbose);

    match &cli.command {
        Commands::Explore {
            data,
            filter,
            pages,
            page_size,
            select_all,
            json,
        } => handle_explore_command(
            &config,
            data.clone(),
            filter,
            *pages,
            *page_size,
            *select_all,
            *json,
            cli.quiet,
        ),
        Commands::Query { filter, pretty } => handle_query_command(&config, filter, *pretty),
        Commands::Config { command } => handle_config_command(&config, command),
    }
}
