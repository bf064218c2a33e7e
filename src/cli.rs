//! Command-line interface definitions and parsing
//!
//! This module defines the CLI structure for annoview using the `clap` crate.
//! The filter flags shared by `explore` and `query` live in [`FilterArgs`],
//! which knows how to write itself into a [`FilterState`].
//!
//! # Commands
//!
//! - **explore**: Load a dataset, apply a filter and page through the matches
//! - **query**: Print the canonical query a filter produces
//! - **config**: Show the configuration or its location
//!
//! # Examples
//!
//! ```
//! use annoview::cli::{Cli, Commands};
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["annoview", "query", "-t", "cat", "--width", "640..1920"]);
//! assert!(matches!(cli.command, Commands::Query { .. }));
//! ```

use crate::filters::{DimensionKey, FilterState, MatchMode, NumericRange, TagDisposition};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Parse `NAME=MIN..MAX`
///
/// # Errors
///
/// Returns a message when the `=` or the range is missing or malformed.
pub fn parse_metric(s: &str) -> Result<(String, NumericRange), String> {
    let (name, range) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=MIN..MAX, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing metric name in '{s}'"));
    }
    Ok((name.to_string(), range.parse()?))
}

/// Parse `SCHEMA=VALUE`
///
/// # Errors
///
/// Returns a message when either side of the `=` is missing.
pub fn parse_attribute(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((schema, value)) if !schema.trim().is_empty() && !value.trim().is_empty() => {
            Ok((schema.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected SCHEMA=VALUE, got '{s}'")),
    }
}

/// Shared filter flags
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Include images with this tag (can specify multiple: -t cat -t dog)
    #[arg(short = 't', long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Exclude images with this tag
    #[arg(short = 'e', long = "exclude", value_name = "TAG")]
    pub excludes: Vec<String>,

    /// Require ALL included tags (AND logic)
    #[arg(long = "all-tags", conflicts_with = "any_tag")]
    pub all_tags: bool,

    /// Require ANY included tag (OR logic)
    #[arg(long = "any-tag", conflicts_with = "all_tags")]
    pub any_tag: bool,

    /// Exclude only images carrying ALL excluded tags
    #[arg(long = "all-excludes", conflicts_with = "any_exclude")]
    pub all_excludes: bool,

    /// Exclude images carrying ANY excluded tag
    #[arg(long = "any-exclude", conflicts_with = "all_excludes")]
    pub any_exclude: bool,

    /// Width range in pixels
    #[arg(long = "width", value_name = "MIN..MAX")]
    pub width: Option<NumericRange>,

    /// Height range in pixels
    #[arg(long = "height", value_name = "MIN..MAX")]
    pub height: Option<NumericRange>,

    /// File size range in bytes
    #[arg(long = "size", value_name = "MIN..MAX")]
    pub file_size: Option<NumericRange>,

    /// Quality metric range (can specify multiple)
    #[arg(short = 'm', long = "metric", value_name = "NAME=MIN..MAX", value_parser = parse_metric)]
    pub metrics: Vec<(String, NumericRange)>,

    /// Accepted attribute value (repeat for several values or schemas)
    #[arg(short = 'a', long = "attr", value_name = "SCHEMA=VALUE", value_parser = parse_attribute)]
    pub attributes: Vec<(String, String)>,

    /// Free-text query over names and tags
    #[arg(short = 'q', long = "query", value_name = "TEXT")]
    pub text: Option<String>,

    /// Restrict to explicit item ids
    #[arg(long = "id", value_name = "ID")]
    pub ids: Vec<String>,
}

impl FilterArgs {
    /// Match mode for included tags, if given on the command line
    #[must_use]
    pub const fn include_mode(&self) -> Option<MatchMode> {
        if self.all_tags {
            Some(MatchMode::All)
        } else if self.any_tag {
            Some(MatchMode::Any)
        } else {
            None
        }
    }

    /// Match mode for excluded tags, if given on the command line
    #[must_use]
    pub const fn exclude_mode(&self) -> Option<MatchMode> {
        if self.all_excludes {
            Some(MatchMode::All)
        } else if self.any_exclude {
            Some(MatchMode::Any)
        } else {
            None
        }
    }

    /// Write these flags into `filters`
    ///
    /// Match modes not given on the command line keep their current value.
    pub fn apply(&self, filters: &mut FilterState) {
        if let Some(mode) = self.include_mode() {
            filters.set_include_mode(mode);
        }
        if let Some(mode) = self.exclude_mode() {
            filters.set_exclude_mode(mode);
        }
        for tag in &self.tags {
            filters.set_tag_disposition(tag, Some(TagDisposition::Include));
        }
        for tag in &self.excludes {
            filters.set_tag_disposition(tag, Some(TagDisposition::Exclude));
        }

        filters.set_range(DimensionKey::Width, self.width);
        filters.set_range(DimensionKey::Height, self.height);
        filters.set_range(DimensionKey::FileSize, self.file_size);
        for (name, range) in &self.metrics {
            filters.set_range(DimensionKey::Metric(name.clone()), Some(*range));
        }

        for (schema, value) in &self.attributes {
            if filters.category_values(schema).is_none_or(|values| !values.contains(value)) {
                filters.toggle_category_value(schema, value);
            }
        }

        filters.set_text_query(self.text.as_deref());
        if !self.ids.is_empty() {
            filters.set_item_ids(self.ids.iter().cloned());
        }
    }

    /// Tags given on the command line that did not make it into `filters`
    #[must_use]
    pub fn rejected_tags<'a>(&'a self, filters: &FilterState) -> Vec<&'a str> {
        self.tags
            .iter()
            .chain(&self.excludes)
            .map(String::as_str)
            .filter(|tag| filters.disposition(tag).is_none())
            .collect()
    }
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the configuration file location
    Path,
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "annoview")]
#[command(about = "Explore annotated image datasets through filtered, paginated views", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress informational output (only print item ids)
    #[arg(long = "quiet", global = true)]
    pub quiet: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Page through the images matching a filter
    #[command(visible_alias = "x")]
    Explore {
        /// Dataset file (JSON array of images); defaults to the configured dataset
        #[arg(short = 'd', long = "data", value_name = "FILE")]
        data: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Number of pages to load
        #[arg(short = 'p', long = "pages", value_name = "N", default_value_t = 1)]
        pages: usize,

        /// Items per page (overrides config)
        #[arg(long = "page-size", value_name = "N")]
        page_size: Option<usize>,

        /// Select every loaded item and print only the selection
        #[arg(long = "select-all")]
        select_all: bool,

        /// Print the loaded items as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// Print the canonical query for a filter
    Query {
        #[command(flatten)]
        filter: FilterArgs,

        /// Pretty-print the JSON
        #[arg(long = "pretty")]
        pretty: bool,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter_args(args: &[&str]) -> FilterArgs {
        let argv = ["annoview", "query"].iter().chain(args);
        match Cli::parse_from(argv).command {
            Commands::Query { filter, .. } => filter,
            other => panic!("Expected Query command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_explore_defaults() {
        let cli = Cli::parse_from(["annoview", "explore", "--data", "images.json"]);
        if let Commands::Explore { data, pages, page_size, json, .. } = cli.command {
            assert_eq!(data, Some(PathBuf::from("images.json")));
            assert_eq!(pages, 1);
            assert_eq!(page_size, None);
            assert!(!json);
        } else {
            panic!("Expected Explore command");
        }
    }

    #[test]
    fn test_parse_verbosity() {
        let cli = Cli::parse_from(["annoview", "-vv", "config", "show"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        assert!(matches!(cli.command, Commands::Config { command: ConfigCommands::Show }));
    }

    #[test]
    fn test_parse_quiet_after_subcommand() {
        let cli = Cli::parse_from(["annoview", "explore", "-d", "images.json", "--quiet", "-q", "street"]);
        assert!(cli.quiet);
        if let Commands::Explore { filter, .. } = cli.command {
            assert_eq!(filter.text.as_deref(), Some("street"));
        } else {
            panic!("Expected Explore command");
        }
    }

    #[test]
    fn test_parse_tags_and_modes() {
        let args = filter_args(&["-t", "cat", "-t", "dog", "-e", "blurry", "--all-tags"]);
        assert_eq!(args.tags, vec!["cat", "dog"]);
        assert_eq!(args.excludes, vec!["blurry"]);
        assert_eq!(args.include_mode(), Some(MatchMode::All));
        assert_eq!(args.exclude_mode(), None);
    }

    #[test]
    fn test_conflicting_modes_rejected() {
        let result = Cli::try_parse_from(["annoview", "query", "--all-tags", "--any-tag"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_ranges_and_metrics() {
        let args = filter_args(&["--width", "1920..640", "-m", "sharpness=0.2..0.9"]);
        assert_eq!(args.width, Some(NumericRange { min: 640.0, max: 1920.0 }));
        assert_eq!(
            args.metrics,
            vec![("sharpness".to_string(), NumericRange { min: 0.2, max: 0.9 })]
        );
    }

    #[test]
    fn test_parse_metric_errors() {
        assert!(parse_metric("sharpness").is_err());
        assert!(parse_metric("=0..1").is_err());
        assert!(parse_metric("sharpness=abc").is_err());
    }

    #[test]
    fn test_parse_attribute() {
        assert_eq!(
            parse_attribute("weather=rain"),
            Ok(("weather".to_string(), "rain".to_string()))
        );
        assert!(parse_attribute("weather=").is_err());
        assert!(parse_attribute("rain").is_err());
    }

    #[test]
    fn test_apply_builds_filter_state() {
        let args = filter_args(&[
            "-t", "cat", "-e", "blurry", "--any-exclude", "--size", "0..1000", "-a", "weather=rain",
            "-a", "weather=snow", "-q", "street",
        ]);
        let mut filters = FilterState::new();
        args.apply(&mut filters);

        assert_eq!(filters.included_ids(), vec!["cat"]);
        assert_eq!(filters.excluded_ids(), vec!["blurry"]);
        assert_eq!(
            filters.numeric_range(&DimensionKey::FileSize),
            Some(NumericRange { min: 0.0, max: 1000.0 })
        );
        assert_eq!(filters.category_values("weather").map(|v| v.len()), Some(2));
        assert_eq!(filters.text_query(), Some("street"));
    }

    #[test]
    fn test_apply_repeated_attribute_is_idempotent() {
        let args = filter_args(&["-a", "weather=rain", "-a", "weather=rain"]);
        let mut filters = FilterState::new();
        args.apply(&mut filters);
        assert_eq!(filters.category_values("weather").map(|v| v.len()), Some(1));
    }

    #[test]
    fn test_rejected_tags_with_catalog() {
        let args = filter_args(&["-t", "cat", "-t", "unicorn"]);
        let mut filters = FilterState::new();
        filters.set_tag_catalog(Some(["cat", "dog"]));
        args.apply(&mut filters);
        assert_eq!(args.rejected_tags(&filters), vec!["unicorn"]);
    }
}
