//! CLI domain: parse, route, output, and presentation only.
//! Pipeline behavior lives in the library; handlers stay thin.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, ConfigCommands};
pub use presentation::{
    format_items_json, format_items_text, format_run_summary, format_topic_json,
    format_topic_text, TopicView,
};
pub use route::{RunContext, Seed, SeedDocument};
