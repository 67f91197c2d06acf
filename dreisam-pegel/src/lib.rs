pub mod cli;
pub mod load_config;
pub mod mastodon;

pub use cli::{run, Cli, Commands};
