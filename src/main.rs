use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotauth::{cli, config, error, management::TokenCache};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Token cache file (overrides TOKEN_CACHE_PATH)
    #[clap(long, global = true)]
    cache: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify, reusing or refreshing a cached token when possible
    Auth(AuthOptions),

    /// Print a valid access token to stdout
    Token,

    /// Print the authorization URL
    Url,

    /// Show the cached token
    Status,

    /// Delete the cached token
    Logout,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Ignore the cache and log in through the browser again
    #[clap(long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth(opt) => cli::auth(&settings(cli.cache), opt.force).await,
        Command::Token => cli::token(&settings(cli.cache)).await,
        Command::Url => cli::url(&settings(cli.cache)),
        Command::Status => cli::status(&cache(cli.cache)).await,
        Command::Logout => cli::logout(&cache(cli.cache)).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}

fn settings(cache_override: Option<PathBuf>) -> config::Settings {
    let mut settings = match config::Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("Invalid configuration. Err: {}", e),
    };
    if let Some(path) = cache_override {
        settings.cache_path = path;
    }
    settings
}

// Status and logout only touch the cache, so they work without credentials.
fn cache(cache_override: Option<PathBuf>) -> TokenCache {
    let path =
        cache_override.unwrap_or_else(|| config::cache_path(|key| std::env::var(key).ok()));
    TokenCache::new(path)
}
