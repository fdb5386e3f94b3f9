use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use moodlist::{
    cli, config, error,
    generator::{MAX_SONGS, MIN_SONGS},
    warning,
};

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
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create playlists from a mood description (default)
    Create(CreateOptions),

    /// Authorize with Spotify API
    Auth,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone, Default)]
pub struct CreateOptions {
    /// Mood or theme; runs once instead of the interactive loop
    #[clap(long)]
    pub prompt: Option<String>,

    /// Number of songs to ask for
    #[clap(long, value_parser = parse_count)]
    pub count: Option<usize>,

    /// Playlist name; generated when omitted
    #[clap(long)]
    pub name: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn parse_count(s: &str) -> Result<usize, String> {
    moodlist::generator::parse_song_count(s)
        .map_err(|e| format!("{} ({}..={})", e, MIN_SONGS, MAX_SONGS))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Some(Command::Completions(opt)) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment file. Err: {}", e);
    }

    let settings = match config::Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!(
            "{}\nSet it in the environment or in {}",
            e,
            config::env_path().display()
        ),
    };

    let ctx = match cli::Context::start(settings).await {
        Ok(ctx) => ctx,
        Err(e) => error!("{}", e),
    };

    match cli.command.unwrap_or(Command::Create(CreateOptions::default())) {
        Command::Create(opt) => cli::create(&ctx, opt.prompt, opt.count, opt.name).await,
        Command::Auth => cli::auth(&ctx).await,
        Command::Completions(_) => {}
    }
}
