use clap::{
    Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use tempo_organizer::{
    cli::{self, OrganizeOptions, TempoOptions},
    config::{self, Config},
    error, tempo,
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
  args_conflicts_with_subcommands = true // running without a subcommand organizes
)]
struct Cli {
    /// Print debug output
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(flatten)]
    organize: OrganizeArgs,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sort tracks of your playlists into tempo playlists (default)
    Organize(OrganizeArgs),

    /// Authorize with Spotify API
    Auth,

    /// List your playlists
    Playlists(PlaylistsArgs),

    /// Show the tempo buckets without contacting Spotify
    Buckets(TempoArgs),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Args, Debug, Clone)]
pub struct TempoArgs {
    /// Lowest tempo of the stepped buckets
    #[clap(long, default_value_t = tempo::DEFAULT_START_TEMPO)]
    start_tempo: u32,

    /// Tempo where the last open-ended bucket starts
    #[clap(long, default_value_t = tempo::DEFAULT_END_TEMPO)]
    end_tempo: u32,

    /// Width of each stepped bucket in BPM
    #[clap(long, default_value_t = tempo::DEFAULT_INCREMENT)]
    increment: u32,

    /// Tracks with lower energy are counted at half tempo
    #[clap(long, default_value_t = tempo::DEFAULT_ENERGY_THRESHOLD)]
    energy_threshold: f64,
}

impl From<TempoArgs> for TempoOptions {
    fn from(args: TempoArgs) -> Self {
        TempoOptions {
            start_tempo: args.start_tempo,
            end_tempo: args.end_tempo,
            increment: args.increment,
            energy_threshold: args.energy_threshold,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct OrganizeArgs {
    #[clap(flatten)]
    tempo: TempoArgs,

    /// Categorize tracks but do not change any playlist
    #[clap(long)]
    dry_run: bool,

    /// Do not unfollow empty playlists afterwards
    #[clap(long)]
    keep_empty: bool,

    /// Create tempo playlists as private
    #[clap(long)]
    private: bool,
}

impl From<OrganizeArgs> for OrganizeOptions {
    fn from(args: OrganizeArgs) -> Self {
        OrganizeOptions {
            tempo: args.tempo.into(),
            dry_run: args.dry_run,
            keep_empty: args.keep_empty,
            private: args.private,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PlaylistsArgs {
    /// Only list playlists you own
    #[clap(long)]
    owned: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    tempo_organizer::set_verbose(cli.verbose);

    // commands that need neither credentials nor network
    match &cli.command {
        Some(Command::Completions(opt)) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
            return;
        }
        Some(Command::Buckets(args)) => {
            cli::buckets(&args.clone().into());
            return;
        }
        _ => {}
    }

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("{}", e),
    };

    match cli.command {
        None => cli::organize(&config, &cli.organize.into()).await,
        Some(Command::Organize(args)) => cli::organize(&config, &args.into()).await,
        Some(Command::Auth) => cli::auth(&config).await,
        Some(Command::Playlists(args)) => cli::list_playlists(&config, args.owned).await,
        Some(Command::Completions(_)) | Some(Command::Buckets(_)) => {}
    }
}
