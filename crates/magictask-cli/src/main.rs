use clap::{Parser, Subcommand};
use magictask_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "magictask", version, about = "MagicTask CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Subtask management
    Subtask {
        #[command(subcommand)]
        action: commands::subtask::SubtaskAction,
    },
    /// Show or switch the current task view
    View {
        /// active, completed or all; omit to list the current view
        view: Option<String>,
    },
    /// Interval timer
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Focus mode
    Focus {
        #[command(subcommand)]
        action: commands::focus::FocusAction,
    },
    /// Persisted app state
    State {
        #[command(subcommand)]
        action: commands::state::StateAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    // RUST_LOG wins over the configured level.
    let level = Config::load()
        .map(|c| c.logging.level)
        .unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::Subtask { action } => commands::subtask::run(action),
        Commands::View { view } => commands::view::run(view),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Focus { action } => commands::focus::run(action),
        Commands::State { action } => commands::state::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
