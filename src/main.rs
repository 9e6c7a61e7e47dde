use clap::Parser;
use tasktree::cli::commands::Cli;
use tasktree::cli::handlers;
use tasktree::io::{config_io, paths};
use tasktree::logging;

fn main() {
    let cli = Cli::parse();
    let data_dir = paths::resolve_data_dir(cli.data_dir.as_deref());

    // A broken config.toml is reported by the command itself; logging
    // falls back to the default level.
    let configured = config_io::load_config(&data_dir)
        .map(|c| c.log.level)
        .unwrap_or_else(|_| "info".to_string());
    let env_level = std::env::var(logging::LOG_ENV).ok();
    let level = logging::resolve_level(env_level.as_deref(), &configured);
    if let Err(e) = logging::init_logging(&level, &paths::log_dir(&data_dir)) {
        eprintln!("warning: logging disabled: {}", e);
    }

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        // No subcommand → launch TUI
        None => tasktree::tui::run(&data_dir).map_err(Into::into),
        Some(_) => handlers::dispatch(cli),
    };
    if let Err(e) = result {
        log::error!("event=app_exit module=core status=error");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
