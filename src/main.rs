mod app;
mod config;
mod constants;
mod favorites;
mod history;
mod input;
mod omdb;
mod poster;
mod storage;
mod theme;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;

use app::App;
use constants::constants;
use poster::CliPosterMode;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Initial search, run immediately on startup.
  query: Vec<String>,

  /// OMDb API key (overrides OMDB_API_KEY and the saved config).
  #[arg(short = 'a', long)]
  api_key: Option<String>,

  /// Poster rendering: 'auto', 'blocks', 'ascii', or 'off' (default: auto-detect)
  #[arg(short, long, default_value = "auto")]
  posters: CliPosterMode,

  /// Print shell completions for the given shell and exit.
  #[arg(long, value_enum)]
  completions: Option<Shell>,
}

// --- Logging ---

/// Logs go to a file under the platform data directory; stdout belongs to the terminal UI.
fn init_logging() -> Option<WorkerGuard> {
  let dir = config::data_dir()?;
  std::fs::create_dir_all(&dir).ok()?;
  let appender = tracing_appender::rolling::never(&dir, &constants().log_file_name);
  let (writer, guard) = tracing_appender::non_blocking(appender);
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&constants().default_log_filter));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
  Some(guard)
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    let mut cmd = Args::command();
    clap_complete::generate(shell, &mut cmd, "reel", &mut std::io::stdout());
    return Ok(());
  }

  let _guard = init_logging();

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, args).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, args: Args) -> Result<()> {
  let poster_mode = poster::resolve_poster_mode(args.posters);
  let mut app = App::new(args.query.join(" "), args.api_key, poster_mode);
  if !app.input.is_empty() {
    app.trigger_search();
  }

  loop {
    app.check_pending();

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key);
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  Ok(())
}
