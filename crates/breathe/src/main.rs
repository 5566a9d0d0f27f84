//! breathe - Breath-pacing exercise timer
//!
//! Usage:
//!   breathe start [--inhale SECS] [--exhale SECS] [--minutes MINS]
//!   breathe plan  [--inhale SECS] [--exhale SECS] [--minutes MINS]
//!   breathe settings [--json]
//!   breathe reset

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use breathe::driver::{DriverHandle, TICK_PERIOD};
use breathe::engine::{BreathCycleEngine, Snapshot};
use breathe::params::{BreathParams, BreathParamsPatch};
use breathe::render::{self, Frame, Painter};
use breathe::store::{FileStore, SettingsStore};
use breathe_core::{format, Config, Paths};

/// breathe - Breath-pacing exercise timer
#[derive(Parser)]
#[command(name = "breathe")]
#[command(about = "Guided inhale/exhale breathing exercise timer")]
#[command(version)]
#[command(after_help = r#"WHEN TO USE:
    A few minutes of paced breathing between focus sessions, or whenever
    you need to slow down. The last settings you ran with are remembered.

EXAMPLES:
    breathe start                          # Run with the last-used settings
    breathe start --inhale 4 --exhale 6    # Longer exhale
    breathe start --minutes 10             # Ten minute session
    breathe plan --inhale 4 --exhale 7     # How long would that take?
    breathe settings                       # Show remembered settings
    breathe reset                          # Forget them

NOTES:
    A session always ends at the end of an exhale, so it may run a few
    seconds past the requested minutes. Ctrl-C stops early.

ENVIRONMENT:
    BREATHE_HOME    Use this directory instead of the XDG config/data dirs
    RUST_LOG        Log filter, e.g. RUST_LOG=breathe=debug

ALIASES:
    breathe s     # start
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a breathing session
    #[command(alias = "s")]
    Start {
        #[command(flatten)]
        settings: SettingsArgs,

        /// Don't remember these settings for next time
        #[arg(long)]
        no_save: bool,
    },

    /// Show how long a session would run
    Plan {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Show saved settings
    Settings {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget saved settings
    Reset,
}

#[derive(Args)]
struct SettingsArgs {
    /// Inhale length in seconds
    #[arg(short, long, value_name = "SECS")]
    inhale: Option<u32>,

    /// Exhale length in seconds
    #[arg(short, long, value_name = "SECS")]
    exhale: Option<u32>,

    /// Training length in minutes
    #[arg(short, long, value_name = "MINS")]
    minutes: Option<u32>,
}

impl SettingsArgs {
    fn patch(&self) -> BreathParamsPatch {
        BreathParamsPatch {
            inhale_seconds: self.inhale,
            exhale_seconds: self.exhale,
            training_minutes: self.minutes,
        }
    }
}

/// Everything a command needs
struct App {
    config: Config,
    settings: SettingsStore,
    painter: Painter,
}

impl App {
    fn load() -> Result<Self> {
        let paths = match std::env::var_os("BREATHE_HOME") {
            Some(home) => Paths::rooted(PathBuf::from(home)),
            None => Paths::new(),
        };

        let config = Config::load(&paths.config_file())?;
        let store = FileStore::new(&paths.state("kv"))?;
        let painter = Painter::detect(config.color);

        Ok(Self {
            config,
            settings: SettingsStore::new(Arc::new(store)),
            painter,
        })
    }

    /// Engine over the saved settings
    fn engine(&self) -> BreathCycleEngine {
        BreathCycleEngine::new(self.settings.clone())
    }

    /// The engine's saved settings, else configured defaults, with `patch` on top
    fn params(&self, engine: &BreathCycleEngine, patch: BreathParamsPatch) -> BreathParams {
        patch.apply(engine.initial_params(BreathParams::from(self.config.defaults)))
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let app = App::load()?;

    match cli.command {
        Some(Commands::Start { settings, no_save }) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(cmd_start(&app, settings.patch(), no_save))
        }
        Some(Commands::Plan { settings }) => cmd_plan(&app, settings.patch()),
        Some(Commands::Settings { json }) => cmd_settings(&app, json),
        Some(Commands::Reset) => cmd_reset(&app),
        None => cmd_settings(&app, false),
    }
}

/// Run a session until it finishes or Ctrl-C
async fn cmd_start(app: &App, patch: BreathParamsPatch, no_save: bool) -> Result<()> {
    let painter = app.painter;
    let engine = app.engine();
    let params = app.params(&engine, patch);

    let engine = if no_save {
        BreathCycleEngine::new(SettingsStore::in_memory())
    } else {
        engine
    };
    let driver = DriverHandle::spawn(engine, TICK_PERIOD);

    if let Err(e) = driver.start(params).await {
        driver.shutdown().await;
        return Err(e).context("Cannot start session; fix the settings and try again");
    }

    println!("{}", painter.ok("Breathing session started"));
    println!();
    println!("  {} {}", painter.label("Settings:"), render::settings_line(&params));
    println!(
        "  {}   {}",
        painter.label("Length:"),
        format::duration(params.projected_seconds())
    );
    if let Some(end) = projected_end(&params) {
        println!("  {}  {}", painter.label("Ends at:"), end);
    }
    println!();

    let interactive = render::use_colors();
    let mut updates = driver.subscribe();
    let initial = *updates.borrow_and_update();
    draw(&initial, &painter, interactive)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = *updates.borrow_and_update();
                draw(&snapshot, &painter, interactive)?;
                if !snapshot.state.running {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                driver.stop().await?;
                break;
            }
        }
    }

    if interactive {
        println!();
    }
    let last = driver.current();
    driver.shutdown().await;

    if let Some(line) = render::closing_line(&last) {
        println!();
        println!("{}", painter.heading(&line));
    }

    Ok(())
}

/// Redraw the status line in place on a terminal, one line per tick otherwise
fn draw(snapshot: &Snapshot, painter: &Painter, interactive: bool) -> Result<()> {
    let line = Frame::from_snapshot(snapshot).line(painter);
    let mut stdout = io::stdout().lock();
    if interactive {
        write!(stdout, "\r{}\x1b[K", line)?;
    } else {
        writeln!(stdout, "{}", line)?;
    }
    stdout.flush()?;
    Ok(())
}

fn projected_end(params: &BreathParams) -> Option<String> {
    let seconds = i64::try_from(params.projected_seconds()).ok()?;
    let end = Local::now().checked_add_signed(chrono::Duration::try_seconds(seconds)?)?;
    Some(format::time(end))
}

/// Show what a session would look like without running it
fn cmd_plan(app: &App, patch: BreathParamsPatch) -> Result<()> {
    let painter = app.painter;
    let params = app.params(&app.engine(), patch);
    params.validate()?;

    println!("{}", painter.heading("BREATHING PLAN"));
    println!();
    println!("  {} {}", painter.label("Settings:"), render::settings_line(&params));
    println!(
        "  {}   {} ({} breaths)",
        painter.label("Length:"),
        format::duration(params.projected_seconds()),
        params.projected_cycles()
    );
    if let Some(end) = projected_end(&params) {
        println!("  {}  {} if started now", painter.label("Ends at:"), end);
    }

    Ok(())
}

/// Show saved settings
fn cmd_settings(app: &App, json: bool) -> Result<()> {
    let saved = app.settings.load();

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
        return Ok(());
    }

    let painter = app.painter;
    match saved {
        Some(params) => {
            println!("{}", painter.heading("SAVED SETTINGS"));
            println!();
            println!("  {}  {} seconds", painter.label("Inhale:"), params.inhale_seconds);
            println!("  {}  {} seconds", painter.label("Exhale:"), params.exhale_seconds);
            println!("  {}  {} minutes", painter.label("Length:"), params.training_minutes);
        }
        None => {
            let defaults = BreathParams::from(app.config.defaults);
            println!("{}", painter.info("No saved settings"));
            println!();
            println!("Defaults: {}", render::settings_line(&defaults));
            println!("Start one with: breathe start");
        }
    }

    Ok(())
}

/// Forget saved settings
fn cmd_reset(app: &App) -> Result<()> {
    app.settings.clear();
    println!("{}", app.painter.ok("Saved settings cleared"));
    Ok(())
}
