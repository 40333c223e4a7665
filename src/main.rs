#![forbid(unsafe_code)]

mod animation;
mod collection;
mod config;
mod constants;
mod editor;
mod error;
mod event_loop;
mod exam;
mod font;
mod font_discovery;
mod kind;
mod launch;
mod launcher;
mod markup;
mod render;
mod scheduler;
mod snap_controller;
mod snapping;
mod style;
mod types;
mod widget;
mod window;
mod x11;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;
use x11rb::connection::Connection;

use collection::WidgetCollection;
use config::{AppSettings, DataDir};
use constants::presentation;
use event_loop::{ExamShell, LauncherShell, WidgetShell};
use exam::ExamScreen;
use font::FontRenderer;
use kind::WidgetKind;
use launcher::LaunchBar;
use x11::{CachedAtoms, X11Desktop};

/// Desktop sticky notes and a quick-launch bar
#[derive(Debug, Parser)]
#[command(name = "sticky-widgets", version, about)]
struct Cli {
    /// What to run: `qs`, `htmlwidget`, `mdwidget`, `testmode` or `settings`
    target: Option<String>,

    /// Directory holding widget files, `qs.json` and `app.json`
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[arg(long, hide = true, value_name = "CONFIG")]
    edit_widget: Option<PathBuf>,

    #[arg(long, hide = true, value_enum)]
    kind: Option<WidgetKind>,

    #[arg(long, hide = true, value_name = "CONFIG")]
    edit_launcher: Option<PathBuf>,

    #[arg(long, hide = true, value_name = "FILE")]
    outcome: Option<PathBuf>,
}

/// Targets that put windows on the X11 display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisplayTarget {
    LaunchBar,
    Widgets(WidgetKind),
    ExamMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LaunchTarget {
    Display(DisplayTarget),
    /// Feature toggle window, an egui app of its own
    Settings,
}

impl LaunchTarget {
    fn parse(arg: &str) -> Option<Self> {
        let display = match arg {
            "qs" => DisplayTarget::LaunchBar,
            "htmlwidget" => DisplayTarget::Widgets(WidgetKind::Html),
            "mdwidget" => DisplayTarget::Widgets(WidgetKind::Markdown),
            "testmode" => DisplayTarget::ExamMode,
            "settings" => return Some(LaunchTarget::Settings),
            _ => return None,
        };
        Some(LaunchTarget::Display(display))
    }

    fn is_enabled(self, settings: &AppSettings) -> bool {
        match self {
            LaunchTarget::Display(DisplayTarget::LaunchBar) => settings.qs_enabled,
            LaunchTarget::Display(DisplayTarget::Widgets(WidgetKind::Html)) => settings.html_widget_enabled,
            LaunchTarget::Display(DisplayTarget::Widgets(WidgetKind::Markdown)) => settings.md_widget_enabled,
            // Not feature toggles; the settings window must stay reachable
            LaunchTarget::Display(DisplayTarget::ExamMode) | LaunchTarget::Settings => true,
        }
    }
}

fn init_logging() -> Result<()> {
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install tracing subscriber")?;
    Ok(())
}

fn run_display(target: DisplayTarget, data: &DataDir) -> Result<()> {
    let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X11 server")?;
    let screen = &conn.setup().roots[screen_num];
    info!(
        screen = screen_num,
        width = screen.width_in_pixels,
        height = screen.height_in_pixels,
        "Connected to X11"
    );

    let atoms = CachedAtoms::new(&conn).context("Failed to cache X11 atoms")?;
    let font = FontRenderer::load(presentation::FONT_FAMILY).context("Failed to load a font for widget text")?;
    let desktop = X11Desktop::new(&conn, screen, &atoms, &font)?;
    let shutdown = event_loop::shutdown_flag()?;

    match target {
        DisplayTarget::LaunchBar => {
            let bar = LaunchBar::new(&desktop, &desktop, data.launcher_config(), Instant::now())
                .context("Failed to start launch bar")?;
            let mut shell = LauncherShell::new(&desktop, bar);
            event_loop::run(&conn, &mut shell, &shutdown)
        }
        DisplayTarget::Widgets(kind) => {
            let mut collection = WidgetCollection::new(kind, kind.directory(data));
            if collection.ensure_bootstrapped()? {
                info!(kind = kind.label(), dir = %collection.dir().display(), "First run, seeded example widget");
            }
            collection
                .scan(&desktop, Instant::now())
                .context("Failed to scan widget directory")?;
            if collection.is_empty() {
                info!(kind = kind.label(), "No widgets to show");
                return Ok(());
            }
            conn.flush().context("Failed to flush after creating widgets")?;

            let mut shell = WidgetShell::new(&desktop, collection);
            event_loop::run(&conn, &mut shell, &shutdown)
        }
        DisplayTarget::ExamMode => {
            let screen = ExamScreen::new(&desktop, &desktop).context("Failed to start exam mode")?;
            let mut shell = ExamShell::new(screen);
            event_loop::run(&conn, &mut shell, &shutdown)
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            info!(error = %e, "Unrecognized command line, nothing to do");
            return Ok(());
        }
    };

    if let Some(config) = &cli.edit_widget {
        let kind = cli.kind.unwrap_or(WidgetKind::Html);
        let outcome = cli.outcome.clone().unwrap_or_else(|| editor::session::outcome_path_for(config));
        editor::run_widget_editor(config, kind, outcome)?;
        return Ok(());
    }
    if let Some(config) = &cli.edit_launcher {
        let outcome = cli.outcome.clone().unwrap_or_else(|| editor::session::outcome_path_for(config));
        editor::run_launcher_editor(config, outcome)?;
        return Ok(());
    }

    let Some(target) = cli.target.as_deref().and_then(LaunchTarget::parse) else {
        info!(target = ?cli.target, "No known target given, nothing to do");
        return Ok(());
    };

    let data = cli.data_dir.map(DataDir::new).unwrap_or_else(DataDir::platform_default);
    let settings = AppSettings::load(&data.app_settings());
    if !target.is_enabled(&settings) {
        warn!(?target, "Target disabled in app settings");
        return Ok(());
    }

    info!(?target, data_dir = %data.root().display(), "Starting");
    match target {
        LaunchTarget::Display(display) => run_display(display, &data)?,
        LaunchTarget::Settings => editor::run_settings_editor(&data.app_settings())?,
    }
    info!("Exited cleanly");
    Ok(())
}
