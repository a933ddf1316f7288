use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use gifboard_client::{BoardError, BoardSnapshot, BoardView, ControllerState};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}

pub fn eprintln_line(msg: &str) {
    let _ = writeln!(io::stderr(), "{msg}");
}

pub fn stdout() -> StandardStream {
    StandardStream::stdout(ColorChoice::Auto)
}

/// Spinner on stderr while a remote call is in flight. Hidden in JSON mode.
pub fn spinner(msg: &'static str) -> ProgressBar {
    if is_json() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(80));
    pb.set_message(msg);
    pb
}

#[derive(Debug, Serialize)]
struct ErrorOut<'a> {
    ok: bool,
    code: &'a str,
    error: String,
}

/// Report a failed command. Board errors keep their code in JSON mode.
pub fn report_error(err: &anyhow::Error) {
    if is_json() {
        let code = err.downcast_ref::<BoardError>().map(|e| e.code()).unwrap_or("error");
        let _ = print(&ErrorOut { ok: false, code, error: format!("{err:#}") });
    } else {
        eprintln_line(&format!("error: {err:#}"));
    }
}

/// Human-readable board listing.
pub fn print_board(state: ControllerState, snapshot: &BoardSnapshot) -> anyhow::Result<()> {
    let mut out = stdout();

    match &snapshot.view {
        BoardView::Unfetched => {
            writeln!(out, "board not loaded ({})", describe(state))?;
        }
        BoardView::Uninitialized => {
            writeln!(out, "board account does not exist yet; run `gifboard init` to create it")?;
        }
        BoardView::Error { message } => {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
            writeln!(out, "board unavailable: {message}")?;
            out.reset()?;
        }
        BoardView::Populated { total_entries, entries } => {
            writeln!(out, "{} entries (epoch {})", total_entries, snapshot.epoch)?;
            if entries.is_empty() {
                writeln!(out, "no entries yet; add one with `gifboard submit <link>`")?;
            }
            for (i, entry) in entries.iter().enumerate() {
                let color = match entry.score {
                    s if s > 0 => Color::Green,
                    s if s < 0 => Color::Red,
                    _ => Color::White,
                };
                write!(out, "[{i:>3}] ")?;
                out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
                write!(out, "{:>+5}", entry.score)?;
                out.reset()?;
                writeln!(out, "  {}  by {}", entry.link, entry.submitter)?;
            }
        }
    }
    Ok(())
}

pub fn describe(state: ControllerState) -> &'static str {
    match state {
        ControllerState::Disconnected => "not connected",
        ControllerState::Connecting => "connecting",
        ControllerState::Refreshing => "refreshing",
        ControllerState::Connected(_) => "connected",
    }
}
