//! The terminal front-end for Kingstrike.

use anyhow::Result;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{Clear, ClearType};
use engine::{Coord, Engine, GameOutcome, Highlight, Highlighter, Notification, Notifier, RandomSource, TurnState};
use std::collections::HashMap;
use std::io::{self, Write};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const POPUP_DURATION: Duration = Duration::from_millis(500);

/// Cell colours, planned enemy moves and the current popup, as last pushed by
/// the engine.
pub struct TerminalFrontend {
    highlights: HashMap<Coord, Highlight>,
    intents: Vec<(Coord, Coord)>,
    popup: Option<(u64, String)>,
    popup_seq: u64,
    hide_tx: mpsc::UnboundedSender<u64>,
}

impl TerminalFrontend {
    pub fn new(hide_tx: mpsc::UnboundedSender<u64>) -> Self {
        Self {
            highlights: HashMap::new(),
            intents: Vec::new(),
            popup: None,
            popup_seq: 0,
            hide_tx,
        }
    }

    /// Hides the popup if it is still the one the timer was started for.
    fn hide_popup(&mut self, id: u64) -> bool {
        match self.popup {
            Some((current, _)) if current == id => {
                self.popup = None;
                true
            }
            _ => false,
        }
    }
}

impl Highlighter for TerminalFrontend {
    fn set_highlight(&mut self, coord: Coord, highlight: Highlight) {
        self.highlights.insert(coord, highlight);
    }

    fn show_intent(&mut self, from: Coord, to: Coord) {
        self.intents.push((from, to));
    }

    fn clear_intents(&mut self) {
        self.intents.clear();
    }
}

impl Notifier for TerminalFrontend {
    fn notify(&mut self, notification: Notification) {
        self.popup_seq += 1;
        let id = self.popup_seq;
        self.popup = Some((id, notification.to_string()));

        let tx = self.hide_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(POPUP_DURATION).await;
            // The receiver is gone once the game loop has exited.
            let _ = tx.send(id);
        });
    }
}

fn highlight_color(highlight: Highlight) -> Color {
    match highlight {
        Highlight::Neutral => Color::White,
        Highlight::ValidStart | Highlight::PlayerMove => Color::Green,
        Highlight::EnemyMove => Color::Red,
    }
}

/// Redraws the whole screen from the engine's state.
fn draw<R: RandomSource>(engine: &Engine<TerminalFrontend, R>, status: &str) -> io::Result<()> {
    let mut out = io::stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    let ui = engine.frontend();

    let Some(board) = engine.board() else {
        writeln!(out, "No map loaded. Type 'restart' to try again.")?;
        writeln!(out, "{status}")?;
        return out.flush();
    };

    writeln!(out, "--- Kingstrike: {} ---", board.name())?;
    let rows = board.rows();
    for (y, cells) in &rows {
        write!(out, "{:>3} | ", y)?;
        for &(x, glyph) in cells {
            let color = ui
                .highlights
                .get(&Coord::new(x, *y))
                .copied()
                .map(highlight_color)
                .unwrap_or(Color::DarkGrey);
            write!(out, "{} ", glyph.with(color))?;
        }
        writeln!(out)?;
    }
    if let Some((_, cells)) = rows.first() {
        write!(out, "      ")?;
        for (x, _) in cells {
            write!(out, "{} ", x.rem_euclid(10))?;
        }
        writeln!(out)?;
    }

    if !ui.intents.is_empty() {
        let plans: Vec<String> = ui.intents.iter().map(|(from, to)| format!("{from} -> {to}")).collect();
        writeln!(out, "Enemy plans: {}", plans.join(", "))?;
    }
    match engine.outcome() {
        Some(GameOutcome::Won) => writeln!(out, "{}", "Checkmate! You Won".green().bold())?,
        Some(GameOutcome::Lost) => writeln!(out, "{}", "You Lost".red().bold())?,
        None => {}
    }
    if let Some((_, text)) = &ui.popup {
        writeln!(out, "{}", text.clone().yellow())?;
    }
    writeln!(out, "{status}")?;
    write!(out, "> ")?;
    out.flush()
}

/// Parses `x y` or `x,y`.
fn parse_coord(input: &str) -> Option<Coord> {
    let mut parts = input.split(|c: char| c == ',' || c.is_whitespace()).filter(|s| !s.is_empty());
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Coord::new(x, y))
}

fn prompt<R: RandomSource>(engine: &Engine<TerminalFrontend, R>) -> &'static str {
    if engine.outcome().is_some() {
        return "Type 'restart' for a new map or 'exit' to quit.";
    }
    match engine.state() {
        TurnState::PickingPosition => "Pick a start cell (s) as 'x y'.",
        _ => "Your move as 'x y'. 'restart' for a new map, 'exit' to quit.",
    }
}

/// Runs the game loop until stdin closes or the player types `exit`.
pub async fn run<R: RandomSource>(
    mut engine: Engine<TerminalFrontend, R>,
    mut hide_rx: mpsc::UnboundedReceiver<u64>,
) -> Result<()> {
    let mut status = match engine.restart() {
        Ok(()) => prompt(&engine).to_string(),
        Err(e) => format!("Could not load a map: {e}"),
    };
    draw(&engine, &status)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let input = line.trim();
                match input {
                    "exit" | "quit" => break,
                    "restart" | "r" => {
                        status = match engine.restart() {
                            Ok(()) => prompt(&engine).to_string(),
                            Err(e) => {
                                warn!(error = %e, "restart failed");
                                format!("Could not load a map: {e}")
                            }
                        };
                    }
                    _ => match parse_coord(input) {
                        Some(coord) => {
                            let result = engine.select_position(coord);
                            debug!(?result, "selection handled");
                            status = prompt(&engine).to_string();
                        }
                        None => status = format!("Unrecognised input '{input}'. {}", prompt(&engine)),
                    },
                }
            }
            Some(id) = hide_rx.recv() => {
                if !engine.frontend_mut().hide_popup(id) {
                    continue;
                }
            }
        }
        draw(&engine, &status)?;
    }
    Ok(())
}
