//! Collaborator interfaces between the engine and whatever presents the game.
//!
//! The engine only ever pushes into these; it never reads display state back.

use crate::constants::Highlight;
use crate::coord::Coord;
use std::collections::HashMap;
use std::fmt;

/// Messages the engine raises for the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    InvalidPosition,
    InvalidMove,
    PieceCaptured(String),
    GameOver { won: bool },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Notification::InvalidPosition => write!(f, "Invalid Position"),
            Notification::InvalidMove => write!(f, "Invalid Move"),
            Notification::PieceCaptured(name) => write!(f, "{name} Taken"),
            Notification::GameOver { won: true } => write!(f, "Checkmate! You Won"),
            Notification::GameOver { won: false } => write!(f, "You Lost"),
        }
    }
}

pub trait Highlighter {
    fn set_highlight(&mut self, coord: Coord, highlight: Highlight);

    /// A planned enemy move, shown before the player commits.
    fn show_intent(&mut self, _from: Coord, _to: Coord) {}

    fn clear_intents(&mut self) {}
}

pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

/// Anything that can both paint cells and show notifications.
pub trait Frontend: Highlighter + Notifier {}

impl<T: Highlighter + Notifier + ?Sized> Frontend for T {}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFrontend;

impl Highlighter for NullFrontend {
    fn set_highlight(&mut self, _coord: Coord, _highlight: Highlight) {}
}

impl Notifier for NullFrontend {
    fn notify(&mut self, _notification: Notification) {}
}

/// Keeps the latest highlight per cell and every notification, for headless
/// runs and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingFrontend {
    pub highlights: HashMap<Coord, Highlight>,
    pub highlight_calls: usize,
    pub intents: Vec<(Coord, Coord)>,
    pub notifications: Vec<Notification>,
}

impl RecordingFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlight(&self, coord: Coord) -> Option<Highlight> {
        self.highlights.get(&coord).copied()
    }

    pub fn last_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }
}

impl Highlighter for RecordingFrontend {
    fn set_highlight(&mut self, coord: Coord, highlight: Highlight) {
        self.highlight_calls += 1;
        self.highlights.insert(coord, highlight);
    }

    fn show_intent(&mut self, from: Coord, to: Coord) {
        self.intents.push((from, to));
    }

    fn clear_intents(&mut self) {
        self.intents.clear();
    }
}

impl Notifier for RecordingFrontend {
    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}
