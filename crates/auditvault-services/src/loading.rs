//! Loading overlay state driven by real operation completion.
//!
//! [`LoadingTracker::start`] hands out a [`LoadingGuard`]; the overlay stays
//! visible while at least one guard is alive and hides when the last one is
//! dropped. There is no minimum display timer.

use std::sync::Arc;

use tokio::sync::watch;

pub const DEFAULT_LINES: [&str; 4] = [
    "> INITIALIZING SYSTEM...",
    "> LOADING ESSENTIAL MODULES...",
    "> PROCESSING DATA...",
    "> READY.",
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadingState {
    pub visible: bool,
    pub lines: Vec<String>,
    active: usize,
}

impl LoadingState {
    pub fn active_operations(&self) -> usize {
        self.active
    }
}

#[derive(Debug, Clone)]
pub struct LoadingTracker {
    tx: Arc<watch::Sender<LoadingState>>,
}

impl Default for LoadingTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(LoadingState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Show the overlay with `lines`, or the default lines when `None`.
    pub fn start(&self, lines: Option<Vec<String>>) -> LoadingGuard {
        let lines =
            lines.unwrap_or_else(|| DEFAULT_LINES.iter().map(|l| l.to_string()).collect());
        self.tx.send_modify(|state| {
            state.active += 1;
            state.visible = true;
            state.lines = lines;
        });
        LoadingGuard {
            tx: Arc::clone(&self.tx),
        }
    }

    pub fn current(&self) -> LoadingState {
        self.tx.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.tx.borrow().visible
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadingState> {
        self.tx.subscribe()
    }
}

/// Keeps the overlay visible until dropped.
#[derive(Debug)]
pub struct LoadingGuard {
    tx: Arc<watch::Sender<LoadingState>>,
}

impl LoadingGuard {
    /// Replace the displayed lines while the operation runs.
    pub fn set_lines(&self, lines: Vec<String>) {
        self.tx.send_modify(|state| state.lines = lines);
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.tx.send_modify(|state| {
            state.active = state.active.saturating_sub(1);
            if state.active == 0 {
                state.visible = false;
            }
        });
    }
}
