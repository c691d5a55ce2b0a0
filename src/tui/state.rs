// File: ./src/tui/state.rs
use crate::config::Config;
use crate::confetti::Confetti;
use crate::controller::{Controller, Effect};
use crate::model::{Child, ConnectionMode};
use crate::progress::{GOAL, ROW_SIZE};
use crate::tui::sprites::Sprites;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long a freshly added star stays highlighted.
pub const STAR_HIGHLIGHT: Duration = Duration::from_millis(600);
/// The "connected" banner hides itself; the offline one stays.
pub const REMOTE_BANNER: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct Banner {
    pub text: String,
    pub expires: Option<Instant>,
}

pub struct AppState {
    pub controller: Arc<Controller>,
    pub config: Config,
    pub mode: ConnectionMode,

    // Grid
    pub cursor: usize,
    pub highlights: Vec<(usize, Instant)>,

    // System
    pub banner: Option<Banner>,
    pub message: String,
    pub should_quit: bool,

    // Animation
    pub confetti: Confetti,
    pub sprites: Sprites,
    scheduled: Vec<(Instant, Effect)>,
}

impl AppState {
    pub fn new(controller: Arc<Controller>, config: Config, mode: ConnectionMode) -> Self {
        let now = Instant::now();
        let banner = match mode {
            ConnectionMode::Local => Some(Banner {
                text: "Offline mode: stars are kept on this machine only".to_string(),
                expires: None,
            }),
            ConnectionMode::Remote => Some(Banner {
                text: "Connected: syncing across devices".to_string(),
                expires: Some(now + REMOTE_BANNER),
            }),
            ConnectionMode::Initializing => None,
        };

        Self {
            controller,
            config,
            mode,
            cursor: 0,
            highlights: Vec::new(),
            banner,
            message: "Ready".to_string(),
            should_quit: false,
            confetti: Confetti::new(0.0, 0.0),
            sprites: Sprites::default(),
            scheduled: Vec::new(),
        }
    }

    pub fn child_name(&self, child: Child) -> &str {
        self.config.child_name(child)
    }

    /// Moves the grid cursor, clamped to the 10 × 6 grid.
    pub fn move_cursor(&mut self, rows: isize, cols: isize) {
        let row = (self.cursor / ROW_SIZE) as isize + rows;
        let col = (self.cursor % ROW_SIZE) as isize + cols;
        let max_row = (GOAL / ROW_SIZE) as isize - 1;
        let row = row.clamp(0, max_row) as usize;
        let col = col.clamp(0, ROW_SIZE as isize - 1) as usize;
        self.cursor = row * ROW_SIZE + col;
    }

    pub fn is_highlighted(&self, index: usize, now: Instant) -> bool {
        self.highlights.iter().any(|(i, until)| *i == index && *until > now)
    }

    /// Braille canvas resolution of the current terminal.
    pub fn resize_canvas(&mut self, width: f64, height: f64) {
        if self.confetti.size() != (width, height) {
            self.confetti.resize(width, height);
            self.sprites.resize(height);
        }
    }

    /// Per-frame housekeeping: play controller effects, fire delayed ones,
    /// expire highlights and banners, advance the confetti.
    pub fn tick(&mut self, now: Instant) {
        for effect in self.controller.drain_effects() {
            self.apply(effect, now);
        }

        let (due, later): (Vec<_>, Vec<_>) =
            self.scheduled.drain(..).partition(|(at, _)| *at <= now);
        self.scheduled = later;
        for (_, effect) in due {
            if let Effect::Celebrate { .. } = effect {
                self.controller.show_celebration();
                self.confetti.burst_large();
                self.message = "All 60 stars! Time to celebrate!".to_string();
            }
        }

        self.highlights.retain(|(_, until)| *until > now);
        if let Some(Banner {
            expires: Some(at), ..
        }) = &self.banner
            && *at <= now
        {
            self.banner = None;
        }

        self.confetti.frame(&mut self.sprites);
    }

    fn apply(&mut self, effect: Effect, now: Instant) {
        match effect {
            Effect::StarAdded { index } => {
                self.highlights.push((index, now + STAR_HIGHLIGHT));
                self.message = format!("Star {} added", index + 1);
            }
            Effect::StarRemoved => {
                self.message = "Star removed".to_string();
            }
            Effect::RowComplete => {
                self.confetti.burst_small();
                self.message = "Row complete!".to_string();
            }
            Effect::Celebrate { after } => {
                self.scheduled.push((now + after, effect));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{CELEBRATION_DELAY, Dialog};
    use crate::storage::LocalStorage;
    use crate::store::EventStore;

    fn state(dir: &tempfile::TempDir) -> AppState {
        let store = EventStore::new(None, LocalStorage::new(dir.path().join("stars.json")));
        let mut state = AppState::new(
            Controller::new(store),
            Config::default(),
            ConnectionMode::Local,
        );
        state.resize_canvas(200.0, 100.0);
        state
    }

    #[test]
    fn cursor_stays_on_the_grid() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(&dir);

        state.move_cursor(-1, -1);
        assert_eq!(state.cursor, 0);

        state.move_cursor(0, 10);
        assert_eq!(state.cursor, ROW_SIZE - 1);

        state.move_cursor(100, 0);
        assert_eq!(state.cursor, GOAL - 1);

        state.move_cursor(-1, -2);
        assert_eq!(state.cursor, GOAL - 1 - ROW_SIZE - 2);
    }

    #[test]
    fn offline_banner_sticks_and_connected_banner_expires() {
        let dir = tempfile::tempdir().unwrap();
        let mut offline = state(&dir);
        offline.tick(Instant::now() + Duration::from_secs(60));
        assert!(offline.banner.is_some());

        let store = EventStore::new(None, LocalStorage::new(dir.path().join("other.json")));
        let mut online = AppState::new(
            Controller::new(store),
            Config::default(),
            ConnectionMode::Remote,
        );
        online.tick(Instant::now() + REMOTE_BANNER + Duration::from_millis(1));
        assert!(online.banner.is_none());
    }

    #[test]
    fn new_star_highlight_fades() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(&dir);
        let now = Instant::now();

        state.apply(Effect::StarAdded { index: 4 }, now);
        assert!(state.is_highlighted(4, now));
        assert!(!state.is_highlighted(3, now));

        state.tick(now + STAR_HIGHLIGHT);
        assert!(!state.is_highlighted(4, now + STAR_HIGHLIGHT));
        assert!(state.highlights.is_empty());
    }

    #[test]
    fn row_complete_bursts_confetti() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(&dir);
        let now = Instant::now();

        state.apply(Effect::RowComplete, now);
        assert!(state.confetti.is_running());
        assert_eq!(state.confetti.particles().len(), crate::confetti::SMALL_BURST);

        state.tick(now);
        assert!(!state.sprites.is_empty());
    }

    #[test]
    fn celebration_waits_for_its_delay() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(&dir);
        let now = Instant::now();

        state.apply(
            Effect::Celebrate {
                after: CELEBRATION_DELAY,
            },
            now,
        );
        state.tick(now);
        assert_eq!(state.controller.snapshot().dialog, Dialog::None);
        assert!(!state.confetti.is_running());

        state.tick(now + CELEBRATION_DELAY);
        assert_eq!(state.controller.snapshot().dialog, Dialog::Celebration);
        assert!(state.confetti.is_running());
    }
}
