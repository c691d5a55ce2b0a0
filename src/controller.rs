// File: ./src/controller.rs
// Turns store data into view state and user actions into store calls.
use crate::model::{Child, StarEvent};
use crate::progress::{self, Milestones, Progress};
use crate::store::EventStore;
use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Text the user must type, exactly, before a reset goes through.
pub const RESET_SENTINEL: &str = "RESET";
/// Delay before the final celebration so a simultaneous row effect reads separately.
pub const CELEBRATION_DELAY: Duration = Duration::from_millis(500);

/// Side effects for the front-end to play. Drained with `drain_effects`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Highlight the slot that was just filled.
    StarAdded { index: usize },
    StarRemoved,
    /// A row of six was completed: small confetti burst.
    RowComplete,
    /// The chart is full: open the celebration and fire a large burst after `after`.
    Celebrate { after: Duration },
}

/// The confirmation flow currently on screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Dialog {
    #[default]
    None,
    Remove {
        id: i64,
    },
    Reset {
        input: String,
    },
    Celebration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// A toggle for this child is still running; nothing was done.
    InFlight,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub events: Vec<StarEvent>,
    pub dialog: Dialog,
    /// At least one load has completed.
    pub loaded: bool,
}

pub type TodayFn = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

pub struct Controller {
    store: Arc<EventStore>,
    today: TodayFn,
    view: Mutex<ViewState>,
    // Busy flag for load cycles. `load_data` drops when taken, toggles wait.
    loading: tokio::sync::Mutex<()>,
    toggling: [AtomicBool; 2],
    effects: Mutex<VecDeque<Effect>>,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Controller {
    pub fn new(store: Arc<EventStore>) -> Arc<Self> {
        Self::with_clock(store, Arc::new(progress::household_today))
    }

    pub fn with_clock(store: Arc<EventStore>, today: TodayFn) -> Arc<Self> {
        Arc::new(Self {
            store,
            today,
            view: Mutex::new(ViewState::default()),
            loading: tokio::sync::Mutex::new(()),
            toggling: [AtomicBool::new(false), AtomicBool::new(false)],
            effects: Mutex::new(VecDeque::new()),
        })
    }

    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    /// Reloads on every store notification. The listener only signals a
    /// channel; the spawned task does the loading.
    pub fn attach(self: &Arc<Self>) -> JoinHandle<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        self.store.on_change(move || {
            let _ = tx.send(());
        });

        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                // Coalesce a burst of notifications into one load.
                while rx.try_recv().is_ok() {}
                let Some(controller) = weak.upgrade() else { break };
                controller.load_data().await;
            }
        })
    }

    fn view(&self) -> MutexGuard<'_, ViewState> {
        self.view.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, effect: Effect) {
        self.effects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(effect);
    }

    pub fn drain_effects(&self) -> Vec<Effect> {
        self.effects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect()
    }

    // --- LOADING ---

    /// Fetches everything and re-derives view state. Dropped (returns
    /// `false`) if another load is running. A failed fetch keeps the old cache.
    pub async fn load_data(&self) -> bool {
        let Ok(_busy) = self.loading.try_lock() else {
            debug!("event=load_skipped reason=busy");
            return false;
        };
        self.fetch().await;
        true
    }

    /// Like `load_data` but waits for a running load instead of dropping.
    async fn refresh(&self) -> Option<usize> {
        let _busy = self.loading.lock().await;
        self.fetch().await
    }

    async fn fetch(&self) -> Option<usize> {
        match self.store.get_events().await {
            Ok(served) => {
                let mut view = self.view();
                view.events = served.value;
                view.loaded = true;
                Some(view.events.len())
            }
            Err(e) => {
                warn!("event=load_failed error={e}");
                None
            }
        }
    }

    // --- DERIVED STATE ---

    pub fn snapshot(&self) -> ViewState {
        self.view().clone()
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }

    pub fn total(&self) -> usize {
        self.view().events.len()
    }

    pub fn progress(&self) -> Progress {
        Progress::of(self.total())
    }

    pub fn has_star_today(&self, child: Child) -> bool {
        let today = self.today();
        self.view().events.iter().any(|e| e.is_for(child, today))
    }

    pub fn is_toggle_disabled(&self, child: Child) -> bool {
        self.toggling[child.index()].load(Ordering::SeqCst)
    }

    // --- ACTIONS ---

    /// Adds today's star for `child`, or removes it if one is already there.
    pub async fn handle_toggle(&self, child: Child) -> ToggleOutcome {
        let flag = &self.toggling[child.index()];
        if flag.swap(true, Ordering::SeqCst) {
            return ToggleOutcome::InFlight;
        }
        let _in_flight = InFlight(flag);

        let today = self.today();
        let (existing, previous_total) = {
            let view = self.view();
            let existing = view
                .events
                .iter()
                .find(|e| e.is_for(child, today))
                .map(|e| e.id);
            (existing, view.events.len())
        };

        match existing {
            Some(id) => {
                let outcome = match self.store.remove_event(id).await {
                    Ok(_) => {
                        self.emit(Effect::StarRemoved);
                        ToggleOutcome::Removed
                    }
                    Err(e) => {
                        warn!("event=toggle_failed child={child} action=remove error={e}");
                        ToggleOutcome::Failed
                    }
                };
                self.refresh().await;
                outcome
            }
            None => match self.store.add_event(child, today).await {
                // The re-fetch doubles as the milestone check.
                Ok(_) => {
                    if let Some(new_total) = self.refresh().await
                        && new_total > previous_total
                    {
                        self.emit(Effect::StarAdded {
                            index: new_total - 1,
                        });
                        self.celebrate(Milestones::between(previous_total, new_total));
                    }
                    ToggleOutcome::Added
                }
                Err(e) => {
                    warn!("event=toggle_failed child={child} action=add error={e}");
                    self.refresh().await;
                    ToggleOutcome::Failed
                }
            },
        }
    }

    fn celebrate(&self, milestones: Milestones) {
        if milestones.row {
            self.emit(Effect::RowComplete);
        }
        if milestones.finished {
            self.emit(Effect::Celebrate {
                after: CELEBRATION_DELAY,
            });
        }
    }

    /// Selecting a filled slot opens the removal confirmation.
    pub fn request_remove(&self, index: usize) -> bool {
        let mut view = self.view();
        match view.events.get(index).map(|e| e.id) {
            Some(id) => {
                view.dialog = Dialog::Remove { id };
                true
            }
            None => false,
        }
    }

    pub fn cancel_remove(&self) {
        let mut view = self.view();
        if matches!(view.dialog, Dialog::Remove { .. }) {
            view.dialog = Dialog::None;
        }
    }

    /// Removes the pending star. The dialog closes whether or not it worked.
    pub async fn confirm_remove(&self) -> bool {
        let Dialog::Remove { id } = self.view().dialog.clone() else {
            return false;
        };

        let removed = match self.store.remove_event(id).await {
            Ok(_) => {
                self.emit(Effect::StarRemoved);
                self.refresh().await;
                true
            }
            Err(e) => {
                warn!("event=remove_failed id={id} error={e}");
                false
            }
        };

        let mut view = self.view();
        if view.dialog == (Dialog::Remove { id }) {
            view.dialog = Dialog::None;
        }
        removed
    }

    pub fn open_reset(&self) {
        self.view().dialog = Dialog::Reset {
            input: String::new(),
        };
    }

    pub fn set_reset_input(&self, text: &str) {
        if let Dialog::Reset { input } = &mut self.view().dialog {
            *input = text.to_string();
        }
    }

    pub fn push_reset_char(&self, c: char) {
        if let Dialog::Reset { input } = &mut self.view().dialog {
            input.push(c);
        }
    }

    pub fn pop_reset_char(&self) {
        if let Dialog::Reset { input } = &mut self.view().dialog {
            input.pop();
        }
    }

    /// Exact, case-sensitive match; no trimming.
    pub fn reset_input_valid(&self) -> bool {
        matches!(&self.view().dialog, Dialog::Reset { input } if input == RESET_SENTINEL)
    }

    pub fn cancel_reset(&self) {
        let mut view = self.view();
        if matches!(view.dialog, Dialog::Reset { .. }) {
            view.dialog = Dialog::None;
        }
    }

    /// Wipes every star once the sentinel is typed. On failure the dialog stays open.
    pub async fn confirm_reset(&self) -> bool {
        if !self.reset_input_valid() {
            return false;
        }
        match self.store.reset_all().await {
            Ok(_) => {
                self.refresh().await;
                self.cancel_reset();
                true
            }
            Err(e) => {
                warn!("event=reset_failed error={e}");
                false
            }
        }
    }

    pub fn show_celebration(&self) {
        self.view().dialog = Dialog::Celebration;
    }

    pub fn close_celebration(&self) {
        let mut view = self.view();
        if view.dialog == Dialog::Celebration {
            view.dialog = Dialog::None;
        }
    }
}
