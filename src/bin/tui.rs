// File: ./src/bin/tui.rs
use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use starchart::config::Config;
use starchart::controller::Controller;
use starchart::logging;
use starchart::paths::AppPaths;
use starchart::storage::LocalStorage;
use starchart::store::EventStore;
use starchart::tui::action::Action;
use starchart::tui::input::handle_key;
use starchart::tui::state::AppState;
use starchart::tui::view::draw;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedSender};

// ~30 fps is plenty for confetti in a terminal.
const FRAME: Duration = Duration::from_millis(33);

#[tokio::main]
async fn main() -> Result<()> {
    let paths = AppPaths::resolve()?;
    let config = Config::load(&paths)?;
    if let Err(e) = logging::init_logging(&config.log_level, &paths.log_dir()) {
        eprintln!("Logging disabled: {e:#}");
    }

    // 1. Pick a backend and load what is there
    let store = EventStore::new(
        config.remote_credentials(),
        LocalStorage::new(paths.events_file()),
    );
    let mode = store.initialize().await;
    let controller = Controller::new(store.clone());
    let reloader = controller.attach();
    controller.load_data().await;

    // 2. Store work runs off the UI loop
    let action_tx = spawn_worker(controller.clone());

    // 3. Terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = AppState::new(controller, config, mode);
    let result = run(&mut terminal, &mut state, &action_tx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    store.stop_polling();
    reloader.abort();
    if let Err(e) = &result {
        error!("event=app_exit status=error error={e:#}");
    } else {
        info!("event=app_exit status=ok");
    }
    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    actions: &UnboundedSender<Action>,
) -> Result<()> {
    loop {
        let size = terminal.size()?;
        state.resize_canvas(size.width as f64 * 2.0, size.height as f64 * 4.0);
        state.tick(Instant::now());
        terminal.draw(|f| draw(f, state))?;

        if event::poll(FRAME)?
            && let Event::Key(key) = event::read()?
            && let Some(action) = handle_key(state, key)
        {
            let _ = actions.send(action);
        }

        if state.should_quit {
            return Ok(());
        }
    }
}

/// Each action gets its own task, so a slow remote call for one child does
/// not hold up the other; the controller guards against double toggles.
fn spawn_worker(controller: Arc<Controller>) -> UnboundedSender<Action> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
    tokio::spawn(async move {
        while let Some(action) = rx.recv().await {
            let controller = controller.clone();
            tokio::spawn(async move {
                match action {
                    Action::Toggle(child) => {
                        let outcome = controller.handle_toggle(child).await;
                        info!("event=toggle child={child} outcome={outcome:?}");
                    }
                    Action::ConfirmRemove => {
                        controller.confirm_remove().await;
                    }
                    Action::ConfirmReset => {
                        controller.confirm_reset().await;
                    }
                }
            });
        }
    });
    tx
}
