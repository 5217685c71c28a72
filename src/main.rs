//! gist-hooks: browse GitHub gists in the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌────────────┐ retrieve() ┌───────────────┐ state()  ┌──────────┐
//! │ source/    │ ◄───────── │ controller.rs │ ───────► │  ui.rs   │
//! │ (reqwest)  │   (tokio)  │ (FetchState)  │ (watch)  │ (render) │
//! └────────────┘            └───────────────┘          └──────────┘
//!                                  ▲ observe()/stop()
//!                            ┌──────────┐ handle_key_event() ┌──────────┐
//!                            │  app.rs  │ ◄───────────────── │ input.rs │
//!                            └──────────┘                    └──────────┘
//! ```
//!
//! * **`source/`**: the `Retrieve` trait, the HTTP implementation, and the
//!   `Gist` payload.
//! * **`controller`**: one cancellable retrieval per observed URL, exposed
//!   as an observable `{data, loading, error}` record.
//! * **`toggle`**: the accordion's open/closed flag.
//! * **`app`**: owns all application state (panels, accordions, focus).
//! * **`ui`**: pure rendering: reads `App` state and draws widgets.
//! * **`input`**: maps key events to `App` mutations.
//! * **`config`** / **`logging`**: flags, environment, and the log file.
//! * **`main`**: wires everything together: parse args, set up the terminal,
//!   and run the event loop.

mod app;
mod config;
mod controller;
mod input;
mod logging;
mod source;
mod toggle;
mod ui;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use app::App;
use config::Config;
use source::{Gist, HttpSource, Retrieve};

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // -- configuration & logging ---------------------------------------------
    let config = Config::parse().validate()?;
    logging::init(config.log_file.as_deref(), &config.log_level)?;

    // -- async runtime for retrievals ----------------------------------------
    // The UI loop stays on this thread; retrievals run on the runtime's
    // workers and publish through each controller's watch channel.
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let _enter = runtime.enter();

    let source: Arc<dyn Retrieve<Vec<Gist>>> = Arc::new(HttpSource::new(&config.user_agent)?);
    info!(api_base = %config.api_base, users = ?config.users, "starting");

    install_panic_hook();

    // -- terminal setup (Drop restores on exit or panic) ---------------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(
        config.api_base.clone(),
        config.users.clone(),
        source,
        runtime.handle().clone(),
    );

    // -- main event loop -----------------------------------------------------
    // Draw only when something changed since the last frame, then wait up to
    // one tick for input.
    let tick_rate = config.tick_rate();
    let mut dirty = true;

    loop {
        if app.take_updates() {
            dirty = true;
        }
        if dirty {
            guard.terminal.draw(|f| ui::draw(&mut app, f))?;
            dirty = false;
        }

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) => {
                    input::handle_key_event(&mut app, key);
                    dirty = true;
                }
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }

        if app.quit {
            break;
        }
    }

    // Dropping the app cancels every retrieval still in flight.
    drop(app);
    info!("exiting");
    Ok(())
}
