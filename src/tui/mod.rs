//! Terminal UI for akin

mod app;
mod ui;
mod worker;

use crate::cli::GameArgs;
use akin::Backend;
use anyhow::Result;
use app::{Action, App};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

/// Log file used while the screen belongs to the UI.
const LOG_FILE: &str = "akin_tui.log";

/// Run the TUI
pub async fn run_tui(backend: Backend, args: GameArgs) -> Result<()> {
    // Setup logging to file to avoid interfering with TUI
    let log_file = std::fs::File::create(LOG_FILE)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!(language = %args.language, "Starting akin TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let (verbs, mut replies) = worker::spawn(move || backend.engine());
    let res = run_app(&mut terminal, App::new(args.language, args.debug), &verbs, &mut replies).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "TUI loop error");
    }
    res
}

#[instrument(skip_all)]
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    verbs: &mpsc::UnboundedSender<app::Verb>,
    replies: &mut mpsc::UnboundedReceiver<app::Reply>,
) -> Result<()> {
    let first = app.initial_verb();
    app.begin(&first);
    verbs.send(first)?;

    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        while let Ok(reply) = replies.try_recv() {
            if let Some(follow_up) = app.apply(reply, Instant::now()) {
                app.begin(&follow_up);
                verbs.send(follow_up)?;
            }
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.handle_key(key.code) {
                    Some(Action::Quit) => {
                        info!("User quit");
                        return Ok(());
                    }
                    Some(Action::Send(verb)) => {
                        debug!(?verb, "Key mapped to verb");
                        app.begin(&verb);
                        verbs.send(verb)?;
                    }
                    None => {}
                }
            }
        }
    }
}
