//! Terminal departure board: pick a station and direction, watch the
//! countdown to the next metro departure tick down once per second.

mod app;
mod input;
mod ui;

use std::{env, io, time::Duration as StdDuration};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use peron_core::ports::ScheduleSource;
use peron_provider_ekb as ekb;
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;

use crate::app::App;
use crate::input::Action;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // HTTP + source setup; the schedule location may be overridden by the
    // first argument (a URL or a file path).
    let client = Client::builder().user_agent("peron/0.1").build()?;
    let source = ekb::source(client, env::args().nth(1));

    // App state
    let app = App::new();

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app, &source).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    source: &dyn ScheduleSource,
) -> Result<()> {
    // One-shot schedule load. A loading frame goes up first; a failure is
    // terminal for the session but the UI shell keeps running.
    app.is_loading = true;
    terminal.draw(|frame| ui::draw(frame, &app))?;

    match source.load().await {
        Ok(timetable) if timetable.is_empty() => {
            app.fail_load(format!(
                "Schedule at {} contains no stations",
                source.location()
            ));
        }
        Ok(timetable) => app.set_timetable(timetable),
        Err(err) => app.fail_load(format!("Failed to load {}: {err}", source.location())),
    }
    app.is_loading = false;

    loop {
        // Each frame recomputes clock, day-type, and departure, so the
        // poll timeout doubles as the countdown tick.
        terminal.draw(|frame| ui::draw(frame, &app))?;

        if event::poll(StdDuration::from_millis(250))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
            }
        }
    }

    Ok(())
}
