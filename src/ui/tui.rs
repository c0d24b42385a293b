//! Terminal setup and the main event loop.

use std::{
    io,
    time::{Duration, Instant},
};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::App;

/// How often the loop wakes up to pick up new spectrum frames.
const FRAME_TICK: Duration = Duration::from_millis(30);
/// How often the elapsed-time counter advances.
const CLOCK_TICK: Duration = Duration::from_secs(1);

/// Take over the terminal and run `app` until the user quits.
pub fn run(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let size = terminal.size()?;
    app.on_resize(size.width, size.height);
    info!("terminal {}x{}", size.width, size.height);

    let mut last_clock = Instant::now();
    let mut dirty = true;

    loop {
        if app.run_idle() {
            dirty = true;
        }
        if dirty {
            terminal.draw(|f| app.draw(f))?;
            dirty = false;
        }

        if event::poll(FRAME_TICK)? {
            match event::read()? {
                CEvent::Key(key) => {
                    if app.on_key(key) {
                        return Ok(());
                    }
                }
                CEvent::Mouse(mouse) => app.on_mouse(mouse),
                CEvent::Resize(width, height) => app.on_resize(width, height),
                _ => {}
            }
            dirty = true;
        }

        if last_clock.elapsed() >= CLOCK_TICK {
            last_clock = Instant::now();
            app.tick_elapsed();
            dirty = true;
        }
    }
}
