use std::io::{self, Stderr};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEvent, KeyEventKind, MouseEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Drives the thinking animation, reply polling and copy feedback expiry
pub const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// The next draw picks up the new size
    Resize,
    Tick,
}

impl AppEvent {
    /// Key releases and focus/paste events are not used
    fn from_terminal(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
            Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
            Event::Resize(_, _) => Some(AppEvent::Resize),
            _ => None,
        }
    }
}

pub struct EventHandler {
    rx: UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        spawn_terminal_reader(tx.clone());
        spawn_ticker(tx);
        Self { rx }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

fn spawn_terminal_reader(tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut stream = EventStream::new();
        while let Some(result) = stream.next().await {
            let event = match result {
                Ok(event) => event,
                Err(e) => {
                    warn!("terminal event error: {}", e);
                    continue;
                }
            };
            let Some(app_event) = AppEvent::from_terminal(event) else {
                continue;
            };
            if tx.send(app_event).is_err() {
                debug!("event receiver dropped, stopping terminal reader");
                break;
            }
        }
    });
}

fn spawn_ticker(tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_RATE);
        loop {
            interval.tick().await;
            if tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });
}

pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(io::stderr()))?)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Put the terminal back before the panic message is printed
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore();
        previous(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    #[test]
    fn only_key_presses_are_forwarded() {
        let press = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(matches!(
            AppEvent::from_terminal(Event::Key(press)),
            Some(AppEvent::Key(_))
        ));

        let release = KeyEvent {
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
            ..press
        };
        assert!(AppEvent::from_terminal(Event::Key(release)).is_none());
        assert!(AppEvent::from_terminal(Event::FocusGained).is_none());
    }

    #[test]
    fn resize_carries_no_payload() {
        assert!(matches!(
            AppEvent::from_terminal(Event::Resize(120, 40)),
            Some(AppEvent::Resize)
        ));
    }
}
