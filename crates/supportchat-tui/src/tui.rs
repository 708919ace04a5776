use std::io::{self, Stderr};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, EventStream, KeyEvent, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Drives the typing indicator and lets the loop notice finished requests.
const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub enum ChatEvent {
    Key(KeyEvent),
    Paste(String),
    ScrollUp,
    ScrollDown,
    Tick,
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<ChatEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let tx_input = tx.clone();
        tokio::spawn(async move {
            let mut reader = EventStream::new();
            while let Some(Ok(evt)) = reader.next().await {
                let chat_event = match evt {
                    // Only presses; release/repeat events would double-type
                    Event::Key(key) if key.kind == KeyEventKind::Press => Some(ChatEvent::Key(key)),
                    Event::Paste(text) => Some(ChatEvent::Paste(text)),
                    Event::Mouse(mouse) => match mouse.kind {
                        MouseEventKind::ScrollUp => Some(ChatEvent::ScrollUp),
                        MouseEventKind::ScrollDown => Some(ChatEvent::ScrollDown),
                        _ => None,
                    },
                    _ => None,
                };

                if let Some(event) = chat_event {
                    if tx_input.send(event).is_err() {
                        break;
                    }
                }
            }
        });

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_RATE);
            loop {
                interval.tick().await;
                if tx.send(ChatEvent::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }

    pub async fn next(&mut self) -> Option<ChatEvent> {
        self.rx.recv().await
    }
}

pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(
        io::stderr(),
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;

    let terminal = Terminal::new(CrosstermBackend::new(io::stderr()))?;
    Ok(terminal)
}

pub fn restore() -> Result<()> {
    execute!(
        io::stderr(),
        DisableBracketedPaste,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    disable_raw_mode()?;
    Ok(())
}

/// Put the terminal back before the default hook prints the panic
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}
