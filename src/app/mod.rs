//! Application state and event handling

pub mod bridge;
pub mod chat;
pub mod command;
pub mod edit;
pub mod events;
pub mod input;
pub mod navigation;
pub mod popup;
pub mod selection;
pub mod state;

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;

use crate::api::ApiClient;
use crate::config::Config;
use crate::config::session::Session;
use crate::curriculum::PdfDocument;
use crate::theme::Theme;
use crate::ui;
use chat::OutgoingChat;
use events::{AppEvent, Effect};
use popup::ClipboardError;
use state::{AppState, LoadStatus};

/// Capacity of the per-request chat event channel
const CHAT_CHANNEL_SIZE: usize = 64;

/// The main application
pub struct App {
    /// Application configuration
    config: Config,

    /// Current application state
    state: AppState,

    /// Persisted session, updated on exit
    session: Session,

    theme: Theme,
    client: ApiClient,

    /// Results from background tasks
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,

    /// Kept alive so clipboard contents survive on X11
    clipboard: Option<arboard::Clipboard>,

    /// Terminal backend
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        let client = ApiClient::new(&config.api_base_url, config.request_timeout())
            .context("Invalid API base URL")?;

        let session = Session::load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable session: {:#}", e);
            Session::default()
        });

        let mut state = AppState::new(&config);
        state.pending_restore = session.selection;
        state.lesson_width_percent = session.lesson_width();

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let theme = config.active_theme();
        let terminal = Self::setup_terminal(config.mouse_capture)?;

        Ok(Self {
            config,
            state,
            session,
            theme,
            client,
            events_tx,
            events_rx,
            clipboard: None,
            terminal,
        })
    }

    /// Set up the terminal for TUI rendering
    fn setup_terminal(mouse_capture: bool) -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        if mouse_capture {
            execute!(stdout, EnableMouseCapture)?;
        }
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore the terminal to its original state
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        if self.config.mouse_capture {
            execute!(self.terminal.backend_mut(), DisableMouseCapture)?;
        }
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Run the application main loop
    pub async fn run(&mut self) -> Result<()> {
        // Set up panic hook to restore terminal
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
            original_hook(panic_info);
        }));

        tracing::info!("Starting with backend {}", self.client.base_url());
        self.execute(Effect::FetchNavigation);

        'main: loop {
            self.state.tick();

            // Draw UI
            self.terminal.draw(|frame| {
                ui::draw(frame, &mut self.state, &self.theme);
            })?;

            // Results from background tasks
            while let Ok(app_event) = self.events_rx.try_recv() {
                let effects = self.state.handle_app_event(app_event);
                if self.apply(effects) {
                    break 'main;
                }
            }

            // Handle terminal events
            if event::poll(Duration::from_millis(16))? {
                let effects = match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.state.handle_key(key),
                    Event::Mouse(mouse) => self.state.handle_mouse(mouse),
                    _ => Vec::new(),
                };
                if self.apply(effects) {
                    break;
                }
            }
        }

        self.state.chat.cancel();
        self.save_session();
        self.restore_terminal()?;
        Ok(())
    }

    /// Execute effects, returns true if should exit
    fn apply(&mut self, effects: Vec<Effect>) -> bool {
        for effect in effects {
            if matches!(effect, Effect::Quit) {
                return true;
            }
            self.execute(effect);
        }
        false
    }

    fn execute(&mut self, effect: Effect) {
        let tx = self.events_tx.clone();

        match effect {
            Effect::Quit => {}
            Effect::FetchNavigation => {
                let client = self.client.clone();
                tokio::spawn(async move {
                    let result = client.fetch_navigation().await;
                    let _ = tx.send(AppEvent::NavigationLoaded(result));
                });
            }
            Effect::FetchPdf(subject_id) => {
                let client = self.client.clone();
                tokio::spawn(async move {
                    let result = client.fetch_pdf(subject_id).await;
                    let _ = tx.send(AppEvent::PdfLoaded { subject_id, result });
                });
            }
            Effect::DownloadPdf(doc) => {
                let dest = match Config::textbooks_dir() {
                    Ok(dir) => dir.join(textbook_file_name(&doc)),
                    Err(e) => {
                        tracing::error!("No data directory: {:#}", e);
                        self.state.command_line.set_error("تعذر تحديد مجلد الحفظ");
                        self.state.pdf = state::PdfState::Ready(doc);
                        return;
                    }
                };
                let client = self.client.clone();
                tokio::spawn(async move {
                    let result = client.download_pdf(&doc, &dest).await.map(|bytes| (dest, bytes));
                    let _ = tx.send(AppEvent::PdfDownloaded { doc, result });
                });
            }
            Effect::SendChat(OutgoingChat { seq, request, cancel }) => {
                let client = self.client.clone();
                tokio::spawn(async move {
                    let (chat_tx, mut chat_rx) = mpsc::channel(CHAT_CHANNEL_SIZE);
                    let forward = async {
                        while let Some(stream_event) = chat_rx.recv().await {
                            let _ = tx.send(AppEvent::Chat { seq, event: stream_event });
                        }
                    };
                    let (result, ()) = tokio::join!(client.send_chat(request, chat_tx, cancel), forward);
                    let _ = tx.send(AppEvent::ChatFinished { seq, result });
                });
            }
            Effect::Copy(text) => {
                let result = self.copy_to_clipboard(&text);
                self.state.popup.copy_finished(result, Instant::now());
            }
        }
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.clipboard.is_none() {
            self.clipboard =
                Some(arboard::Clipboard::new().map_err(|e| ClipboardError(e.to_string()))?);
        }
        match self.clipboard.as_mut() {
            Some(clipboard) => {
                clipboard.set_text(text.to_string()).map_err(|e| ClipboardError(e.to_string()))
            }
            None => Err(ClipboardError("not initialised".to_string())),
        }
    }

    fn save_session(&mut self) {
        if self.state.nav_status == LoadStatus::Ready {
            self.session.selection = Some(self.state.navigation.selection());
        }
        self.session.lesson_width_percent = self.state.lesson_width_percent;
        if let Err(e) = self.session.save() {
            tracing::error!("Failed to save session: {:#}", e);
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// File name for a downloaded textbook, derived from its title
pub fn textbook_file_name(doc: &PdfDocument) -> PathBuf {
    let stem: String = doc
        .title
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        PathBuf::from(format!("textbook-{}.pdf", doc.id))
    } else {
        PathBuf::from(format!("{}-{}.pdf", stem, doc.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(title: &str) -> PdfDocument {
        PdfDocument { id: 9, title: title.into(), url: "https://x/y.pdf".into(), subject_id: 1 }
    }

    #[test]
    fn file_name_keeps_arabic_letters() {
        assert_eq!(textbook_file_name(&doc("لغتي الجميلة")), PathBuf::from("لغتي_الجميلة-9.pdf"));
    }

    #[test]
    fn file_name_strips_path_separators() {
        let name = textbook_file_name(&doc("../../etc/passwd"));
        assert!(!name.to_string_lossy().contains('/'));
    }

    #[test]
    fn empty_title_falls_back_to_id() {
        assert_eq!(textbook_file_name(&doc("  ")), PathBuf::from("textbook-9.pdf"));
    }
}
