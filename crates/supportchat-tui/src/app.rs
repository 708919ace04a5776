use std::path::Path;

use ratatui::widgets::ListState;
use supportchat_core::state::announcement;
use supportchat_core::{
    AgentConfig, ChatController, ChatOutcome, ChatRole, Config, InputHistory, StagedAttachment,
    SupportClient, Theme,
};
use tokio::task::JoinHandle;

/// Shown on the welcome panel until the first message is sent.
pub const SUGGESTED_QUESTIONS: &[&str] = &[
    "Where is my order?",
    "What is your return policy?",
    "I have a billing question",
    "I need technical support",
];

/// Ticks (250ms each) an announcement stays on the status line.
const ANNOUNCEMENT_TICKS: u8 = 4;
/// Ticks the input border stays red after a failed turn.
const ERROR_FLASH_TICKS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Suggestions,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    pub should_quit: bool,
    pub focus: Focus,

    // Conversation
    pub controller: ChatController,
    pub client: SupportClient,
    pub chat_task: Option<JoinHandle<ChatOutcome>>,
    pub agent: AgentConfig,

    // Input box
    pub input: String,
    pub input_cursor: usize, // cursor position in chars
    pub history: InputHistory,
    pub attachment: Option<StagedAttachment>,

    // Chrome
    pub theme: Theme,
    pub persist_theme: bool,
    pub show_welcome: bool,
    pub suggestion_state: ListState,
    pub animation_frame: u8, // 0-2 for the typing dots
    pub announcement: Option<(String, u8)>,
    pub error_flash: u8,
    pub status: Option<String>,

    // Chat scrolling; height is updated during render
    pub chat_scroll: usize,
    pub follow_bottom: bool,
    pub chat_height: usize,
}

impl App {
    pub fn new(client: SupportClient, agent: AgentConfig, theme: Theme) -> Self {
        let mut suggestion_state = ListState::default();
        suggestion_state.select(Some(0));

        Self {
            should_quit: false,
            focus: Focus::Input,
            controller: ChatController::new(),
            client,
            chat_task: None,
            agent,
            input: String::new(),
            input_cursor: 0,
            history: InputHistory::new(),
            attachment: None,
            theme,
            persist_theme: true,
            show_welcome: true,
            suggestion_state,
            animation_frame: 0,
            announcement: None,
            error_flash: 0,
            status: None,
            chat_scroll: 0,
            follow_bottom: true,
            chat_height: 0,
        }
    }

    /// The input box is disabled while a reply is outstanding
    pub fn input_enabled(&self) -> bool {
        !self.controller.is_pending()
    }

    /// Enter in the input box: run a slash command or send the text.
    pub fn submit_input(&mut self) {
        if !self.input_enabled() {
            return;
        }

        let text = self.input.trim().to_string();
        if let Some(path) = text.strip_prefix("/attach ") {
            self.attach(Path::new(path.trim()));
            self.clear_input();
            return;
        }
        if text == "/detach" {
            self.detach();
            self.clear_input();
            return;
        }

        let input = self.input.clone();
        if self.submit_text(&input) {
            self.clear_input();
        }
    }

    /// Start a chat turn on a background task. Returns false if the
    /// controller rejected the text (blank, or a reply is still pending).
    pub fn submit_text(&mut self, text: &str) -> bool {
        let Some(request) = self.controller.begin(text) else {
            return false;
        };

        self.history.record(&request.message);
        self.show_welcome = false;
        self.focus = Focus::Input;
        self.status = None;
        self.announce(ChatRole::User, &request.message);
        self.follow_bottom = true;

        let client = self.client.clone();
        self.chat_task = Some(tokio::spawn(async move {
            ChatOutcome::from(client.chat(&request).await)
        }));
        true
    }

    pub fn submit_selected_suggestion(&mut self) {
        let Some(idx) = self.suggestion_state.selected() else {
            return;
        };
        if let Some(question) = SUGGESTED_QUESTIONS.get(idx) {
            self.submit_text(question);
        }
    }

    /// Apply the outcome of the in-flight request once its task is done.
    pub async fn poll_response(&mut self) {
        let finished = self
            .chat_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }
        let Some(task) = self.chat_task.take() else {
            return;
        };

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => ChatOutcome::TransportError(e.to_string()),
        };

        if let Some(settlement) = self.controller.settle(outcome) {
            if settlement.is_error() {
                self.error_flash = ERROR_FLASH_TICKS;
            }
            if let Some(reply) = self.controller.last_reply() {
                let reply = reply.content.clone();
                self.announce(ChatRole::Agent, &reply);
            }
            self.focus = Focus::Input;
            self.follow_bottom = true;
        }
    }

    pub fn tick(&mut self) {
        if self.controller.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        let expired = match &mut self.announcement {
            Some((_, ticks)) => {
                *ticks = ticks.saturating_sub(1);
                *ticks == 0
            }
            None => false,
        };
        if expired {
            self.announcement = None;
        }
        self.error_flash = self.error_flash.saturating_sub(1);
    }

    fn announce(&mut self, role: ChatRole, content: &str) {
        self.announcement = Some((announcement(role, content), ANNOUNCEMENT_TICKS));
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        tracing::debug!(theme = self.theme.as_str(), "theme toggled");
        if self.persist_theme {
            if let Err(e) = Config::save_theme(self.theme) {
                tracing::warn!(error = %e, "could not save theme preference");
            }
        }
    }

    pub fn attach(&mut self, path: &Path) {
        match StagedAttachment::stage(path) {
            Ok(staged) => {
                self.status = Some(format!("Attached {} ({})", staged.name, staged.size_label()));
                self.attachment = Some(staged);
            }
            Err(e) => {
                self.status = Some(format!("Could not attach {}: {}", path.display(), e));
            }
        }
    }

    pub fn detach(&mut self) {
        if self.attachment.take().is_some() {
            self.status = Some("Attachment removed".to_string());
        }
    }

    // Input editing

    fn clear_input(&mut self) {
        self.input.clear();
        self.input_cursor = 0;
    }

    fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
        self.input_cursor = self.input.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
        self.input.insert(byte_pos, c);
        self.input_cursor += 1;
        self.history.reset();
    }

    pub fn insert_str(&mut self, text: &str) {
        let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
        self.input.insert_str(byte_pos, text);
        self.input_cursor += text.chars().count();
        self.history.reset();
    }

    pub fn backspace(&mut self) {
        if self.input_cursor > 0 {
            self.input_cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
            self.input.remove(byte_pos);
        }
        self.history.reset();
    }

    pub fn delete(&mut self) {
        if self.input_cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
            self.input.remove(byte_pos);
        }
        self.history.reset();
    }

    pub fn cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.input_cursor = (self.input_cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.input_cursor = self.input.chars().count();
    }

    pub fn recall_older(&mut self) {
        if let Some(text) = self.history.older(&self.input).map(str::to_string) {
            self.set_input(&text);
        }
    }

    pub fn recall_newer(&mut self) {
        if let Some(text) = self.history.newer().map(str::to_string) {
            self.set_input(&text);
        }
    }

    // Suggestions and scrolling

    pub fn suggestion_next(&mut self) {
        let i = self.suggestion_state.selected().unwrap_or(0);
        self.suggestion_state
            .select(Some((i + 1) % SUGGESTED_QUESTIONS.len()));
    }

    pub fn suggestion_prev(&mut self) {
        let i = self.suggestion_state.selected().unwrap_or(0);
        let prev = if i == 0 { SUGGESTED_QUESTIONS.len() - 1 } else { i - 1 };
        self.suggestion_state.select(Some(prev));
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.follow_bottom = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use supportchat_core::controller::TRANSPORT_ERROR_MESSAGE;
    use tempfile::TempDir;

    fn dead_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    fn test_app() -> App {
        let mut app = App::new(
            SupportClient::new(&dead_url()),
            AgentConfig::default(),
            Theme::Light,
        );
        app.persist_theme = false;
        app
    }

    async fn wait_until_settled(app: &mut App) {
        tokio::time::timeout(Duration::from_secs(10), async {
            while app.controller.is_pending() {
                app.poll_response().await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("request should settle");
    }

    #[tokio::test]
    async fn test_failed_turn_releases_input() {
        let mut app = test_app();
        app.insert_str("Where is my order?");
        app.submit_input();

        assert!(!app.input_enabled());
        assert!(app.input.is_empty());
        assert!(!app.show_welcome);
        assert_eq!(app.controller.log().len(), 1);

        wait_until_settled(&mut app).await;

        assert!(app.input_enabled());
        assert!(app.chat_task.is_none());
        assert_eq!(app.focus, Focus::Input);
        assert_eq!(app.controller.log().len(), 2);
        assert_eq!(
            app.controller.last_reply().unwrap().content,
            TRANSPORT_ERROR_MESSAGE
        );
        assert_eq!(app.error_flash, ERROR_FLASH_TICKS);
    }

    #[tokio::test]
    async fn test_input_kept_while_pending() {
        let mut app = test_app();
        assert!(app.submit_text("first"));

        app.input = "second".to_string();
        app.submit_input();

        assert_eq!(app.input, "second");
        assert_eq!(app.controller.log().len(), 1);
        assert!(!app.submit_text("third"));

        wait_until_settled(&mut app).await;
    }

    #[tokio::test]
    async fn test_blank_input_does_nothing() {
        let mut app = test_app();
        app.insert_str("   ");
        app.submit_input();

        assert!(app.input_enabled());
        assert!(app.chat_task.is_none());
        assert!(app.controller.log().is_empty());
        assert!(app.show_welcome);
    }

    #[tokio::test]
    async fn test_suggestion_submits_question() {
        let mut app = test_app();
        app.suggestion_next();
        app.submit_selected_suggestion();

        assert_eq!(
            app.controller.log().entries()[0].content,
            SUGGESTED_QUESTIONS[1]
        );
        wait_until_settled(&mut app).await;
    }

    #[test]
    fn test_attach_and_detach() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("invoice.pdf");
        std::fs::write(&path, vec![0u8; 1536]).unwrap();

        let mut app = test_app();
        app.insert_str(&format!("/attach {}", path.display()));
        app.submit_input();

        let staged = app.attachment.as_ref().unwrap();
        assert_eq!(staged.name, "invoice.pdf");
        assert_eq!(app.status.as_deref(), Some("Attached invoice.pdf (1.5 KB)"));
        assert!(app.input.is_empty());
        assert!(app.controller.log().is_empty());

        app.insert_str("/detach");
        app.submit_input();
        assert!(app.attachment.is_none());
    }

    #[test]
    fn test_attach_missing_file_reports() {
        let mut app = test_app();
        app.attach(Path::new("/definitely/not/here.png"));
        assert!(app.attachment.is_none());
        assert!(app.status.unwrap().starts_with("Could not attach"));
    }

    #[test]
    fn test_editing_multibyte() {
        let mut app = test_app();
        app.insert_str("héllo");
        app.cursor_left();
        app.backspace();
        assert_eq!(app.input, "hélo");
        app.cursor_home();
        app.delete();
        assert_eq!(app.input, "élo");
        app.cursor_end();
        app.insert_char('!');
        assert_eq!(app.input, "élo!");
    }

    #[tokio::test]
    async fn test_recall_sent_messages() {
        let mut app = test_app();
        app.submit_text("track order 42");
        wait_until_settled(&mut app).await;

        app.recall_older();
        assert_eq!(app.input, "track order 42");
        assert_eq!(app.input_cursor, 14);
        app.recall_newer();
        assert_eq!(app.input, "");
    }

    #[test]
    fn test_tick_expires_announcement() {
        let mut app = test_app();
        app.announce(ChatRole::Agent, "hello");
        assert_eq!(app.announcement.as_ref().unwrap().0, "Agent said: hello");
        for _ in 0..ANNOUNCEMENT_TICKS {
            app.tick();
        }
        assert!(app.announcement.is_none());
    }

    #[test]
    fn test_toggle_theme() {
        let mut app = test_app();
        app.toggle_theme();
        assert_eq!(app.theme, Theme::Dark);
        app.toggle_theme();
        assert_eq!(app.theme, Theme::Light);
    }

    #[test]
    fn test_suggestion_wraps() {
        let mut app = test_app();
        app.suggestion_prev();
        assert_eq!(
            app.suggestion_state.selected(),
            Some(SUGGESTED_QUESTIONS.len() - 1)
        );
        app.suggestion_next();
        assert_eq!(app.suggestion_state.selected(), Some(0));
    }
}
