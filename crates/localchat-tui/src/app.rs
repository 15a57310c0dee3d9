use std::path::PathBuf;

use localchat_core::{
    ChatSession, Completion, Config, ConversationStore, Dispatcher, Submission, ThemeMode,
};
use ratatui::{
    text::Line,
    widgets::{ListState, Paragraph, Wrap},
};
use tracing::{info, warn};

use crate::theme::Theme;

/// What to do once the save prompt has been answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterSave {
    Nothing,
    NewConversation,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popup {
    None,
    Menu,
    ConfirmSave { then: AfterSave },
    TitlePrompt { then: AfterSave },
    Browser { files: Vec<String> },
    Notice { title: String, message: String, is_error: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    NewConversation,
    SaveConversation,
    LoadConversation,
    ToggleTheme,
    AboutOllama,
    Quit,
}

impl MenuAction {
    pub fn all() -> [MenuAction; 6] {
        [
            MenuAction::NewConversation,
            MenuAction::SaveConversation,
            MenuAction::LoadConversation,
            MenuAction::ToggleTheme,
            MenuAction::AboutOllama,
            MenuAction::Quit,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::NewConversation => "New conversation",
            MenuAction::SaveConversation => "Save conversation",
            MenuAction::LoadConversation => "Load conversation",
            MenuAction::ToggleTheme => "Toggle theme",
            MenuAction::AboutOllama => "About Ollama",
            MenuAction::Quit => "Quit",
        }
    }

    pub fn shortcut(&self) -> &'static str {
        match self {
            MenuAction::NewConversation => "Ctrl+N",
            MenuAction::SaveConversation => "Ctrl+S",
            MenuAction::LoadConversation => "Ctrl+O",
            MenuAction::ToggleTheme => "Ctrl+T",
            MenuAction::AboutOllama => "F1",
            MenuAction::Quit => "Ctrl+Q",
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub app_title: String,
    pub model: String,
    about_url: String,

    // Chat
    pub session: ChatSession,
    dispatcher: Dispatcher,
    store: ConversationStore,

    // Input line
    pub input: String,
    pub input_cursor: usize,

    // Transcript view; dimensions are refreshed on every render
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,
    pub stick_to_bottom: bool,

    // Popups
    pub popup: Popup,
    pub menu_state: ListState,
    pub browser_state: ListState,
    pub title_input: String,

    // Presentation
    pub theme_mode: ThemeMode,
    pub theme: Theme,
    config_path: Option<PathBuf>,
    pub animation_frame: u8,
}

impl App {
    /// `config_path` is where theme changes are persisted; `None` keeps them in memory.
    pub fn new(
        config: &Config,
        dispatcher: Dispatcher,
        store: ConversationStore,
        config_path: Option<PathBuf>,
    ) -> Self {
        Self {
            should_quit: false,
            app_title: config.app_title.clone(),
            model: config.model.clone(),
            about_url: config.about_url.clone(),

            session: ChatSession::new(&config.app_title),
            dispatcher,
            store,

            input: String::new(),
            input_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            stick_to_bottom: true,

            popup: Popup::None,
            menu_state: ListState::default(),
            browser_state: ListState::default(),
            title_input: String::new(),

            theme_mode: config.theme,
            theme: Theme::for_mode(config.theme),
            config_path,
            animation_frame: 0,
        }
    }

    // Chat

    pub fn submit_input(&mut self) {
        match self.session.submit(&self.input) {
            Submission::Ignored | Submission::Busy => {}
            Submission::Quit => {
                self.clear_input();
                self.request_quit();
            }
            Submission::Dispatched(call) => {
                self.clear_input();
                self.dispatcher.dispatch(call);
                self.stick_to_bottom = true;
            }
        }
    }

    pub fn on_completion(&mut self, completion: Completion) {
        if !self.session.resolve(completion) {
            info!("dropped reply from a cleared conversation");
        }
        self.stick_to_bottom = true;
    }

    fn clear_input(&mut self) {
        self.input.clear();
        self.input_cursor = 0;
    }

    // Menu

    pub fn open_menu(&mut self) {
        self.menu_state.select(Some(0));
        self.popup = Popup::Menu;
    }

    pub fn menu_nav_down(&mut self) {
        let len = MenuAction::all().len();
        let i = self.menu_state.selected().unwrap_or(0);
        self.menu_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn menu_nav_up(&mut self) {
        let i = self.menu_state.selected().unwrap_or(0);
        self.menu_state.select(Some(i.saturating_sub(1)));
    }

    pub fn activate_selected_menu(&mut self) {
        let selected = self
            .menu_state
            .selected()
            .and_then(|i| MenuAction::all().get(i).copied());
        self.popup = Popup::None;
        if let Some(action) = selected {
            self.perform(action);
        }
    }

    pub fn perform(&mut self, action: MenuAction) {
        match action {
            MenuAction::NewConversation => self.request_new_conversation(),
            MenuAction::SaveConversation => self.open_title_prompt(AfterSave::Nothing),
            MenuAction::LoadConversation => self.open_browser(),
            MenuAction::ToggleTheme => self.toggle_theme(),
            MenuAction::AboutOllama => self.open_about(),
            MenuAction::Quit => self.request_quit(),
        }
    }

    // New conversation / quit, both gated by the save prompt

    pub fn request_new_conversation(&mut self) {
        if self.session.needs_save_prompt() {
            self.popup = Popup::ConfirmSave { then: AfterSave::NewConversation };
        } else {
            self.finish(AfterSave::NewConversation);
        }
    }

    pub fn request_quit(&mut self) {
        if self.session.needs_save_prompt() {
            self.popup = Popup::ConfirmSave { then: AfterSave::Quit };
        } else {
            self.finish(AfterSave::Quit);
        }
    }

    pub fn answer_save_prompt(&mut self, save: bool) {
        if let Popup::ConfirmSave { then } = self.popup {
            if save {
                self.open_title_prompt(then);
            } else {
                self.popup = Popup::None;
                self.finish(then);
            }
        }
    }

    fn finish(&mut self, then: AfterSave) {
        match then {
            AfterSave::Nothing => {}
            AfterSave::NewConversation => {
                self.session.new_conversation();
                self.chat_scroll = 0;
                self.stick_to_bottom = true;
            }
            AfterSave::Quit => self.should_quit = true,
        }
    }

    // Saving

    pub fn open_title_prompt(&mut self, then: AfterSave) {
        self.title_input.clear();
        self.popup = Popup::TitlePrompt { then };
    }

    pub fn submit_title(&mut self) {
        let Popup::TitlePrompt { then } = self.popup else {
            return;
        };
        let title = std::mem::take(&mut self.title_input);
        self.popup = Popup::None;

        if title.is_empty() {
            self.finish(then);
            return;
        }

        match self.store.save(&title, self.session.display()) {
            Ok(filename) => {
                self.session
                    .note(&format!("Conversation saved as {}\n", filename));
                self.stick_to_bottom = true;
                self.finish(then);
            }
            Err(e) => {
                // Leave the conversation in place so nothing is lost.
                warn!(error = %e, "failed to save conversation");
                self.show_error("Save failed", format!("Could not save conversation: {}", e));
            }
        }
    }

    /// A cancelled title prompt skips saving but still carries on.
    pub fn cancel_title(&mut self) {
        if let Popup::TitlePrompt { then } = self.popup {
            self.title_input.clear();
            self.popup = Popup::None;
            self.finish(then);
        }
    }

    // Conversation browser

    pub fn open_browser(&mut self) {
        match self.store.list_saved() {
            Ok(files) if files.is_empty() => {
                self.popup = Popup::Notice {
                    title: "No conversations".to_string(),
                    message: "No saved conversations.".to_string(),
                    is_error: false,
                };
            }
            Ok(files) => {
                self.browser_state.select(Some(0));
                self.popup = Popup::Browser { files };
            }
            Err(e) => {
                warn!(error = %e, dir = %self.store.dir().display(), "failed to list conversations");
                self.show_error("Error", format!("Could not list conversations: {}", e));
            }
        }
    }

    pub fn browser_nav_down(&mut self) {
        if let Popup::Browser { files } = &self.popup {
            let len = files.len();
            if len > 0 {
                let i = self.browser_state.selected().unwrap_or(0);
                self.browser_state.select(Some((i + 1).min(len - 1)));
            }
        }
    }

    pub fn browser_nav_up(&mut self) {
        let i = self.browser_state.selected().unwrap_or(0);
        self.browser_state.select(Some(i.saturating_sub(1)));
    }

    pub fn load_selected(&mut self) {
        let selected = match &self.popup {
            Popup::Browser { files } => self
                .browser_state
                .selected()
                .and_then(|i| files.get(i).cloned()),
            _ => return,
        };
        self.popup = Popup::None;

        let Some(filename) = selected else {
            return;
        };
        match self.store.load(&filename) {
            Ok(content) => {
                self.session.replace_display(content);
                self.stick_to_bottom = true;
            }
            Err(e) => {
                warn!(error = %e, file = %filename, "failed to load conversation");
                self.show_error("Error", format!("Could not load conversation: {}", e));
            }
        }
    }

    pub fn close_popup(&mut self) {
        self.popup = Popup::None;
    }

    fn show_error(&mut self, title: &str, message: String) {
        self.popup = Popup::Notice {
            title: title.to_string(),
            message,
            is_error: true,
        };
    }

    // Presentation

    pub fn toggle_theme(&mut self) {
        self.theme_mode = self.theme_mode.toggled();
        self.theme = Theme::for_mode(self.theme_mode);

        if let Some(path) = &self.config_path {
            if let Err(e) = Config::save_theme(path, self.theme_mode) {
                warn!(error = %e, "failed to persist theme");
            }
        }
    }

    pub fn open_about(&self) {
        if let Err(e) = open::that(&self.about_url) {
            warn!(error = %e, url = %self.about_url, "failed to open browser");
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_waiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Transcript scrolling

    /// Placeholder shown under the transcript while a reply is pending.
    pub fn thinking_text(&self) -> String {
        // Animated ellipsis: cycles through ".", "..", "..."
        format!("Bot: Thinking{}", ".".repeat(self.animation_frame as usize + 1))
    }

    /// Rows the transcript needs at the current width, including the
    /// "Thinking" line while waiting. Wrapped the same way the view wraps it.
    pub fn transcript_rows(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };

        let mut lines: Vec<Line> = self.session.display().lines().map(Line::from).collect();
        if self.session.is_waiting() {
            lines.push(Line::from(self.thinking_text()));
        }

        let rows = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .line_count(wrap_width);
        rows.min(u16::MAX as usize) as u16
    }

    pub fn max_scroll(&self) -> u16 {
        self.transcript_rows().saturating_sub(self.chat_height)
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.stick_to_bottom = false;
        self.chat_scroll = self.chat_scroll.min(self.max_scroll()).saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        let max = self.max_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(rows).min(max);
        self.stick_to_bottom = self.chat_scroll >= max;
    }

    pub fn page_rows(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use localchat_core::{CompletionBackend, ModelGateway, Phase, Result};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::sync::mpsc::UnboundedReceiver;

    /// Replies with the question it was asked.
    struct Echo;

    #[async_trait]
    impl CompletionBackend for Echo {
        async fn generate(&self, prompt: &str) -> Result<String> {
            let question = prompt
                .split("Question: ")
                .nth(1)
                .and_then(|rest| rest.split("\n\nAnswer:").next())
                .unwrap_or_default();
            Ok(format!("echo {}", question))
        }
    }

    pub(crate) fn test_app(dir: &TempDir) -> (App, UnboundedReceiver<Completion>) {
        let config = Config {
            app_title: "TestChat".to_string(),
            ..Config::default()
        };
        let (dispatcher, completions) = Dispatcher::new(ModelGateway::new(Arc::new(Echo)));
        let store = ConversationStore::new(dir.path());
        (App::new(&config, dispatcher, store, None), completions)
    }

    pub(crate) async fn chat(app: &mut App, completions: &mut UnboundedReceiver<Completion>, text: &str) {
        app.input = text.to_string();
        app.submit_input();
        assert_eq!(app.session.phase(), Phase::Waiting);
        let completion = completions.recv().await.unwrap();
        app.on_completion(completion);
    }

    #[tokio::test]
    async fn submit_dispatches_and_clears_input() {
        let dir = TempDir::new().unwrap();
        let (mut app, mut completions) = test_app(&dir);

        chat(&mut app, &mut completions, "hello").await;

        assert!(app.input.is_empty());
        assert_eq!(app.session.phase(), Phase::Ready);
        assert!(app.session.display().ends_with("You: hello\nBot: echo hello\n"));
    }

    #[test]
    fn whitespace_input_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let (mut app, _completions) = test_app(&dir);

        app.input = "   ".to_string();
        app.submit_input();

        assert_eq!(app.input, "   ");
        assert_eq!(app.session.phase(), Phase::Ready);
    }

    #[test]
    fn exit_on_empty_conversation_quits_immediately() {
        let dir = TempDir::new().unwrap();
        let (mut app, _completions) = test_app(&dir);

        app.input = "exit".to_string();
        app.submit_input();

        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn quit_with_history_asks_to_save_first() {
        let dir = TempDir::new().unwrap();
        let (mut app, mut completions) = test_app(&dir);
        chat(&mut app, &mut completions, "hi").await;

        app.input = "Exit".to_string();
        app.submit_input();
        assert!(!app.should_quit);
        assert_eq!(app.popup, Popup::ConfirmSave { then: AfterSave::Quit });

        app.answer_save_prompt(true);
        assert_eq!(app.popup, Popup::TitlePrompt { then: AfterSave::Quit });

        app.title_input = "last words".to_string();
        app.submit_title();

        assert!(app.should_quit);
        let saved = std::fs::read_to_string(dir.path().join("last_words.txt")).unwrap();
        assert!(saved.contains("You: hi\nBot: echo hi\n"));
        assert!(!saved.contains("Conversation saved as"));
    }

    #[tokio::test]
    async fn declining_save_still_starts_new_conversation() {
        let dir = TempDir::new().unwrap();
        let (mut app, mut completions) = test_app(&dir);
        chat(&mut app, &mut completions, "hi").await;

        app.perform(MenuAction::NewConversation);
        assert_eq!(app.popup, Popup::ConfirmSave { then: AfterSave::NewConversation });

        app.answer_save_prompt(false);

        assert_eq!(app.popup, Popup::None);
        assert!(app.session.conversation().is_empty());
        assert_eq!(app.session.display(), "New conversation started! How can I help you?\n");
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn new_conversation_without_history_skips_prompt() {
        let dir = TempDir::new().unwrap();
        let (mut app, _completions) = test_app(&dir);

        app.perform(MenuAction::NewConversation);

        assert_eq!(app.popup, Popup::None);
        assert_eq!(app.session.display(), "New conversation started! How can I help you?\n");
    }

    #[tokio::test]
    async fn cancelled_title_skips_save_but_continues() {
        let dir = TempDir::new().unwrap();
        let (mut app, mut completions) = test_app(&dir);
        chat(&mut app, &mut completions, "hi").await;

        app.request_new_conversation();
        app.answer_save_prompt(true);
        app.title_input = "half typed".to_string();
        app.cancel_title();

        assert!(app.session.conversation().is_empty());
        assert!(!dir.path().join("half_typed.txt").exists());
    }

    #[tokio::test]
    async fn save_writes_display_and_notes_filename() {
        let dir = TempDir::new().unwrap();
        let (mut app, mut completions) = test_app(&dir);
        chat(&mut app, &mut completions, "hi").await;
        let shown = app.session.display().to_string();

        app.perform(MenuAction::SaveConversation);
        app.title_input = "My Chat".to_string();
        app.submit_title();

        assert_eq!(std::fs::read_to_string(dir.path().join("My_Chat.txt")).unwrap(), shown);
        assert!(app.session.display().ends_with("Conversation saved as My_Chat.txt\n"));
        assert!(!app.session.conversation().is_empty());
    }

    #[tokio::test]
    async fn failed_save_reports_and_aborts_quit() {
        let dir = TempDir::new().unwrap();
        let (mut app, mut completions) = test_app(&dir);
        chat(&mut app, &mut completions, "hi").await;

        app.request_quit();
        app.answer_save_prompt(true);
        app.title_input = "missing/dir/name".to_string();
        app.submit_title();

        assert!(!app.should_quit);
        assert!(matches!(app.popup, Popup::Notice { is_error: true, .. }));
    }

    #[test]
    fn browser_with_no_files_shows_notice() {
        let dir = TempDir::new().unwrap();
        let (mut app, _completions) = test_app(&dir);

        app.perform(MenuAction::LoadConversation);

        match &app.popup {
            Popup::Notice { message, is_error, .. } => {
                assert_eq!(message, "No saved conversations.");
                assert!(!is_error);
            }
            other => panic!("expected notice, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn loading_replaces_display_only() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "first file").unwrap();
        std::fs::write(dir.path().join("b.txt"), "You: old\nBot: stuff\n").unwrap();
        let (mut app, mut completions) = test_app(&dir);
        chat(&mut app, &mut completions, "live").await;

        app.open_browser();
        assert_eq!(
            app.popup,
            Popup::Browser { files: vec!["a.txt".to_string(), "b.txt".to_string()] }
        );
        app.browser_nav_down();
        app.load_selected();

        assert_eq!(app.popup, Popup::None);
        assert_eq!(app.session.display(), "You: old\nBot: stuff\n");
        assert_eq!(app.session.conversation().current(), "\nUser: live\nAI: echo live");
    }

    #[test]
    fn unreadable_file_reports_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bad.txt"), [0xff, 0xfe, 0x00]).unwrap();
        let (mut app, _completions) = test_app(&dir);
        let before = app.session.display().to_string();

        app.open_browser();
        app.load_selected();

        assert!(matches!(app.popup, Popup::Notice { is_error: true, .. }));
        assert_eq!(app.session.display(), before);
    }

    #[test]
    fn theme_toggle_switches_palette() {
        let dir = TempDir::new().unwrap();
        let (mut app, _completions) = test_app(&dir);
        assert_eq!(app.theme.name, "dark");

        app.perform(MenuAction::ToggleTheme);
        assert_eq!(app.theme_mode, ThemeMode::Light);
        assert_eq!(app.theme.name, "light");

        app.toggle_theme();
        assert_eq!(app.theme.name, "dark");
    }

    #[test]
    fn theme_toggle_keeps_unreadable_config_intact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let original = r#"{"model":"llama3.2:latest","base_url":"http://box:11434",}"#;
        std::fs::write(&path, original).unwrap();

        let (dispatcher, _completions) = Dispatcher::new(ModelGateway::new(Arc::new(Echo)));
        let store = ConversationStore::new(dir.path());
        let mut app = App::new(&Config::default(), dispatcher, store, Some(path.clone()));

        app.toggle_theme();

        assert_eq!(app.theme_mode, ThemeMode::Light);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn rows_follow_word_wrapping() {
        let dir = TempDir::new().unwrap();
        let (mut app, _completions) = test_app(&dir);
        app.session.replace_display("aaaaaa bbbbbb cccccc dddddd\n".to_string());
        app.chat_width = 10;
        app.chat_height = 2;

        // 27 characters, but every word lands on its own row
        assert_eq!(app.transcript_rows(), 4);
        app.scroll_down(100);
        assert_eq!(app.chat_scroll, 2);
    }

    #[test]
    fn scrolling_is_clamped() {
        let dir = TempDir::new().unwrap();
        let (mut app, _completions) = test_app(&dir);
        app.session.replace_display("line\n".repeat(30));
        app.chat_width = 40;
        app.chat_height = 10;

        assert_eq!(app.max_scroll(), 20);
        app.scroll_down(100);
        assert_eq!(app.chat_scroll, 20);
        assert!(app.stick_to_bottom);

        app.scroll_up(5);
        assert_eq!(app.chat_scroll, 15);
        assert!(!app.stick_to_bottom);

        app.scroll_up(100);
        assert_eq!(app.chat_scroll, 0);
    }
}
