use std::path::PathBuf;
use std::sync::Arc;

use akshara_core::content;
use akshara_core::media::PERMISSION_ALERT_TEXT;
use akshara_core::{
    Backend, ChatSession, ClientError, Config, FsImagePicker, HttpBackend, Language, MediaPicker,
    PollEvent, PollHandle, StatusPoller, TaskId,
};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Chat,
    Letters,
    Exercises,
}

impl Screen {
    pub fn next(&self) -> Self {
        match self {
            Screen::Chat => Screen::Letters,
            Screen::Letters => Screen::Exercises,
            Screen::Exercises => Screen::Chat,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Screen::Chat => " ASSISTANT ",
            Screen::Letters => " LETTERS ",
            Screen::Exercises => " EXERCISES ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Single-line text field with a character-indexed cursor
#[derive(Debug, Default, Clone)]
pub struct LineInput {
    pub text: String,
    pub cursor: usize,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl LineInput {
    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Take the text out, leaving the field empty
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub session: ChatSession,
    pub input: LineInput,

    // Chat scroll state
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub chat_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Language picker state
    pub show_language_picker: bool,
    pub language_picker_state: ListState,

    // Image path prompt
    pub show_image_prompt: bool,
    pub image_input: LineInput,

    /// Blocking alert shown over everything until a key is pressed
    pub alert: Option<String>,

    // Catalog screens
    pub letters_scroll: u16,
    pub letters_height: u16,
    pub letters_width: u16,
    pub exercise_state: ListState,
    pub reveal_answers: bool,

    // Collaborators
    pub config: Config,
    /// Where a picked language is saved; `None` keeps it in memory only
    config_path: Option<PathBuf>,
    backend: Arc<dyn Backend>,
    picker: Box<dyn MediaPicker>,

    // Background work
    text_task: Option<JoinHandle<Result<String, ClientError>>>,
    record_task: Option<JoinHandle<Result<TaskId, ClientError>>>,
    poll_handle: Option<PollHandle>,
    poll_tx: mpsc::UnboundedSender<PollEvent>,
    pub poll_events: mpsc::UnboundedReceiver<PollEvent>,
}

impl App {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let backend = HttpBackend::new(&config.backend_url, config.request_timeout())?;
        let picker = FsImagePicker::new(config.picture_dir());
        info!(backend = %backend.base_url(), library = %picker.library().display(), "starting session");

        let config_path = match Config::config_path() {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("language choice will not be saved: {}", e);
                None
            }
        };

        Ok(Self::with_parts(config, Arc::new(backend), Box::new(picker)).with_config_path(config_path))
    }

    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn with_parts(config: Config, backend: Arc<dyn Backend>, picker: Box<dyn MediaPicker>) -> Self {
        let (poll_tx, poll_events) = mpsc::unbounded_channel();

        let mut exercise_state = ListState::default();
        exercise_state.select(Some(0));

        let mut app = Self {
            should_quit: false,
            screen: Screen::Chat,
            input_mode: InputMode::Normal,
            session: ChatSession::new(config.language),
            input: LineInput::default(),

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,

            animation_frame: 0,

            show_language_picker: false,
            language_picker_state: ListState::default(),

            show_image_prompt: false,
            image_input: LineInput::default(),

            alert: None,

            letters_scroll: 0,
            letters_height: 0,
            letters_width: 0,
            exercise_state,
            reveal_answers: false,

            config,
            config_path: None,
            backend,
            picker,

            text_task: None,
            record_task: None,
            poll_handle: None,
            poll_tx,
            poll_events,
        };
        app.check_media_permission();
        app
    }

    /// Asked once at mount. A refusal is reported but does not disable
    /// image picking.
    fn check_media_permission(&mut self) {
        if let Err(e) = self.picker.check_permission() {
            warn!("media library unavailable: {}", e);
            self.alert = Some(PERMISSION_ALERT_TEXT.to_string());
        }
    }

    pub fn language(&self) -> Language {
        self.session.language()
    }

    pub fn is_sending(&self) -> bool {
        self.text_task.is_some()
    }

    pub fn is_polling(&self) -> bool {
        self.poll_handle.is_some()
    }

    // Chat actions
    pub fn send_input(&mut self) {
        if self.text_task.is_some() {
            return;
        }

        let Some(outgoing) = self.session.submit_text(&self.input.text) else {
            return;
        };
        self.input.take();

        let backend = self.backend.clone();
        self.text_task = Some(tokio::spawn(async move { outgoing.send(backend.as_ref()).await }));

        // Scroll to bottom so "Thinking..." is visible
        self.scroll_chat_to_bottom();
    }

    pub fn toggle_recording(&mut self) {
        if self.record_task.is_some() {
            // Capture happens server-side for a fixed window; nothing to stop locally
            info!("recording already in progress");
            return;
        }

        let Some(language) = self.session.begin_recording() else {
            return;
        };

        info!(lang = language.code(), "requesting recording");
        let backend = self.backend.clone();
        self.record_task = Some(tokio::spawn(async move { backend.start_recording(language).await }));
        self.scroll_chat_to_bottom();
    }

    pub fn open_image_prompt(&mut self) {
        self.image_input = LineInput::default();
        self.show_image_prompt = true;
    }

    pub fn attach_image(&mut self) {
        let selection = self.image_input.take();
        self.show_image_prompt = false;

        match self.picker.pick_image(&selection) {
            Ok(uri) => {
                self.session.attach_image(uri);
                self.scroll_chat_to_bottom();
            }
            Err(e) => {
                warn!("image pick failed: {}", e);
                self.alert = Some(e.to_string());
            }
        }
    }

    // Language picker
    pub fn open_language_picker(&mut self) {
        let current = Language::all().iter().position(|l| *l == self.language());
        self.language_picker_state.select(current.or(Some(0)));
        self.show_language_picker = true;
    }

    pub fn language_picker_nav_down(&mut self) {
        let len = Language::all().len();
        let i = self.language_picker_state.selected().unwrap_or(0);
        self.language_picker_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn language_picker_nav_up(&mut self) {
        let i = self.language_picker_state.selected().unwrap_or(0);
        self.language_picker_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_language(&mut self) {
        if let Some(language) = self
            .language_picker_state
            .selected()
            .and_then(|i| Language::all().get(i).copied())
        {
            self.session.select_language(language);
            self.config.language = language;
            if let Some(path) = &self.config_path {
                if let Err(e) = Config::save_language_to(path, language) {
                    warn!("could not persist language: {}", e);
                }
            }
        }
        self.show_language_picker = false;
    }

    // Background work
    /// Collect finished requests and feed their results to the session.
    pub async fn poll_tasks(&mut self) {
        if self.text_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.text_task.take() {
                match task.await {
                    Ok(result) => self.session.complete_text(result),
                    Err(e) => self.session.complete_text::<tokio::task::JoinError>(Err(e)),
                }
                self.scroll_chat_to_bottom();
            }
        }

        if self.record_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.record_task.take() {
                match task.await {
                    Ok(Ok(task_id)) => self.recording_accepted(task_id),
                    Ok(Err(e)) => self.session.recording_failed(&e),
                    Err(e) => self.session.recording_failed(&e),
                }
                self.scroll_chat_to_bottom();
            }
        }

        // The poller exited without delivering a terminal status
        if self.poll_handle.as_ref().is_some_and(|h| h.is_finished()) {
            while let Ok(event) = self.poll_events.try_recv() {
                self.apply_poll(event);
            }
            if self.poll_handle.take().is_some() && self.session.poller_stopped() {
                self.scroll_chat_to_bottom();
            }
        }
    }

    fn recording_accepted(&mut self, task_id: TaskId) {
        match self.session.recording_accepted(task_id.clone()) {
            Ok(_) => {
                self.poll_handle = Some(StatusPoller::spawn(
                    self.backend.clone(),
                    task_id,
                    self.config.poll_interval(),
                    self.poll_tx.clone(),
                ));
            }
            Err(e) => error!("{}", e),
        }
    }

    pub fn apply_poll(&mut self, event: PollEvent) {
        if self.session.apply_poll(event) {
            // Dropping the handle stops the timer
            self.poll_handle = None;
        }
        self.scroll_chat_to_bottom();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_loading() || self.is_polling() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Chat scrolling
    pub fn scroll_chat_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1).min(self.max_chat_scroll());
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_to_top(&mut self) {
        self.chat_scroll = 0;
    }

    fn max_chat_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };
        self.chat_line_count().saturating_sub(visible_height)
    }

    /// Estimated rendered height of the chat, including the loading line
    fn chat_line_count(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.session.messages() {
            total_lines = total_lines.saturating_add(1); // Sender line
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                let wrapped = if char_count == 0 { 1 } else { char_count / wrap_width + 1 };
                total_lines = total_lines.saturating_add(wrapped as u16);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        if self.session.is_loading() {
            total_lines = total_lines.saturating_add(2);
        }
        total_lines
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.max_chat_scroll();
    }

    // Catalog screens
    pub fn scroll_letters_down(&mut self, lines: u16) {
        self.letters_scroll = self.letters_scroll.saturating_add(lines).min(self.max_letters_scroll());
    }

    pub fn scroll_letters_up(&mut self, lines: u16) {
        self.letters_scroll = self.letters_scroll.saturating_sub(lines);
    }

    fn max_letters_scroll(&self) -> u16 {
        let visible_height = if self.letters_height > 0 { self.letters_height } else { 20 };
        let wrap_width = if self.letters_width > 0 { self.letters_width as usize } else { 50 };

        let total_lines = content::characters(self.language().code())
            .map(|groups| {
                groups
                    .iter()
                    .map(|group| {
                        let glyph_chars: usize = group.dialogue_items.iter().map(|g| g.chars().count() + 2).sum();
                        // Role line, wrapped glyphs, blank line
                        2 + glyph_chars / wrap_width + 1
                    })
                    .sum::<usize>()
            })
            .unwrap_or(1);

        (total_lines.min(u16::MAX as usize) as u16).saturating_sub(visible_height)
    }

    pub fn exercise_nav_down(&mut self) {
        let len = content::exercise_sets().len();
        if len > 0 {
            let i = self.exercise_state.selected().unwrap_or(0);
            self.exercise_state.select(Some((i + 1).min(len - 1)));
            self.reveal_answers = false;
        }
    }

    pub fn exercise_nav_up(&mut self) {
        let i = self.exercise_state.selected().unwrap_or(0);
        self.exercise_state.select(Some(i.saturating_sub(1)));
        self.reveal_answers = false;
    }

    pub fn selected_exercise(&self) -> Option<&'static content::ExerciseSet> {
        self.exercise_state
            .selected()
            .and_then(|i| content::exercise_sets().get(i))
    }

    pub fn next_screen(&mut self) {
        self.screen = self.screen.next();
        self.letters_scroll = 0;
        self.input_mode = InputMode::Normal;
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(task) = self.text_task.take() {
            task.abort();
        }
        if let Some(task) = self.record_task.take() {
            task.abort();
        }
        // PollHandle cancels its own timer
        self.poll_handle = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handle_event;
    use crate::tui::AppEvent;
    use akshara_core::{MediaError, MessageKind, TaskStatus};
    use async_trait::async_trait;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Answers every call immediately without a network
    struct EchoBackend;

    #[async_trait]
    impl Backend for EchoBackend {
        async fn send_text(&self, content: &str, target: Language) -> Result<String, ClientError> {
            Ok(format!("{}:{}", target.code(), content))
        }

        async fn translate(&self, text: &str, _target: Language) -> Result<String, ClientError> {
            Ok(text.to_uppercase())
        }

        async fn start_recording(&self, _target: Language) -> Result<TaskId, ClientError> {
            Ok(TaskId::new("task-1"))
        }

        async fn check_status(&self, _task_id: &TaskId) -> Result<TaskStatus, ClientError> {
            Ok(TaskStatus::Completed {
                transcription: "hello".into(),
                translation: Some("ನಮಸ್ಕಾರ".into()),
            })
        }
    }

    /// Accepts recordings, then dies while checking their status
    struct CrashingBackend;

    #[async_trait]
    impl Backend for CrashingBackend {
        async fn send_text(&self, content: &str, _target: Language) -> Result<String, ClientError> {
            Ok(content.to_string())
        }

        async fn translate(&self, text: &str, _target: Language) -> Result<String, ClientError> {
            Ok(text.to_string())
        }

        async fn start_recording(&self, _target: Language) -> Result<TaskId, ClientError> {
            Ok(TaskId::new("task-1"))
        }

        async fn check_status(&self, _task_id: &TaskId) -> Result<TaskStatus, ClientError> {
            panic!("status check crashed");
        }
    }

    struct DeniedPicker;

    impl MediaPicker for DeniedPicker {
        fn check_permission(&self) -> Result<(), MediaError> {
            Err(MediaError::PermissionDenied("/nope".into()))
        }

        fn pick_image(&self, selection: &str) -> Result<String, MediaError> {
            Ok(format!("file:///nope/{}", selection))
        }
    }

    fn test_config() -> Config {
        Config {
            poll_interval_ms: 5,
            ..Config::new()
        }
    }

    fn test_app() -> (App, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let app = App::with_parts(
            test_config(),
            Arc::new(EchoBackend),
            Box::new(FsImagePicker::new(dir.path())),
        );
        (app, dir)
    }

    fn type_into(input: &mut LineInput, text: &str) {
        for c in text.chars() {
            input.insert(c);
        }
    }

    async fn settle(app: &mut App) {
        for _ in 0..200 {
            app.poll_tasks().await;
            while let Ok(event) = app.poll_events.try_recv() {
                app.apply_poll(event);
            }
            if !app.is_sending() && app.record_task.is_none() && !app.is_polling() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("background work did not settle");
    }

    fn contents(app: &App) -> Vec<&str> {
        app.session.messages().iter().map(|m| m.content.as_str()).collect()
    }

    #[test]
    fn test_line_input_utf8_editing() {
        let mut input = LineInput::default();
        type_into(&mut input, "ನಮಸ್");
        input.left();
        input.backspace();
        input.end();
        input.insert('!');

        assert_eq!(input.text, "ನಮ್!");
        assert_eq!(input.take(), "ನಮ್!");
        assert_eq!(input.cursor, 0);
    }

    #[tokio::test]
    async fn test_send_input_round_trip() {
        let (mut app, _dir) = test_app();
        assert!(app.alert.is_none());
        type_into(&mut app.input, "hello");

        app.send_input();
        assert!(app.input.text.is_empty());
        assert!(app.session.is_loading());

        settle(&mut app).await;
        assert_eq!(contents(&app), vec!["hello", "kn:hello"]);
        assert!(!app.session.is_loading());
    }

    #[tokio::test]
    async fn test_translate_prefix_uses_translate_endpoint() {
        let (mut app, _dir) = test_app();
        type_into(&mut app.input, "/translate good morning");

        app.send_input();
        settle(&mut app).await;

        assert_eq!(contents(&app), vec!["/translate good morning", "GOOD MORNING"]);
    }

    #[tokio::test]
    async fn test_blank_input_is_not_sent() {
        let (mut app, _dir) = test_app();
        type_into(&mut app.input, "   ");
        app.send_input();

        assert!(!app.is_sending());
        assert!(app.session.messages().is_empty());
    }

    #[tokio::test]
    async fn test_recording_flow_stops_polling() {
        let (mut app, _dir) = test_app();
        app.toggle_recording();
        assert!(app.session.is_recording());

        settle(&mut app).await;

        assert_eq!(contents(&app), vec!["Audio recorded", "hello", "ನಮಸ್ಕಾರ"]);
        assert!(!app.is_polling());
        assert!(!app.session.is_recording());
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    #[tokio::test]
    async fn test_language_picker_changes_target_and_persists() {
        let (app, dir) = test_app();
        let config_path = dir.path().join("akshara").join("config.json");
        let mut app = app.with_config_path(Some(config_path.clone()));

        press(&mut app, KeyCode::Char('l'));
        assert!(app.show_language_picker);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);

        assert!(!app.show_language_picker);
        assert_eq!(app.language(), Language::Tamil);
        assert_eq!(Config::load_from(&config_path).unwrap().language, Language::Tamil);

        type_into(&mut app.input, "hi");
        app.send_input();
        settle(&mut app).await;
        assert_eq!(app.session.messages()[1].content, "ta:hi");
    }

    #[tokio::test]
    async fn test_language_kept_in_memory_without_config_path() {
        let (mut app, dir) = test_app();

        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.language(), Language::Telugu);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_crashed_poller_fails_recording() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::with_parts(
            test_config(),
            Arc::new(CrashingBackend),
            Box::new(FsImagePicker::new(dir.path())),
        );

        app.toggle_recording();
        settle(&mut app).await;

        assert_eq!(
            contents(&app),
            vec!["Audio recorded", "Transcription in progress...", "Error processing audio"]
        );
        assert!(!app.is_polling());

        // The mic is usable again
        app.toggle_recording();
        assert!(app.session.is_recording());
    }

    #[tokio::test]
    async fn test_permission_denied_alerts_but_allows_picking() {
        let mut app = App::with_parts(test_config(), Arc::new(EchoBackend), Box::new(DeniedPicker));
        assert_eq!(app.alert.as_deref(), Some(PERMISSION_ALERT_TEXT));
        app.alert = None;

        app.open_image_prompt();
        type_into(&mut app.image_input, "cat.png");
        app.attach_image();

        assert!(app.alert.is_none());
        assert!(!app.show_image_prompt);
        assert_eq!(app.session.messages()[0].kind, MessageKind::Image);
        assert_eq!(app.session.messages()[0].content, "file:///nope/cat.png");
    }

    #[tokio::test]
    async fn test_bad_image_path_alerts() {
        let (mut app, _dir) = test_app();
        app.open_image_prompt();
        type_into(&mut app.image_input, "missing.png");
        app.attach_image();

        assert!(app.alert.as_deref().unwrap_or("").starts_with("No such file"));
        assert!(app.session.messages().is_empty());
    }

    #[tokio::test]
    async fn test_exercise_navigation_hides_answers() {
        let (mut app, _dir) = test_app();
        app.reveal_answers = true;
        app.exercise_nav_down();
        assert!(!app.reveal_answers);
        assert_eq!(app.selected_exercise().map(|s| s.id), Some(2));

        for _ in 0..10 {
            app.exercise_nav_down();
        }
        assert_eq!(
            app.exercise_state.selected(),
            Some(content::exercise_sets().len() - 1)
        );
    }

    #[test]
    fn test_screen_cycle() {
        assert_eq!(Screen::Chat.next(), Screen::Letters);
        assert_eq!(Screen::Letters.next(), Screen::Exercises);
        assert_eq!(Screen::Exercises.next(), Screen::Chat);
    }
}
