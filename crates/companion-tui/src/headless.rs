//! Headless mode for the companion TUI.
//!
//! Runs the app loop against a [`TestBackend`] instead of a real terminal,
//! for end-to-end tests and automation. Input is sent over a channel and
//! the rendered screen is published after every frame.

use std::sync::Arc;
use std::time::Duration;

use companion_engine::ReplyService;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::app::{App, Screen};
use crate::event::Action;
use crate::screens;
use crate::tasks::ReplyTasks;

/// Default terminal dimensions for headless mode.
pub const DEFAULT_WIDTH: u16 = 80;
pub const DEFAULT_HEIGHT: u16 = 24;

/// Input delivered to a headless TUI.
#[derive(Debug, Clone)]
pub enum Input {
    /// A key press, routed exactly like terminal input.
    Key(KeyEvent),
    /// An action, bypassing the chat input.
    Action(Action),
    /// Type each character of the text as a key press.
    Text(String),
    /// Paste the text in one piece.
    Paste(String),
}

/// State captured from the headless TUI after each render.
#[derive(Debug, Clone, Default)]
pub struct HeadlessState {
    /// Current screen being displayed.
    pub screen: Screen,
    /// Text contents of the terminal buffer.
    pub screen_contents: String,
    /// Messages in the conversation log.
    pub message_count: usize,
    /// Whether a reply is pending.
    pub pending: bool,
    /// Whether the TUI should quit.
    pub should_quit: bool,
    /// Whether help overlay is visible.
    pub show_help: bool,
}

/// Handle to control a headless TUI instance.
pub struct HeadlessHandle {
    input_tx: mpsc::UnboundedSender<Input>,
    state_rx: watch::Receiver<HeadlessState>,
}

impl HeadlessHandle {
    /// Send input to the TUI.
    ///
    /// Returns `true` if the input was sent successfully.
    pub fn send(&self, input: Input) -> bool {
        self.input_tx.send(input).is_ok()
    }

    /// Send an action to the TUI.
    pub fn send_action(&self, action: Action) -> bool {
        self.send(Input::Action(action))
    }

    /// Press a key without modifiers.
    pub fn press(&self, code: KeyCode) -> bool {
        self.send(Input::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    /// Type text into the focused input.
    pub fn type_text(&self, text: &str) -> bool {
        self.send(Input::Text(text.to_string()))
    }

    /// Get the current state of the TUI.
    pub fn state(&self) -> HeadlessState {
        self.state_rx.borrow().clone()
    }

    /// Wait until a condition is met on the state.
    ///
    /// Returns the state when the condition is met, or `None` if timed out.
    pub async fn wait_for<F>(&mut self, condition: F, timeout: Duration) -> Option<HeadlessState>
    where
        F: Fn(&HeadlessState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let state = self.state();
            if condition(&state) {
                return Some(state);
            }

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }

            match tokio::time::timeout(remaining, self.state_rx.changed()).await {
                Ok(Ok(())) => {}
                // Timed out, or the loop has exited
                Ok(Err(_)) | Err(_) => return None,
            }
        }
    }

    /// Wait for specific text to appear on screen.
    pub async fn wait_for_text(&mut self, text: &str, timeout: Duration) -> Option<HeadlessState> {
        self.wait_for(|s| s.screen_contents.contains(text), timeout)
            .await
    }

    /// Wait for a specific screen to be displayed.
    pub async fn wait_for_screen(
        &mut self,
        screen: Screen,
        timeout: Duration,
    ) -> Option<HeadlessState> {
        self.wait_for(|s| s.screen == screen, timeout).await
    }

    /// Check if the TUI has quit.
    pub fn has_quit(&self) -> bool {
        self.state().should_quit
    }
}

/// Configuration for headless mode.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Terminal width.
    pub width: u16,
    /// Terminal height.
    pub height: u16,
    /// Tick rate in milliseconds.
    pub tick_rate_ms: u64,
    /// Backend address shown on the landing screen.
    pub backend_url: String,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_rate_ms: 50,
            backend_url: companion_engine::DEFAULT_BACKEND_URL.to_string(),
        }
    }
}

/// Run the TUI in headless mode.
///
/// Returns a handle to control the TUI and a join handle for the background task.
///
/// # Example
///
/// ```ignore
/// let (mut handle, task) = run_tui_headless(service, HeadlessConfig::default());
///
/// handle.press(KeyCode::Enter);
/// handle.type_text("I had a long day");
/// handle.press(KeyCode::Enter);
/// handle.wait_for_text("thinking", Duration::from_secs(1)).await;
///
/// handle.send_action(Action::Quit);
/// task.await.unwrap();
/// ```
pub fn run_tui_headless(
    service: Arc<dyn ReplyService>,
    config: HeadlessConfig,
) -> (HeadlessHandle, JoinHandle<Result<(), String>>) {
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(HeadlessState::default());

    let task = tokio::spawn(async move {
        run_headless_loop(service, config, input_rx, state_tx)
            .await
            .map_err(|e| e.to_string())
    });

    let handle = HeadlessHandle { input_tx, state_rx };

    (handle, task)
}

async fn run_headless_loop(
    service: Arc<dyn ReplyService>,
    config: HeadlessConfig,
    mut input_rx: mpsc::UnboundedReceiver<Input>,
    state_tx: watch::Sender<HeadlessState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let backend = TestBackend::new(config.width, config.height);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config.backend_url);
    let mut tasks = ReplyTasks::new(service);
    let tick_duration = Duration::from_millis(config.tick_rate_ms);

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            screens::render_app(&app, area, frame.buffer_mut());
        })?;

        let screen_contents = buffer_to_string(terminal.backend().buffer());
        let _ = state_tx.send(HeadlessState {
            screen: app.screen,
            screen_contents,
            message_count: app.conversation.messages().len(),
            pending: app.conversation.is_pending(),
            should_quit: app.should_quit,
            show_help: app.show_help,
        });

        if app.should_quit {
            tasks.abort_all();
            break;
        }

        if tasks.collect_finished(&mut app) > 0 {
            continue;
        }

        let input = tokio::select! {
            input = input_rx.recv() => Some(input),
            () = tokio::time::sleep(tick_duration) => {
                app.tick();
                None
            }
            () = tasks.wait_finished() => None,
        };

        match input {
            Some(Some(Input::Key(key))) => crate::handle_key(&mut app, &mut tasks, key),
            Some(Some(Input::Action(action))) => app.handle_action(action),
            Some(Some(Input::Text(text))) => {
                for c in text.chars() {
                    let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
                    crate::handle_key(&mut app, &mut tasks, key);
                }
            }
            Some(Some(Input::Paste(text))) => app.handle_paste(&text),
            // Handle dropped
            Some(None) => {
                tasks.abort_all();
                break;
            }
            None => {}
        }
    }

    Ok(())
}

/// Convert a terminal buffer to a string representation.
///
/// Trailing whitespace is trimmed from each line.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}
