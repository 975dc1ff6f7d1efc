//! companion-tui: Terminal front end for the companion chat client
//!
//! This crate provides:
//! - Landing screen with the welcome text and features
//! - Chat screen with message list, typing indicator and input bar
//! - Background reply requests that never block the event loop
//! - Headless mode for testing and automation

mod app;
mod event;
pub mod headless;
mod screens;
mod tasks;
#[cfg(test)]
pub mod test_utils;
mod ui;

pub use app::{App, KeyOutcome, Screen, NOTIFICATION_TICKS};
pub use companion_engine;
pub use event::{Action, Event, EventHandler};
pub use tasks::ReplyTasks;

use companion_engine::{Config, ReplyService};
use crossterm::{
    cursor::Show as ShowCursor,
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        KeyEvent, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::sync::Arc;
use tracing::info;

/// Tick rate of the terminal event loop (4 Hz).
const TICK_RATE_MS: u64 = 250;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen,
            ShowCursor
        );
    }
}

/// Run the TUI application.
///
/// Sets up the terminal, runs the event loop until the user quits, and
/// restores the terminal on exit. Replies are requested through `service`.
pub async fn run_tui(
    config: &Config,
    service: Arc<dyn ReplyService>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal with RAII guard for cleanup
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!(backend = %config.backend_url, "starting chat UI");
    let mut app = App::new(config.backend_url.clone());
    let mut tasks = ReplyTasks::new(service);
    let mut events = EventHandler::new(TICK_RATE_MS);

    let result = run_loop(&mut terminal, &mut app, &mut tasks, &mut events).await;

    // Restore cursor before guard drops
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tasks: &mut ReplyTasks,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            screens::render_app(app, area, frame.buffer_mut());
        })?;

        // A finished reply wakes the loop as well as terminal input
        let event = tokio::select! {
            event = events.next() => event,
            () = tasks.wait_finished() => None,
        };

        if let Some(event) = event {
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(app, tasks, key);
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => app.handle_action(Action::Up),
                    MouseEventKind::ScrollDown => app.handle_action(Action::Down),
                    _ => {}
                },
                Event::Paste(text) => app.handle_paste(&text),
                Event::Tick => app.tick(),
                // Key releases and resizes only need a redraw
                Event::Key(_) | Event::Resize(_, _) => {}
            }
        }

        tasks.collect_finished(app);

        if app.should_quit {
            tasks.abort_all();
            break;
        }
    }

    info!("chat UI closed");
    Ok(())
}

/// Route a key through the chat input first, then the action mapping.
pub(crate) fn handle_key(app: &mut App, tasks: &mut ReplyTasks, key: KeyEvent) {
    match app.handle_chat_key(key) {
        KeyOutcome::Submit(request) => tasks.spawn(request),
        KeyOutcome::Handled => {}
        KeyOutcome::Unhandled => app.handle_action(event::key_to_action(key)),
    }
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}


/// Navigation tests that exercise event handling and screen transitions.
#[cfg(test)]
mod navigation_tests {
    use crate::app::Screen;
    use crate::event::Action;
    use crate::test_utils::create_test_app;

    #[test]
    fn test_landing_to_chat_navigation() {
        let mut app = create_test_app();
        assert_eq!(app.screen, Screen::Landing);

        app.handle_action(Action::Select);
        assert_eq!(app.screen, Screen::Chat);
    }

    #[test]
    fn test_back_from_chat_to_landing() {
        let mut app = create_test_app();
        app.screen = Screen::Chat;

        app.handle_action(Action::Back);
        assert_eq!(app.screen, Screen::Landing);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_help_overlay_toggle() {
        let mut app = create_test_app();
        assert!(!app.show_help);

        app.handle_action(Action::Help);
        assert!(app.show_help);

        app.handle_action(Action::Back);
        assert!(!app.show_help);
        assert_eq!(app.screen, Screen::Landing);
    }

    #[test]
    fn test_help_closes_before_quit() {
        let mut app = create_test_app();
        app.show_help = true;

        app.handle_action(Action::Quit);
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_quit_from_chat() {
        let mut app = create_test_app();
        app.screen = Screen::Chat;

        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_new_conversation_ignored_on_landing() {
        let mut app = create_test_app();
        app.handle_action(Action::NewConversation);
        assert!(app.notification.is_none());
        assert_eq!(app.screen, Screen::Landing);
    }

    #[test]
    fn test_action_none_does_nothing() {
        let mut app = create_test_app();
        let initial_screen = app.screen;

        app.handle_action(Action::None);
        assert_eq!(app.screen, initial_screen);
    }
}

/// End-to-end tests driving the headless loop with stub reply services.
#[cfg(test)]
mod headless_tests {
    use crate::app::Screen;
    use crate::event::Action;
    use crate::headless::{run_tui_headless, HeadlessConfig, Input};
    use crate::ui::widgets::TYPING_TEXT;
    use async_trait::async_trait;
    use companion_engine::{Reply, ReplyError, ReplyService, FALLBACK_REPLY};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Notify;

    const WAIT: Duration = Duration::from_secs(5);

    /// Replies once released, recording what it was asked.
    struct Gated {
        release: Notify,
        calls: Mutex<Vec<(String, Vec<String>)>>,
        result: Result<Reply, ReplyError>,
    }

    impl Gated {
        fn new(result: Result<Reply, ReplyError>) -> Arc<Self> {
            Arc::new(Self {
                release: Notify::new(),
                calls: Mutex::new(Vec::new()),
                result,
            })
        }
    }

    #[async_trait]
    impl ReplyService for Gated {
        async fn reply(&self, message: &str, history: &[String]) -> Result<Reply, ReplyError> {
            self.calls
                .lock()
                .unwrap()
                .push((message.to_string(), history.to_vec()));
            self.release.notified().await;
            self.result.clone()
        }
    }

    #[tokio::test]
    async fn test_send_message_and_receive_reply() {
        let service = Gated::new(Ok(Reply::new(
            "That sounds heavy. I'm here.",
            Some("supportive".into()),
        )));
        let (mut handle, task) = run_tui_headless(service.clone(), HeadlessConfig::default());

        assert!(handle
            .wait_for_text("Your Emotional Companion", WAIT)
            .await
            .is_some());
        handle.press(KeyCode::Enter);
        handle.wait_for_screen(Screen::Chat, WAIT).await.unwrap();

        handle.type_text("I had a long day");
        handle.press(KeyCode::Enter);

        let state = handle.wait_for(|s| s.pending, WAIT).await.unwrap();
        assert_eq!(state.message_count, 2);
        handle.wait_for_text(TYPING_TEXT, WAIT).await.unwrap();

        service.release.notify_one();
        let state = handle
            .wait_for(|s| !s.pending && s.message_count == 3, WAIT)
            .await
            .unwrap();
        assert!(state.screen_contents.contains("That sounds heavy. I'm here."));
        assert!(state.screen_contents.contains("supportive"));
        assert!(!state.screen_contents.contains(TYPING_TEXT));

        let calls = service.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "I had a long day");
        assert_eq!(calls[0].1.last().unwrap(), "user: I had a long day");

        handle.send_action(Action::Quit);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_reply_shown_without_waiting_for_a_tick() {
        let service = Gated::new(Ok(Reply::new("Right away.", None)));
        let config = HeadlessConfig {
            tick_rate_ms: 60_000,
            ..HeadlessConfig::default()
        };
        let (mut handle, task) = run_tui_headless(service.clone(), config);

        handle.send_action(Action::Select);
        handle.wait_for_screen(Screen::Chat, WAIT).await.unwrap();
        handle.send(Input::Paste("hello".into()));
        handle.press(KeyCode::Enter);
        handle.wait_for(|s| s.pending, WAIT).await.unwrap();

        service.release.notify_one();
        let state = handle
            .wait_for(|s| !s.pending, Duration::from_secs(2))
            .await
            .unwrap();
        assert!(state.screen_contents.contains("Right away."));

        handle.send_action(Action::Quit);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_failed_reply_shows_fallback_and_toast() {
        let service = Gated::new(Err(ReplyError::Status(503)));
        let (mut handle, task) = run_tui_headless(service.clone(), HeadlessConfig::default());

        handle.send_action(Action::Select);
        handle.wait_for_screen(Screen::Chat, WAIT).await.unwrap();
        handle.send(Input::Text("hello".into()));
        handle.press(KeyCode::Enter);
        handle.wait_for(|s| s.pending, WAIT).await.unwrap();

        service.release.notify_one();
        let state = handle
            .wait_for(|s| s.screen_contents.contains("Connection issue"), WAIT)
            .await
            .unwrap();
        assert!(!state.pending);
        assert_eq!(state.message_count, 3);
        assert!(state.screen_contents.contains(&FALLBACK_REPLY[..30]));

        handle.send_action(Action::Quit);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_new_conversation_while_pending_discards_reply() {
        let service = Gated::new(Ok(Reply::new("late reply", None)));
        let (mut handle, task) = run_tui_headless(service.clone(), HeadlessConfig::default());

        handle.send_action(Action::Select);
        handle.type_text("hello");
        handle.press(KeyCode::Enter);
        handle.wait_for(|s| s.pending, WAIT).await.unwrap();

        let ctrl_n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL);
        handle.send(Input::Key(ctrl_n));
        let state = handle
            .wait_for(|s| !s.pending && s.message_count == 1, WAIT)
            .await
            .unwrap();
        assert!(state.screen_contents.contains("New conversation started"));

        service.release.notify_one();
        // Give the stale reply time to land, then confirm it was dropped
        tokio::time::sleep(Duration::from_millis(200)).await;
        let state = handle.state();
        assert_eq!(state.message_count, 1);
        assert!(!state.screen_contents.contains("late reply"));

        handle.send_action(Action::Quit);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_enter_while_pending_is_ignored() {
        let service = Gated::new(Ok(Reply::new("ok", None)));
        let (mut handle, task) = run_tui_headless(service.clone(), HeadlessConfig::default());

        handle.send_action(Action::Select);
        handle.type_text("first");
        handle.press(KeyCode::Enter);
        handle.wait_for(|s| s.pending, WAIT).await.unwrap();

        handle.type_text("second");
        handle.press(KeyCode::Enter);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(handle.state().message_count, 2);

        service.release.notify_one();
        handle
            .wait_for(|s| !s.pending && s.message_count == 3, WAIT)
            .await
            .unwrap();
        assert_eq!(service.calls.lock().unwrap().len(), 1);

        handle.send_action(Action::Quit);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_pasted_paragraph_is_sent_whole() {
        let service = Gated::new(Ok(Reply::new("Thank you for sharing.", None)));
        let (mut handle, task) = run_tui_headless(service.clone(), HeadlessConfig::default());

        handle.send_action(Action::Select);
        handle.send(Input::Paste("first line\nsecond line".into()));
        handle.press(KeyCode::Enter);
        handle.wait_for(|s| s.pending, WAIT).await.unwrap();
        service.release.notify_one();
        handle
            .wait_for(|s| !s.pending && s.message_count == 3, WAIT)
            .await
            .unwrap();

        let calls = service.calls.lock().unwrap().clone();
        assert_eq!(calls[0].0, "first line\nsecond line");

        handle.send_action(Action::Quit);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_quit_with_ctrl_c() {
        let service = Gated::new(Ok(Reply::new("ok", None)));
        let (mut handle, task) = run_tui_headless(service, HeadlessConfig::default());

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        handle.send(Input::Key(ctrl_c));
        assert!(handle.wait_for(|s| s.should_quit, WAIT).await.is_some());
        task.await.unwrap().unwrap();
        assert!(handle.has_quit());
    }
}
