// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `duckie shell` command implementation.
//!
//! A readline REPL standing in for the messenger: the terminal user can walk
//! the menu, enter the interactive mode and chat with the tutor. Reminders
//! from the activity watchdog are printed inline. `/user <id>` switches the
//! local identity, which makes the single-seat behavior easy to try out.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use colored::Colorize;
use duckie_agent::{
    ActivityWatchdog, ChatSettings, InteractiveChat, Reply, SessionArbiter, WatchdogSettings,
};
use duckie_config::DuckieConfig;
use duckie_core::{
    ChatId, Content, ContentButton, ContentResolver, DuckieError, MessageId, NavigationProbe,
    NavigationState, ReminderPrompt, ReminderSink, UserId,
};
use duckie_inference::{GatewaySettings, InferenceGateway, InteractionJournal, OllamaLoader};
use duckie_prompt::PromptCodec;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Empty,
    Quit,
    Help,
    /// Enter interactive mode.
    Chat,
    /// Leave interactive mode.
    Exit,
    Navigate(NavigationState),
    SwitchUser(i64),
    /// Press a reminder button by its callback target.
    Button(String),
    Text(String),
    Unknown(String),
}

impl ShellCommand {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ShellCommand::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return ShellCommand::Text(line.to_string());
        };

        let mut parts = command.split_whitespace();
        match (parts.next().unwrap_or_default(), parts.next()) {
            ("quit", None) => ShellCommand::Quit,
            ("help", None) => ShellCommand::Help,
            ("chat", None) => ShellCommand::Chat,
            ("exit", None) => ShellCommand::Exit,
            ("menu", None) => ShellCommand::Navigate(NavigationState::Menu),
            ("topics", None) => ShellCommand::Navigate(NavigationState::Topics),
            ("lecture", None) => ShellCommand::Navigate(NavigationState::Lecture),
            ("user", Some(id)) => match id.parse() {
                Ok(id) => ShellCommand::SwitchUser(id),
                Err(_) => ShellCommand::Unknown(line.to_string()),
            },
            ("press", Some(target)) => ShellCommand::Button(target.to_string()),
            _ => ShellCommand::Unknown(line.to_string()),
        }
    }
}

/// Prints reminders to the terminal instead of a messenger chat.
#[derive(Debug, Default)]
struct TerminalReminders {
    next_id: AtomicI64,
}

#[async_trait]
impl ReminderSink for TerminalReminders {
    async fn send_reminder(
        &self,
        user: UserId,
        prompt: &ReminderPrompt,
    ) -> Result<MessageId, DuckieError> {
        let message = MessageId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        println!(
            "\n{} {}\n  [{}] /press {}\n  [{}] /press {}",
            format!("@{user}").dimmed(),
            prompt.text.yellow(),
            prompt.yes.label,
            prompt.yes.target,
            prompt.no.label,
            prompt.no.target,
        );
        Ok(message)
    }

    async fn delete_message(&self, user: UserId, message: MessageId) -> Result<(), DuckieError> {
        println!("{}", format!("(@{user}: reminder {message} removed)").dimmed());
        Ok(())
    }
}

/// Navigation state of the local users.
#[derive(Debug, Default)]
struct LocalNavigation {
    states: RwLock<HashMap<UserId, NavigationState>>,
}

impl LocalNavigation {
    async fn set(&self, user: UserId, state: NavigationState) {
        self.states.write().await.insert(user, state);
    }
}

#[async_trait]
impl NavigationProbe for LocalNavigation {
    async fn current_state(&self, user: UserId) -> Option<NavigationState> {
        self.states.read().await.get(&user).copied()
    }
}

/// The start menu, the only content node the shell knows.
struct ShellMenu {
    start_topic: String,
}

#[async_trait]
impl ContentResolver for ShellMenu {
    async fn resolve(&self, topic: &str) -> Result<Content, DuckieError> {
        if topic != self.start_topic {
            return Err(DuckieError::Internal(format!("unknown topic: {topic}")));
        }
        Ok(Content {
            text: "Главное меню".to_string(),
            buttons: vec![
                ContentButton::new("Темы", "/topics"),
                ContentButton::new("Интерактивный режим", "/chat"),
            ],
            image_path: None,
            video_path: None,
        })
    }
}

fn print_content(content: &Content) {
    println!("{}", content.text.bold());
    for button in &content.buttons {
        println!("  [{}] {}", button.label, button.target.cyan());
    }
}

fn print_help() {
    println!("  {}  enter interactive mode", "/chat".yellow());
    println!("  {}  leave interactive mode", "/exit".yellow());
    println!(
        "  {} {} {}  navigate (starts the inactivity timer)",
        "/menu".yellow(),
        "/topics".yellow(),
        "/lecture".yellow()
    );
    println!("  {}  act as another user", "/user <id>".yellow());
    println!("  {}  answer a reminder", "/press <target>".yellow());
    println!("  {}  leave the shell", "/quit".yellow());
}

/// Runs the `duckie shell` REPL until `/quit`, EOF or a shutdown signal.
pub async fn run_shell(config: DuckieConfig) -> Result<(), DuckieError> {
    let codec = PromptCodec::default();
    let gateway = Arc::new(InferenceGateway::new(
        Arc::new(OllamaLoader::from_config(&config.inference)),
        codec.clone(),
        InteractionJournal::from_config(&config.journal),
        GatewaySettings::from_config(&config.inference),
    ));
    if config.inference.preload {
        gateway.start()?;
    }

    let navigation = Arc::new(LocalNavigation::default());
    let watchdog = ActivityWatchdog::new(
        WatchdogSettings::from_config(&config.watchdog),
        Arc::new(TerminalReminders::default()),
    );
    let chat = InteractiveChat::new(
        Arc::new(SessionArbiter::new()),
        Arc::clone(&gateway),
        watchdog.clone(),
        Arc::new(ShellMenu {
            start_topic: config.interactive.start_topic.clone(),
        }),
        codec,
        ChatSettings::from_config(&config.interactive),
    );
    let yes_target = config.watchdog.yes_callback.clone();
    let no_target = config.watchdog.no_callback.clone();

    let cancel = duckie_agent::install_signal_handler();

    let mut editor = DefaultEditor::new()
        .map_err(|e| DuckieError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} shell", config.bot.name).bold().green());
    println!("Type {} for commands, {} to leave.\n", "/help".yellow(), "/quit".yellow());

    let mut user = UserId(1);
    navigation.set(user, NavigationState::Menu).await;

    loop {
        let prompt = format!("{}> ", format!("user{user}").green());
        let read = tokio::task::spawn_blocking(move || {
            let line = editor.readline(&prompt);
            (editor, line)
        });
        let (returned, line) = tokio::select! {
            joined = read => joined
                .map_err(|e| DuckieError::Internal(format!("readline task failed: {e}")))?,
            _ = cancel.cancelled() => break,
        };
        editor = returned;

        let line = match line {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };
        let _ = editor.add_history_entry(line.as_str());

        match ShellCommand::parse(&line) {
            ShellCommand::Empty => {}
            ShellCommand::Quit => break,
            ShellCommand::Help => print_help(),
            ShellCommand::Chat => {
                let reply = chat.enter(user, ChatId(user.0)).await;
                if matches!(reply, Reply::Entered { .. }) {
                    navigation.set(user, NavigationState::Chatting).await;
                }
                print_reply(&reply);
            }
            ShellCommand::Exit => {
                let reply = chat.exit(user).await;
                navigation.set(user, NavigationState::Menu).await;
                print_reply(&reply);
            }
            ShellCommand::Navigate(state) => {
                navigation.set(user, state).await;
                watchdog.start(user, Arc::clone(&navigation) as Arc<dyn NavigationProbe>);
                println!("{}", format!("({state})").dimmed());
            }
            ShellCommand::SwitchUser(id) => {
                user = UserId(id);
                let mut states = navigation.states.write().await;
                states.entry(user).or_insert(NavigationState::Menu);
                info!(user = %user, "switched local user");
            }
            ShellCommand::Button(target) if target == yes_target => {
                watchdog.start(user, Arc::clone(&navigation) as Arc<dyn NavigationProbe>);
                println!("{}", "Отлично, продолжаем!".green());
            }
            ShellCommand::Button(target) if target == no_target => {
                watchdog.reset(user);
                navigation.set(user, NavigationState::Menu).await;
                let reply = chat.exit(user).await;
                print_reply(&reply);
            }
            ShellCommand::Button(target) => {
                eprintln!("{}: no button `{target}`", "error".red());
            }
            ShellCommand::Text(text) => {
                let in_chat = navigation.current_state(user).await == Some(NavigationState::Chatting);
                if in_chat {
                    print_reply(&chat.handle_message(user, &text).await);
                } else {
                    println!("{}", "Type /chat to talk to the tutor.".dimmed());
                }
            }
            ShellCommand::Unknown(line) => {
                eprintln!("{}: unknown command `{line}`", "error".red());
            }
        }
    }

    if cancel.is_cancelled() {
        warn!("shutdown requested, leaving shell");
    }
    cancel.cancel();
    duckie_agent::drain(&gateway, &watchdog).await;
    Ok(())
}

fn print_reply(reply: &Reply) {
    match reply {
        Reply::Entered { text, exit_label } => {
            println!("{}", text.green());
            println!("  [{exit_label}] {}", "/exit".cyan());
        }
        Reply::Busy(text) | Reply::NotHolder(text) => println!("{}", text.yellow()),
        Reply::Answer(text) => println!("{} {text}", "duckie>".bold().blue()),
        Reply::Exited(content) => print_content(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(
            ShellCommand::parse("  сколько будет 2+2? "),
            ShellCommand::Text("сколько будет 2+2?".to_string())
        );
        assert_eq!(ShellCommand::parse("   "), ShellCommand::Empty);
    }

    #[test]
    fn navigation_commands_map_to_states() {
        assert_eq!(
            ShellCommand::parse("/topics"),
            ShellCommand::Navigate(NavigationState::Topics)
        );
        assert_eq!(
            ShellCommand::parse("/lecture"),
            ShellCommand::Navigate(NavigationState::Lecture)
        );
        assert_eq!(
            ShellCommand::parse("/menu"),
            ShellCommand::Navigate(NavigationState::Menu)
        );
    }

    #[test]
    fn user_switch_needs_numeric_id() {
        assert_eq!(ShellCommand::parse("/user 2"), ShellCommand::SwitchUser(2));
        assert!(matches!(ShellCommand::parse("/user bob"), ShellCommand::Unknown(_)));
        assert!(matches!(ShellCommand::parse("/user"), ShellCommand::Unknown(_)));
    }

    #[test]
    fn press_carries_target() {
        assert_eq!(
            ShellCommand::parse("/press still_learning"),
            ShellCommand::Button("still_learning".to_string())
        );
    }

    #[tokio::test]
    async fn shell_menu_resolves_only_start() {
        let menu = ShellMenu {
            start_topic: "start".to_string(),
        };
        assert_eq!(menu.resolve("start").await.unwrap().buttons.len(), 2);
        assert!(menu.resolve("algebra").await.is_err());
    }

    #[tokio::test]
    async fn terminal_reminder_ids_increase() {
        let sink = TerminalReminders::default();
        let prompt = ReminderPrompt {
            text: "?".to_string(),
            yes: ContentButton::new("yes", "still_learning"),
            no: ContentButton::new("no", "return_to_menu"),
        };
        let first = sink.send_reminder(UserId(1), &prompt).await.unwrap();
        let second = sink.send_reminder(UserId(1), &prompt).await.unwrap();
        assert_eq!(first, MessageId(1));
        assert_eq!(second, MessageId(2));
    }
}
