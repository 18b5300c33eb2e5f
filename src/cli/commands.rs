//! CLI command definitions and handlers

use clap::Subcommand;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use crate::cli::render::{render_state, usage_report};
use crate::core::cancel::CancelToken;
use crate::core::client::{DeeplClient, TranslationApi};
use crate::core::config::TranslatorConfig;
use crate::core::languages::{find_language, source_languages, Language};
use crate::core::session::{CycleHandle, SessionState, TranslationSession};

/// Commands for the DeepL translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate a single text
    Translate {
        /// Text to translate
        text: String,

        /// Target language (defaults to the configured one)
        #[arg(short, long)]
        target_lang: Option<String>,

        /// Source language (auto-detect if not specified)
        #[arg(long)]
        source_lang: Option<String>,
    },

    /// Translate every line read from stdin, superseding the previous one
    Interactive {
        /// Target language (defaults to the configured one)
        #[arg(short, long)]
        target_lang: Option<String>,

        /// Source language (auto-detect if not specified)
        #[arg(long)]
        source_lang: Option<String>,
    },

    /// Show character usage for the current billing period
    Usage,

    /// List source languages
    Languages {
        /// Ask the API instead of using the built-in table
        #[arg(long)]
        remote: bool,
    },
}

impl Commands {
    /// Apply per-command language flags on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut TranslatorConfig) {
        match self {
            Commands::Translate {
                target_lang,
                source_lang,
                ..
            }
            | Commands::Interactive {
                target_lang,
                source_lang,
            } => {
                if let Some(target) = target_lang {
                    config.target_lang = target.to_uppercase();
                }
                if let Some(source) = source_lang {
                    config.source_lang = Some(source.to_uppercase());
                }
            }
            Commands::Usage | Commands::Languages { .. } => {}
        }
    }
}

/// A line typed in interactive mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// Replace the text being translated
    Submit(String),
    /// `:source <CODE>` or `:source auto`
    Source(Option<String>),
    /// `:quit`
    Quit,
}

/// Interpret a line typed in interactive mode
pub fn parse_input(line: &str) -> InputCommand {
    let trimmed = line.trim();

    if trimmed == ":quit" || trimmed == ":q" {
        return InputCommand::Quit;
    }

    if let Some(rest) = trimmed.strip_prefix(":source") {
        let code = rest.trim();
        if code.is_empty() || code.eq_ignore_ascii_case("auto") {
            return InputCommand::Source(None);
        }
        return InputCommand::Source(Some(code.to_uppercase()));
    }

    InputCommand::Submit(trimmed.to_string())
}

/// Resolve a language code, keeping unknown codes so the API can judge them
fn language_for_code(code: &str) -> Language {
    find_language(code).unwrap_or_else(|| Language::new(code, code))
}

/// Build a session for the configured target and source languages
pub fn session_for(config: &TranslatorConfig, api: Arc<dyn TranslationApi>) -> TranslationSession {
    let source = config.source_lang.as_deref().map(language_for_code);
    TranslationSession::new(api, config.target_lang.clone()).with_source_language(source)
}

/// Prints settled states once each
#[derive(Debug, Default)]
pub struct StatePrinter {
    last: Option<SessionState>,
}

impl StatePrinter {
    /// Rendered output for `state`, if it is settled and not shown yet
    pub fn render_if_new(&mut self, state: &SessionState) -> Option<String> {
        if state.is_loading || self.last.as_ref() == Some(state) {
            return None;
        }
        self.last = Some(state.clone());
        render_state(state)
    }
}

/// Handle translate command
pub async fn handle_translate(config: TranslatorConfig, text: String) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    let api: Arc<dyn TranslationApi> = Arc::new(DeeplClient::new(config.clone())?);
    let session = session_for(&config, api);
    let mut notifications = session.notifications();

    info!("Translating to {}", config.target_lang);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Translating to {}...", config.target_lang));
    pb.enable_steady_tick(Duration::from_millis(100));

    session.submit(text).wait().await;
    pb.finish_and_clear();

    if let Ok(notification) = notifications.try_recv() {
        anyhow::bail!("{}: {}", notification.title, notification.message);
    }

    match render_state(&session.state()) {
        Some(output) => println!("{}", output),
        None => println!("Nothing to translate."),
    }

    Ok(())
}

/// Handle interactive command
pub async fn handle_interactive(config: TranslatorConfig) -> anyhow::Result<()> {
    let api: Arc<dyn TranslationApi> = Arc::new(DeeplClient::new(config.clone())?);
    let session = session_for(&config, api);

    println!(
        "Translating to {}. Type text, ':source <CODE>' or ':source auto', ':quit' to exit.",
        config.target_lang
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run_interactive(&session, stdin).await
}

/// Drive `session` from lines of `reader` until EOF or `:quit`
pub async fn run_interactive<R>(session: &TranslationSession, reader: R) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut states = session.subscribe();
    let mut notifications = session.notifications();
    let mut printer = StatePrinter::default();
    let mut last: Option<CycleHandle> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    InputCommand::Quit => break,
                    InputCommand::Submit(text) => last = Some(session.submit(text)),
                    InputCommand::Source(code) => {
                        let language = code.as_deref().map(language_for_code);
                        match &language {
                            Some(language) => println!("Translating from {}", language.name),
                            None => println!("Detecting source language"),
                        }
                        last = Some(session.set_source_language(language));
                    }
                }
            }
            Ok(()) = states.changed() => {
                let state = states.borrow_and_update().clone();
                if let Some(output) = printer.render_if_new(&state) {
                    println!("{}", output);
                }
            }
            Ok(notification) = notifications.recv() => {
                eprintln!("{}: {}", notification.title, notification.message);
            }
        }
    }

    if let Some(handle) = last {
        handle.wait().await;
    }
    if let Some(output) = printer.render_if_new(&session.state()) {
        println!("{}", output);
    }
    while let Ok(notification) = notifications.try_recv() {
        eprintln!("{}: {}", notification.title, notification.message);
    }

    Ok(())
}

/// Handle usage command
pub async fn handle_usage(config: TranslatorConfig) -> anyhow::Result<()> {
    let plan = config.plan;
    let client = DeeplClient::new(config)?;
    let usage = client.usage(&CancelToken::detached()).await?;

    println!("{}", usage_report(plan, &usage));

    Ok(())
}

/// Handle languages command
pub async fn handle_languages(config: TranslatorConfig, remote: bool) -> anyhow::Result<()> {
    let languages = if remote {
        let client = DeeplClient::new(config)?;
        client.languages(&CancelToken::detached()).await?
    } else {
        source_languages()
    };

    for language in languages {
        println!("{:<6} {}", language.code, language.name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Translation;
    use crate::core::testing::MockApi;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("Hello "), InputCommand::Submit("Hello".to_string()));
        assert_eq!(parse_input(""), InputCommand::Submit(String::new()));
        assert_eq!(parse_input(":q"), InputCommand::Quit);
        assert_eq!(parse_input(":source en"), InputCommand::Source(Some("EN".to_string())));
        assert_eq!(parse_input(":source auto"), InputCommand::Source(None));
        assert_eq!(parse_input(":source"), InputCommand::Source(None));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = TranslatorConfig {
            api_key: "key".to_string(),
            ..Default::default()
        };
        let command = Commands::Translate {
            text: "Hello".to_string(),
            target_lang: Some("de".to_string()),
            source_lang: Some("en".to_string()),
        };
        command.apply_overrides(&mut config);

        assert_eq!(config.target_lang, "DE");
        assert_eq!(config.source_lang.as_deref(), Some("EN"));
    }

    #[test]
    fn test_state_printer_skips_loading_and_duplicates() {
        let mut printer = StatePrinter::default();
        let mut state = SessionState {
            text: "Hello".to_string(),
            translation: Some(Translation {
                text: "Hallo".to_string(),
                detected_source_language: "EN".to_string(),
            }),
            is_loading: true,
            ..Default::default()
        };

        assert_eq!(printer.render_if_new(&state), None);

        state.is_loading = false;
        assert!(printer.render_if_new(&state).is_some());
        assert_eq!(printer.render_if_new(&state), None);
    }

    #[tokio::test]
    async fn test_session_for_uses_config_languages() {
        let api = Arc::new(MockApi::new());
        let config = TranslatorConfig {
            api_key: "key".to_string(),
            target_lang: "DE".to_string(),
            source_lang: Some("EN".to_string()),
            ..Default::default()
        };

        let session = session_for(&config, api.clone());
        session.submit("Hello").wait().await;

        let requests = api.requests();
        assert_eq!(requests[0].target_lang, "DE");
        assert_eq!(requests[0].source_lang.as_deref(), Some("EN"));
        assert_eq!(session.state().source_language.unwrap().name, "English");
    }

    #[tokio::test]
    async fn test_run_interactive_settles_on_last_line() {
        let api = Arc::new(MockApi::new());
        api.reply("Hello", "Hallo", "EN");
        api.reply("Good morning", "Guten Morgen", "EN");
        let session = TranslationSession::new(api.clone(), "DE");

        let input: &[u8] = b"Hello\n:source en\nGood morning\n";
        run_interactive(&session, input).await.unwrap();

        let state = session.state();
        assert_eq!(state.text, "Good morning");
        assert_eq!(state.translation.unwrap().text, "Guten Morgen");
        assert_eq!(state.source_language.unwrap().code, "EN");
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_run_interactive_stops_at_quit() {
        let api = Arc::new(MockApi::new());
        let session = TranslationSession::new(api.clone(), "DE");

        let input: &[u8] = b":quit\nHello\n";
        run_interactive(&session, input).await.unwrap();

        assert_eq!(api.translate_calls(), 0);
        assert_eq!(session.state().text, "");
    }
}
