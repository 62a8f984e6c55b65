//! Interactive onboarding runner.
//!
//! Walks the configured phases in order under one session id. Each phase
//! opens with an agent greeting, alternates turns until the user types
//! `/next`, and is saved as one transcript. Uses `rustyline` for
//! readline-style editing with persistent history.

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use parley_core::config::{Config, PhaseConfig};
use parley_core::types::{DisplayMessage, NewTranscript, Sender};
use parley_core::utils::{format_timestamp, get_history_path};
use parley_core::{ChatMessage, ChatRequest};
use parley_providers::{resolve, CompletionGateway, SEED_MESSAGE};
use parley_store::TranscriptStore;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Commands that finish the current phase.
const NEXT_COMMANDS: &[&str] = &["/next", "/done"];

/// Shown when the opening call fails. Never sent to the gateway.
const OPENING_FALLBACK: &str = "Hi! I'm your onboarding companion. What would you like me to call you?";

/// Shown when a turn fails. Never sent to the gateway.
const TURN_FALLBACK: &str = "I'm having trouble connecting. Could you try that again?";

/// Recorded as `userMetadata.client` on every transcript.
const CLIENT_NAME: &str = "parley-cli";

// ─────────────────────────────────────────────
// PhaseRun
// ─────────────────────────────────────────────

/// State of one phase in progress.
///
/// `history` holds exactly what the gateway saw plus its replies;
/// `messages` holds what the user saw, fallbacks included.
#[derive(Debug)]
struct PhaseRun<'a> {
    phase: &'a PhaseConfig,
    number: usize,
    start_time: DateTime<Utc>,
    history: Vec<ChatMessage>,
    messages: Vec<DisplayMessage>,
}

impl<'a> PhaseRun<'a> {
    fn new(phase: &'a PhaseConfig, number: usize) -> Self {
        Self {
            phase,
            number,
            start_time: Utc::now(),
            history: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Request for the greeting. Empty, so the gateway seeds it.
    fn opening_request(&self) -> ChatRequest {
        ChatRequest::new(self.phase.system_prompt.clone(), Vec::new())
    }

    fn record_opening(&mut self, reply: &str) {
        self.history.push(ChatMessage::user(SEED_MESSAGE));
        self.history.push(ChatMessage::assistant(reply));
        self.messages.push(DisplayMessage::now(Sender::Agent, reply));
    }

    /// Show the user's input and build the request carrying it.
    ///
    /// The input only joins `history` once a reply arrives.
    fn user_turn(&mut self, input: &str) -> ChatRequest {
        self.messages.push(DisplayMessage::now(Sender::User, input));
        let mut messages = self.history.clone();
        messages.push(ChatMessage::user(input));
        ChatRequest::new(self.phase.system_prompt.clone(), messages)
    }

    fn record_reply(&mut self, input: &str, reply: &str) {
        self.history.push(ChatMessage::user(input));
        self.history.push(ChatMessage::assistant(reply));
        self.messages.push(DisplayMessage::now(Sender::Agent, reply));
    }

    fn record_fallback(&mut self, text: &str) {
        self.messages.push(DisplayMessage::now(Sender::Agent, text));
    }

    fn into_transcript(self, session_id: &str) -> NewTranscript {
        NewTranscript {
            session_id: Some(session_id.to_string()),
            prompt_version: Some(self.phase.prompt_version.clone()),
            start_time: Some(format_timestamp(&self.start_time)),
            end_time: Some(format_timestamp(&Utc::now())),
            conversation_history: Some(self.history),
            messages: self.messages,
            user_metadata: Some(json!({
                "phase": self.number,
                "phaseKey": self.phase.key,
                "client": CLIENT_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            })),
        }
    }
}

// ─────────────────────────────────────────────
// Input
// ─────────────────────────────────────────────

/// Where user lines come from.
trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<String, ReadlineError>;

    /// Called with every accepted turn.
    fn remember(&mut self, _line: &str) {}
}

impl LineSource for Editor<(), DefaultHistory> {
    fn read_line(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        self.readline(prompt)
    }

    fn remember(&mut self, line: &str) {
        let _ = self.add_history_entry(line);
    }
}

// ─────────────────────────────────────────────
// Runner
// ─────────────────────────────────────────────

enum PhaseEnd {
    Finished,
    Quit,
}

/// Run every configured phase interactively.
pub async fn run(config: &Config, gateway: CompletionGateway, store: TranscriptStore) -> Result<()> {
    let target = resolve(gateway.default_model());
    helpers::print_banner(gateway.default_model(), &target.to_string());

    let session_id = Uuid::new_v4().to_string();
    let mut editor = create_editor()?;
    let saved = run_session(&config.phases, &session_id, &gateway, &store, &mut editor).await;

    save_history(&mut editor);
    store.close().await;

    println!(
        "{}",
        format!(
            "Session {session_id}: {saved} of {} phase(s) saved. Goodbye! 👋",
            config.phases.len()
        )
        .dimmed()
    );
    Ok(())
}

/// Walk `phases` in order under `session_id`. Returns how many were saved.
async fn run_session(
    phases: &[PhaseConfig],
    session_id: &str,
    gateway: &CompletionGateway,
    store: &TranscriptStore,
    input: &mut impl LineSource,
) -> usize {
    debug!(session = %session_id, phases = phases.len(), "starting onboarding");

    let total = phases.len();
    let mut saved = 0usize;

    for (idx, phase) in phases.iter().enumerate() {
        helpers::print_phase_header(idx + 1, total, &phase.label, &phase.prompt_version);

        let mut run = PhaseRun::new(phase, idx + 1);
        let end = run_phase(&mut run, gateway, input).await;

        if matches!(end, PhaseEnd::Quit) {
            println!("\n{}", "Phase not finished; nothing saved for it.".dimmed());
            break;
        }

        match store.insert(run.into_transcript(session_id)).await {
            Ok(receipt) => {
                saved += 1;
                println!(
                    "{} {}\n",
                    "✓ transcript saved".green(),
                    receipt.id.dimmed()
                );
            }
            Err(e) => {
                warn!(error = %e, prompt_version = %phase.prompt_version, "failed to save transcript");
                eprintln!("\n❌ Failed to save transcript: {e}\n");
            }
        }
    }

    saved
}

async fn run_phase(
    run: &mut PhaseRun<'_>,
    gateway: &CompletionGateway,
    input: &mut impl LineSource,
) -> PhaseEnd {
    helpers::print_thinking();
    match gateway.send_default(&run.opening_request()).await {
        Ok(response) => {
            helpers::clear_thinking();
            run.record_opening(&response.text);
            helpers::print_agent(&response.text);
        }
        Err(e) => {
            helpers::clear_thinking();
            warn!(error = %e, "opening call failed");
            run.record_fallback(OPENING_FALLBACK);
            helpers::print_agent(OPENING_FALLBACK);
        }
    }

    loop {
        let line = match input.read_line("You: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return PhaseEnd::Quit,
            Err(e) => {
                eprintln!("Input error: {e}");
                return PhaseEnd::Quit;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if is_exit_command(trimmed) {
            return PhaseEnd::Quit;
        }
        if is_next_command(trimmed) {
            return PhaseEnd::Finished;
        }

        input.remember(trimmed);

        let request = run.user_turn(trimmed);
        debug!(phase = run.number, turns = request.messages.len(), "sending turn");
        helpers::print_thinking();

        match gateway.send_default(&request).await {
            Ok(response) => {
                helpers::clear_thinking();
                run.record_reply(trimmed, &response.text);
                helpers::print_agent(&response.text);
            }
            Err(e) => {
                helpers::clear_thinking();
                warn!(error = %e, "turn failed");
                run.record_fallback(TURN_FALLBACK);
                helpers::print_agent(TURN_FALLBACK);
            }
        }
    }
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = get_history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = get_history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

fn is_next_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    NEXT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
