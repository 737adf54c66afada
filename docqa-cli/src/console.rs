//! Interactive console over one [`RagSession`].

use std::path::Path;

use anyhow::Context;
use docqa_rag::{Answer, IndexSummary, RagSession};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

/// Longest chunk preview printed by `:sources`.
const PREVIEW_CHARS: usize = 160;

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `:load PATH`: index a new document.
    Load(String),
    /// `:sources`: show the context behind the last answer.
    Sources,
    /// `:history`: list the questions asked since the last build.
    History,
    /// `:clear`: forget the transcript.
    Clear,
    /// `:help`
    Help,
    /// `:quit` or `:exit`
    Quit,
    /// Anything that is not a command.
    Ask(String),
    /// Blank input.
    Empty,
    /// An unrecognised `:command`.
    Unknown(String),
}

impl Command {
    /// Parse one input line.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(command) = line.strip_prefix(':') else {
            return Self::Ask(line.to_string());
        };

        let (name, rest) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
        match name {
            "load" if !rest.trim().is_empty() => Self::Load(rest.trim().to_string()),
            "sources" => Self::Sources,
            "history" => Self::History,
            "clear" => Self::Clear,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

const HELP: &str = "\
Commands:
  :load PATH   index a .txt or .pdf file (replaces the current one)
  :sources     show the chunks behind the last answer
  :history     list questions asked since the last load
  :clear       forget the question history
  :quit        leave
Anything else is sent as a question.";

/// Read `path` and index it into `session`.
pub fn load_file(session: &mut RagSession, path: &Path) -> anyhow::Result<IndexSummary> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("not a file path: {}", path.display()))?;
    Ok(session.upload(file_name, &bytes)?)
}

fn print_summary(summary: &IndexSummary) {
    println!(
        "Indexed {}: {} chunks, {} terms.",
        summary.source_name, summary.chunk_count, summary.vocabulary_size
    );
}

/// Render the retrieved context of an answer, one block per chunk.
pub fn format_sources(answer: &Answer) -> String {
    if answer.sources.is_empty() {
        return "(no context retrieved)".to_string();
    }
    answer
        .sources
        .iter()
        .enumerate()
        .map(|(rank, retrieved)| {
            let preview: String = retrieved.chunk.text.chars().take(PREVIEW_CHARS).collect();
            let ellipsis = if retrieved.chunk.text.chars().count() > PREVIEW_CHARS { "..." } else { "" };
            format!(
                "Chunk {} | #{} | score: {:.4}\n  {}{}",
                rank + 1,
                retrieved.chunk.index,
                retrieved.score,
                preview.replace('\n', " "),
                ellipsis
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run the read-ask-print loop until `:quit` or end of input.
///
/// Every failure is printed as one line; the loop keeps going.
pub async fn run_console(session: &mut RagSession) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!("docqa: ask questions about a document. Type :help for commands.");
    if !session.is_ready() {
        println!("No document loaded yet. Use :load PATH.");
    }

    loop {
        let line = match editor.readline("docqa> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let _ = editor.add_history_entry(line.as_str());

        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Unknown(input) => println!("Unknown command: {input} (try :help)"),
            Command::Load(path) => match load_file(session, Path::new(&path)) {
                Ok(summary) => print_summary(&summary),
                Err(e) => println!("Failed to build index: {e:#}"),
            },
            Command::Sources => match session.transcript().last() {
                Some(turn) => println!("{}", format_sources(&turn.answer)),
                None => println!("No answers yet."),
            },
            Command::History => {
                for (i, turn) in session.transcript().iter().enumerate() {
                    println!("{}. {}", i + 1, turn.question);
                }
            }
            Command::Clear => session.clear_transcript(),
            Command::Ask(question) => match session.ask(&question).await {
                Ok(answer) => {
                    debug!(grounded = answer.grounded, sources = answer.sources.len(), "answered");
                    println!("{}", answer.text);
                }
                Err(e) => println!("Error while answering: {e}"),
            },
        }
    }

    Ok(())
}
