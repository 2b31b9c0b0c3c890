use std::fs;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use ezhost_core::{PasteRequest, ScanEvent, CONFIRMATION_TOKEN};
use ezhost_engine::Session;
use ezhost_logging::ezhost_info;

use crate::cli::{Command, PasteArgs};
use crate::render;

/// Replaces a missing purge token with one read from `input`.
pub fn resolve_confirmation<R: BufRead, W: Write>(
    command: Command,
    input: &mut R,
    prompt: &mut W,
) -> Result<Command> {
    match command {
        Command::Purge { confirm: None } => {
            writeln!(
                prompt,
                "This permanently deletes every upload that still has a valid deletion URL."
            )?;
            write!(prompt, "Type '{CONFIRMATION_TOKEN}' to proceed: ")?;
            prompt.flush()?;
            let mut line = String::new();
            input.read_line(&mut line).context("failed to read confirmation")?;
            let token = line.trim_end_matches(['\r', '\n']).to_string();
            Ok(Command::Purge {
                confirm: Some(token),
            })
        }
        other => Ok(other),
    }
}

/// Runs one command. Results go to `out`, progress notes to `progress`.
pub fn execute<W: Write, P: Write>(
    command: Command,
    session: &mut Session,
    out: &mut W,
    progress: &mut P,
) -> Result<()> {
    match command {
        Command::Upload { file } => {
            let record = session.upload(&file)?;
            writeln!(out, "{}", render::created_message(&record))?;
        }
        Command::Shorten { url } => {
            let record = session.shorten(&url)?;
            writeln!(out, "{}", render::created_message(&record))?;
        }
        Command::Paste(args) => {
            let paste = paste_request(args)?;
            let record = session.paste(&paste)?;
            writeln!(out, "{}", render::created_message(&record))?;
        }
        Command::Delete { deletion_url } => {
            let outcome = session.delete(&deletion_url)?;
            writeln!(out, "{}", render::delete_message(&outcome))?;
            if !outcome.success {
                anyhow::bail!("the service did not confirm the deletion");
            }
        }
        Command::Info { url } => {
            let info = session.file_info(&url)?;
            writeln!(out, "{}", pretty_json(&info))?;
        }
        Command::History => list_history(session, out, progress)?,
        Command::Purge { confirm } => {
            let report = session.purge(confirm.as_deref().unwrap_or_default())?;
            writeln!(out, "{report}")?;
        }
    }
    Ok(())
}

fn list_history<W: Write, P: Write>(
    session: &mut Session,
    out: &mut W,
    progress: &mut P,
) -> Result<()> {
    let mut header_written = false;
    for event in session.list_with_status()? {
        match event {
            ScanEvent::Row(row) => {
                if !header_written {
                    writeln!(out, "{}", render::header_line())?;
                    header_written = true;
                }
                writeln!(out, "{}", render::row_line(&row))?;
            }
            ScanEvent::Progress { .. } => {
                if let Some(note) = event.note() {
                    writeln!(progress, "{note}")?;
                }
            }
            ScanEvent::Complete {
                total,
                valid,
                invalid,
            } => {
                writeln!(progress, "{}", event.note().unwrap_or_default())?;
                writeln!(out, "{}", render::summary_line(total, valid, invalid))?;
                ezhost_info!("History listed: total={} valid={}", total, valid);
            }
        }
        out.flush()?;
    }
    Ok(())
}

fn paste_request(args: PasteArgs) -> Result<PasteRequest> {
    let text = match (args.text, args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("failed to read paste content from {}", path.display()))?,
        (None, None) => String::new(),
    };
    Ok(PasteRequest {
        text,
        title: args.title,
        description: args.description,
        language: args.language,
    })
}

fn pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
