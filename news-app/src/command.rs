//! Typed console commands.
//!
//! Rows are numbered from 1 on screen; intents carry 0-based page indices.

use news_core::Intent;

pub const HELP: &str = "commands: r = refresh, p N = pin row N, d N = delete row N, u = unpin, q = quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    Help,
    Quit,
}

pub fn parse(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Err("empty command".into());
    };
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(format!("too many arguments for {verb:?}"));
    }

    match (verb, arg) {
        ("r" | "refresh", None) => Ok(Command::Intent(Intent::Refresh)),
        ("u" | "unpin", None) => Ok(Command::Intent(Intent::Unpin)),
        ("q" | "quit", None) => Ok(Command::Quit),
        ("h" | "help" | "?", None) => Ok(Command::Help),
        ("p" | "pin", Some(row)) => row_index(row).map(|i| Command::Intent(Intent::Pin(i))),
        ("d" | "delete", Some(row)) => row_index(row).map(|i| Command::Intent(Intent::Delete(i))),
        ("p" | "pin" | "d" | "delete", None) => Err(format!("{verb:?} needs a row number")),
        _ => Err(format!("unknown command {line:?}")),
    }
}

fn row_index(row: &str) -> Result<usize, String> {
    match row.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("invalid row {row:?}")),
    }
}
