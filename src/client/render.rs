use colored::Colorize;
use std::io::{ self, Write };

use super::session::ChatSession;
use crate::models::chat::{ Role, Turn };

pub const TITLE: &str = "Claude Chat";
const INDENT: &str = "        ";

/// Writes the conversation to a terminal-like sink.
///
/// Only turns that have not been printed yet are written, so the newest
/// message always ends up at the bottom of the scrollback.
pub struct Renderer<W: Write> {
    out: W,
    printed: usize,
    shown_error: Option<String>,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, printed: 0, shown_error: None }
    }

    pub fn header(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", TITLE.bold())?;
        writeln!(self.out, "{}", "Type a message and press Enter. Ctrl-D to quit.".dimmed())?;
        writeln!(self.out)
    }

    pub fn render(&mut self, session: &ChatSession) -> io::Result<()> {
        let turns = session.conversation().turns();
        if turns.len() < self.printed {
            self.printed = 0;
        }
        for turn in &turns[self.printed..] {
            write_bubble(&mut self.out, turn)?;
        }
        self.printed = turns.len();

        match session.error() {
            Some(error) if self.shown_error.as_deref() != Some(error) => {
                writeln!(self.out, "{}", format!("  ! {}", error).red())?;
                self.shown_error = Some(error.to_string());
            }
            Some(_) => {}
            None => self.shown_error = None,
        }
        self.out.flush()
    }

    pub fn prompt(&mut self, session: &ChatSession) -> io::Result<()> {
        if session.is_sending() {
            write!(self.out, "{} ", "...".dimmed())?;
        } else {
            write!(self.out, "{} ", ">".bold())?;
        }
        self.out.flush()
    }

    /// Ends the busy prompt line once the reply is in.
    pub fn end_line(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()
    }

    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", format!("  {}", text).dimmed())?;
        self.out.flush()
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

fn write_bubble<W: Write>(out: &mut W, turn: &Turn) -> io::Result<()> {
    let label = match turn.role() {
        Role::User => format!("{:>6} |", "you").blue().bold(),
        Role::Assistant => format!("{:>6} |", "claude").green().bold(),
    };
    let mut lines = turn.content().lines();
    writeln!(out, "{} {}", label, lines.next().unwrap_or(""))?;
    for line in lines {
        writeln!(out, "{}{}", INDENT, line)?;
    }
    Ok(())
}
