//! Line-oriented prompts over any reader/writer pair.
//!
//! Every question returns `Ok(None)` once input is exhausted, which the
//! caller treats as "quit".

use std::{
  fmt::Display,
  io::{self, BufRead, Write},
};

use donor_intake::{Notice, NoticeKind};

/// Answer that empties a field that has a current value.
pub const CLEAR: &str = "-";

pub struct Prompt<R, W> {
  pub(crate) input:  R,
  pub(crate) output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
  pub fn new(input: R, output: W) -> Self { Self { input, output } }

  pub fn say(&mut self, text: impl Display) -> io::Result<()> {
    writeln!(self.output, "{text}")
  }

  /// One trimmed line.
  pub fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
    write!(self.output, "{label}: ")?;
    self.output.flush()?;
    let mut line = String::new();
    if self.input.read_line(&mut line)? == 0 {
      return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
  }

  /// Like [`Prompt::ask`], but an empty answer keeps `current` and [`CLEAR`]
  /// empties it.
  pub fn ask_default(&mut self, label: &str, current: &str) -> io::Result<Option<String>> {
    let label = if current.is_empty() {
      label.to_string()
    } else {
      format!("{label} [{current}]")
    };
    Ok(self.ask(&label)?.map(|answer| match answer.as_str() {
      "" => current.to_string(),
      CLEAR => String::new(),
      _ => answer,
    }))
  }

  /// A numbered menu. Returns the zero-based index of the choice.
  pub fn choose(&mut self, title: &str, options: &[&str]) -> io::Result<Option<usize>> {
    self.say(title)?;
    for (i, option) in options.iter().enumerate() {
      writeln!(self.output, "  {}) {option}", i + 1)?;
    }
    loop {
      let Some(answer) = self.ask("Choose")? else {
        return Ok(None);
      };
      match answer.parse::<usize>() {
        Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(n - 1)),
        _ => self.say(format!("Enter a number from 1 to {}.", options.len()))?,
      }
    }
  }

  pub fn confirm(&mut self, question: &str) -> io::Result<Option<bool>> {
    loop {
      let Some(answer) = self.ask(&format!("{question} (y/n)"))? else {
        return Ok(None);
      };
      match answer.to_ascii_lowercase().as_str() {
        "y" | "yes" => return Ok(Some(true)),
        "n" | "no" => return Ok(Some(false)),
        _ => {}
      }
    }
  }

  pub fn notice(&mut self, notice: &Notice) -> io::Result<()> {
    let marker = match notice.kind {
      NoticeKind::Info | NoticeKind::Confirm => "·",
      NoticeKind::Success => "✓",
      NoticeKind::Error => "✗",
    };
    writeln!(self.output, "{marker} {}: {}", notice.title, notice.message)
  }
}
