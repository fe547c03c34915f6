//! Terminal implementation of the operator console.

use console::{Term, style};
use std::io::{self, BufRead};
use strata_core::{Console, Menu};
use tracing::debug;

/// Outcome of parsing one line of menu input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Item at this position
    Pick(usize),
    /// Operator backed out
    Abort,
    /// Input did not name an item
    Invalid,
}

/// Interpret `input` against a menu of `len` items numbered from 1.
///
/// Empty input takes `default`; `q` aborts.
#[must_use]
pub fn parse_choice(input: &str, len: usize, default: Option<usize>) -> Choice {
    let input = input.trim();
    if input.is_empty() {
        return default.map_or(Choice::Invalid, Choice::Pick);
    }
    if input.eq_ignore_ascii_case("q") {
        return Choice::Abort;
    }

    match input.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Choice::Pick(n - 1),
        _ => Choice::Invalid,
    }
}

/// Console on the process terminal.
pub struct TermConsole {
    term: Term,
    closed: bool,
}

impl TermConsole {
    /// Console on standard output
    #[must_use]
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            closed: false,
        }
    }

    fn write(&self, text: &str) {
        if let Err(e) = self.term.write_str(text) {
            debug!("terminal write failed: {e}");
        }
    }

    fn write_line(&self, text: &str) {
        if let Err(e) = self.term.write_line(text) {
            debug!("terminal write failed: {e}");
        }
    }

    /// Read one line, or `None` at end of input.
    fn read_line(&mut self) -> Option<String> {
        if self.closed {
            return None;
        }

        // Term::read_line returns empty lines on a non-terminal, which would
        // hide end of input.
        let line = if self.term.is_term() {
            self.term.read_line()
        } else {
            let mut line = String::new();
            match io::stdin().lock().read_line(&mut line) {
                Ok(0) => {
                    self.closed = true;
                    return None;
                }
                Ok(_) => Ok(line.trim_end_matches(['\r', '\n']).to_string()),
                Err(e) => Err(e),
            }
        };

        match line {
            Ok(line) => Some(line),
            Err(e) => {
                debug!("terminal input closed: {e}");
                self.closed = true;
                None
            }
        }
    }

    fn render(&self, menu: &Menu<'_>, default: Option<usize>) {
        self.write_line("");
        self.write_line(&style(menu.title()).bold().to_string());

        for (index, item) in menu.items().iter().enumerate() {
            let number = format!("{:>3})", index + 1);
            let label = if item.is_selected() {
                style(format!("* {}", item.label())).green().bold().to_string()
            } else {
                format!("  {}", item.label())
            };

            if item.hint().is_empty() {
                self.write_line(&format!("{number} {label}"));
            } else {
                let hint = style(item.hint()).dim();
                self.write_line(&format!("{number} {label}  {hint}"));
            }
        }

        match default {
            Some(index) => self.write(&format!("Choice [{}] (q to go back): ", index + 1)),
            None => self.write("Choice (q to go back): "),
        }
    }
}

impl Default for TermConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TermConsole {
    fn prompt(&mut self, menu: &Menu<'_>, default: Option<usize>) -> Option<usize> {
        loop {
            self.render(menu, default);
            let input = self.read_line()?;

            match parse_choice(&input, menu.len(), default) {
                Choice::Pick(index) => return Some(index),
                Choice::Abort => return None,
                Choice::Invalid => {
                    let message = format!("Enter a number from 1 to {}", menu.len());
                    self.write_line(&style(message).yellow().to_string());
                }
            }
        }
    }

    fn read_value(&mut self, label: &str, current: &str) -> Option<String> {
        self.write(&format!("{label} [{current}]: "));
        self.read_line()
    }

    fn notify(&mut self, message: &str) {
        self.write_line(message);
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice_numbers() {
        assert_eq!(parse_choice("1", 3, None), Choice::Pick(0));
        assert_eq!(parse_choice(" 3 ", 3, None), Choice::Pick(2));
        assert_eq!(parse_choice("4", 3, None), Choice::Invalid);
        assert_eq!(parse_choice("0", 3, None), Choice::Invalid);
        assert_eq!(parse_choice("two", 3, None), Choice::Invalid);
    }

    #[test]
    fn test_parse_choice_default() {
        assert_eq!(parse_choice("", 3, Some(1)), Choice::Pick(1));
        assert_eq!(parse_choice("", 3, None), Choice::Invalid);
    }

    #[test]
    fn test_parse_choice_abort() {
        assert_eq!(parse_choice("q", 3, Some(0)), Choice::Abort);
        assert_eq!(parse_choice("Q", 3, None), Choice::Abort);
    }
}
