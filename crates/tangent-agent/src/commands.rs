//! REPL line parsing.
//!
//! Lines starting with `:` are admin commands; anything else is a message to
//! route for the current owner.

use chrono::Duration;

/// Hours of history `:transitions` shows when no window is given.
pub const DEFAULT_TRANSITION_HOURS: i64 = 24;

/// One parsed REPL line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Route the text for the current owner.
    Route(String),
    /// List live threads.
    Threads,
    /// List transitions within the window.
    Transitions(Duration),
    /// Run capacity reconciliation.
    Reconcile,
    /// Switch the current owner.
    Owner(String),
    /// Print the command list.
    Help,
    /// Leave the REPL.
    Quit,
    /// Blank line.
    Empty,
}

/// Why a command line was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError(pub String);

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseError {}

/// Command list shown by `:help`.
pub const HELP: &str = "\
:threads               live threads for the current owner
:transitions [hours]   transitions within the window (default 24)
:reconcile             enforce capacity limits and timeouts now
:owner <id>            switch owner
:help                  this list
:quit                  exit
anything else          route as a message";

impl Command {
    /// Parse one input line.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::Empty);
        }
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Self::Route(line.to_owned()));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();
        match (name, arg) {
            ("threads", None) => Ok(Self::Threads),
            ("transitions", None) => Ok(Self::Transitions(Duration::hours(
                DEFAULT_TRANSITION_HOURS,
            ))),
            ("transitions", Some(hours)) => hours
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .and_then(Duration::try_hours)
                .map(Self::Transitions)
                .ok_or_else(|| ParseError(format!("invalid hour count: {hours}"))),
            ("reconcile", None) => Ok(Self::Reconcile),
            ("owner", Some(owner)) => Ok(Self::Owner(owner.to_owned())),
            ("owner", None) => Err(ParseError(":owner needs an id".into())),
            ("help", None) => Ok(Self::Help),
            ("quit" | "q" | "exit", None) => Ok(Self::Quit),
            _ => Err(ParseError(format!("unknown command: {line}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn plain_text_is_routed() {
        assert_eq!(
            Command::parse("  I'll have a whiskey \n").unwrap(),
            Command::Route("I'll have a whiskey".into())
        );
    }

    #[test]
    fn blank_line_is_empty() {
        assert_eq!(Command::parse("   ").unwrap(), Command::Empty);
    }

    #[test]
    fn admin_commands() {
        assert_eq!(Command::parse(":threads").unwrap(), Command::Threads);
        assert_eq!(Command::parse(":reconcile").unwrap(), Command::Reconcile);
        assert_eq!(Command::parse(":q").unwrap(), Command::Quit);
        assert_eq!(
            Command::parse(":owner bob").unwrap(),
            Command::Owner("bob".into())
        );
    }

    #[test]
    fn transitions_window() {
        assert_eq!(
            Command::parse(":transitions").unwrap(),
            Command::Transitions(Duration::hours(24))
        );
        assert_eq!(
            Command::parse(":transitions 3").unwrap(),
            Command::Transitions(Duration::hours(3))
        );
        assert_matches!(Command::parse(":transitions zero"), Err(ParseError(_)));
        assert_matches!(Command::parse(":transitions -2"), Err(ParseError(_)));
    }

    #[test]
    fn bad_commands_are_rejected() {
        assert_matches!(Command::parse(":owner"), Err(ParseError(msg)) if msg.contains("needs an id"));
        assert_matches!(Command::parse(":frobnicate"), Err(ParseError(msg)) if msg.contains("unknown"));
        assert_matches!(Command::parse(":threads now"), Err(ParseError(_)));
    }
}
