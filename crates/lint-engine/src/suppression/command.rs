//! Inline suppression commands
//!
//! A command is a comment of the form
//!
//! ```text
//! // lint:disable:next line_length todo - generated code
//! ```
//!
//! Commands without a modifier change the disabled set from their position
//! onwards. `previous`, `this` and `next` apply to a single line and are
//! [expanded](Command::expand) into a disable/enable pair.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use lint_rules::SourceFile;
use regex::Regex;

/// Keyword that introduces a command inside a comment.
pub const COMMAND_PREFIX: &str = "lint";

/// Separates the identifiers from a free-text explanation.
const COMMENT_DELIMITER: &str = " - ";

static COMMAND_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(//|/\*|#)\s*{COMMAND_PREFIX}:"))
        .expect("command pattern is a valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Enable,
    Disable,
}

impl Action {
    /// The action that cancels this one.
    pub fn inverse(self) -> Self {
        match self {
            Self::Enable => Self::Disable,
            Self::Disable => Self::Enable,
        }
    }

    fn parse(text: &str) -> Option<Self> {
        match text {
            "enable" => Some(Self::Enable),
            "disable" => Some(Self::Disable),
            _ => None,
        }
    }
}

/// Narrows a command to a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Previous,
    This,
    Next,
}

impl Modifier {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "previous" => Some(Self::Previous),
            "this" => Some(Self::This),
            "next" => Some(Self::Next),
            _ => None,
        }
    }
}

/// One parsed suppression command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub action: Action,
    pub identifiers: BTreeSet<String>,
    /// 1-based line the command takes effect on
    pub line: usize,
    /// Column the command takes effect from; `None` is the start of the line
    pub character: Option<usize>,
    pub modifier: Option<Modifier>,
    pub trailing_comment: Option<String>,
}

impl Command {
    pub fn new(action: Action, identifiers: impl IntoIterator<Item = impl Into<String>>, line: usize) -> Self {
        Self {
            action,
            identifiers: identifiers.into_iter().map(Into::into).collect(),
            line,
            character: None,
            modifier: None,
            trailing_comment: None,
        }
    }

    pub fn at_character(mut self, character: usize) -> Self {
        self.character = Some(character);
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    /// Parse the text of a command starting at its `lint:` keyword.
    ///
    /// Returns `None` for an unknown action or modifier, or when no
    /// identifier is given.
    pub fn parse(text: &str, line: usize, character: usize) -> Option<Self> {
        let body = text.strip_prefix(COMMAND_PREFIX)?.strip_prefix(':')?;
        let (verb, rest) = body.split_once(char::is_whitespace).unwrap_or((body, ""));

        let (action, modifier) = match verb.split_once(':') {
            Some((action, modifier)) => (Action::parse(action)?, Some(Modifier::parse(modifier)?)),
            None => (Action::parse(verb)?, None),
        };

        // The delimiter needs a leading space, which `rest` lost when the
        // verb was split off.
        let rest = format!(" {rest}");
        let (rules, trailing_comment) = match rest.split_once(COMMENT_DELIMITER) {
            Some((rules, comment)) => (rules.to_string(), Some(comment.trim_end().to_string())),
            None => (rest, None),
        };

        let identifiers: BTreeSet<String> = rules
            .split_whitespace()
            .filter(|token| *token != "*/")
            .map(str::to_string)
            .collect();
        if identifiers.is_empty() {
            return None;
        }

        Some(Self {
            action,
            identifiers,
            line,
            character: Some(character),
            modifier,
            trailing_comment,
        })
    }

    /// Rewrite a modified command as an unmodified disable/enable pair.
    pub fn expand(&self) -> Vec<Command> {
        let Some(modifier) = self.modifier else {
            return vec![self.clone()];
        };
        let line = match modifier {
            Modifier::Previous => self.line.saturating_sub(1),
            Modifier::This => self.line,
            Modifier::Next => self.line + 1,
        };
        vec![
            Command {
                action: self.action,
                identifiers: self.identifiers.clone(),
                line,
                character: None,
                modifier: None,
                trailing_comment: None,
            },
            Command {
                action: self.action.inverse(),
                identifiers: self.identifiers.clone(),
                line,
                character: Some(usize::MAX),
                modifier: None,
                trailing_comment: None,
            },
        ]
    }
}

/// Every command in `file` as written, in source order.
///
/// A command takes effect after the comment holding it, so its character is
/// the column just past the end of that comment.
pub fn parse_commands(file: &SourceFile) -> Vec<Command> {
    if !file.contents().contains(&format!("{COMMAND_PREFIX}:")) {
        return Vec::new();
    }

    let mut commands = Vec::new();
    for (idx, line) in file.lines().iter().enumerate() {
        for capture in COMMAND_START.captures_iter(line) {
            let (Some(opener), Some(whole)) = (capture.get(1), capture.get(0)) else {
                continue;
            };
            let keyword_start = whole.end() - COMMAND_PREFIX.len() - 1;
            let tail = &line[keyword_start..];

            let (text, comment_end) = if opener.as_str() == "/*" {
                match tail.find("*/") {
                    Some(close) => (&tail[..close], keyword_start + close + 2),
                    None => (tail, line.len()),
                }
            } else {
                (tail, line.len())
            };

            let character = line[..comment_end].chars().count() + 1;
            if let Some(command) = Command::parse(text, idx + 1, character) {
                commands.push(command);
            } else {
                tracing::debug!(line = idx + 1, text, "Ignoring invalid command");
            }
        }
    }
    commands
}

/// Expanded commands of `file`, ordered by position.
pub fn expanded_commands(file: &SourceFile) -> Vec<Command> {
    let mut commands: Vec<Command> = parse_commands(file).iter().flat_map(Command::expand).collect();
    commands.sort_by_key(|c| (c.line, c.character));
    commands
}
