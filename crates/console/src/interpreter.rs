//! Command interpreter: surface syntax → canonical command.
//!
//! Two surfaces are accepted and produce the same [`Command`]:
//!
//! - verb-first: `update User 1234 first_name "Jane"`
//! - method-call: `User.update("1234", {"first_name": "Jane"})`
//!
//! The interpreter only splits the line. It does not consult storage or the
//! entity registry; attribute blobs are parsed by [`crate::attributes`] once
//! the executor has resolved the target.

use crate::attributes::parse_json_object;
use crate::error::CommandError;

/// Operations the console can dispatch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Verb {
    Create,
    Show,
    Destroy,
    All,
    Count,
    Update,
}

impl Verb {
    pub const ALL: [Verb; 6] = [
        Verb::Create,
        Verb::Show,
        Verb::Destroy,
        Verb::All,
        Verb::Count,
        Verb::Update,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::Show => "show",
            Verb::Destroy => "destroy",
            Verb::All => "all",
            Verb::Count => "count",
            Verb::Update => "update",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == name)
    }

    /// One-line usage shown by `help`.
    pub fn usage(self) -> &'static str {
        match self {
            Verb::Create => "create <class> [<attr>=\"<value>\" ...]",
            Verb::Show => "show <class> <id>",
            Verb::Destroy => "destroy <class> <id>",
            Verb::All => "all [<class>]",
            Verb::Count => "count <class>|all",
            Verb::Update => "update <class> <id> <attr> <value> | update <class> <id> {json}",
        }
    }
}

/// Canonical operation: `<verb> <type> <id> <attributes>`.
///
/// Absent parts are empty strings; handlers decide which ones they require.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: Verb,
    pub type_name: String,
    pub id: String,
    /// Attribute blob: positional tokens or a JSON object literal.
    pub attributes: String,
}

impl Command {
    /// Render the canonical verb-first line.
    pub fn to_line(&self) -> String {
        [self.verb.name(), &self.type_name, &self.id, &self.attributes]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One interpreted input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Quit,
    Help(Option<String>),
    Command(Command),
}

/// Interpret one raw input line.
pub fn parse(line: &str) -> Result<Input, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Empty);
    }
    if let Some(command) = parse_method_call(line)? {
        return Ok(Input::Command(command));
    }
    parse_verb_first(line)
}

/// Canonical verb-first rendering of a command line (`None` for lines that
/// are not commands: empty, `quit`, `help`).
pub fn normalize(line: &str) -> Result<Option<String>, CommandError> {
    Ok(match parse(line)? {
        Input::Command(command) => Some(command.to_line()),
        _ => None,
    })
}

/// Split off the first whitespace-delimited token.
fn next_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], s[idx..].trim_start()),
        None => (s, ""),
    }
}

fn strip_quotes(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '\'')
}

fn parse_verb_first(line: &str) -> Result<Input, CommandError> {
    let (word, rest) = next_token(line);
    let verb = match word {
        "quit" | "EOF" => return Ok(Input::Quit),
        "help" | "?" => {
            let (topic, _) = next_token(rest);
            return Ok(Input::Help((!topic.is_empty()).then(|| topic.to_string())));
        }
        other => Verb::from_name(other).ok_or_else(|| CommandError::UnknownSyntax(line.to_string()))?,
    };

    let (type_name, rest) = next_token(rest);
    let type_name = strip_quotes(type_name).to_string();

    // `create` takes no id: everything after the type is attributes.
    let (id, attributes) = if verb == Verb::Create {
        (String::new(), rest.trim().to_string())
    } else {
        let (id, rest) = next_token(rest);
        (strip_quotes(id).to_string(), rest.trim().to_string())
    };

    Ok(Input::Command(Command {
        verb,
        type_name,
        id,
        attributes,
    }))
}

/// Recognize `<Type>.<verb>(<args>)`.
///
/// Returns `Ok(None)` when the line is not in method-call form so that the
/// verb-first parser can take it.
fn parse_method_call(line: &str) -> Result<Option<Command>, CommandError> {
    let (Some(dot), Some(open), Some(close)) = (line.find('.'), line.find('('), line.rfind(')'))
    else {
        return Ok(None);
    };
    let type_name = &line[..dot];
    if !(dot < open && open < close) || type_name.is_empty() || type_name.contains(char::is_whitespace) {
        return Ok(None);
    }

    let verb_name = line[dot + 1..open].trim();
    let verb = Verb::from_name(verb_name)
        .ok_or_else(|| CommandError::InvalidVerb(verb_name.to_string()))?;

    let args = line[open + 1..close].trim();
    let (id, rest) = if verb == Verb::Create {
        ("", args)
    } else {
        match args.split_once(',') {
            Some((id, rest)) => (strip_quotes(id), rest.trim()),
            None => (strip_quotes(args), ""),
        }
    };

    let attributes = if parse_json_object(rest).is_some() {
        rest.to_string()
    } else {
        rest.replace(',', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    };

    Ok(Some(Command {
        verb,
        type_name: type_name.to_string(),
        id: id.to_string(),
        attributes,
    }))
}
