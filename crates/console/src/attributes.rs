//! Attribute blob parsing for `create` and `update`.

use serde_json::{Map, Value as JsonValue};

use hbnb_core::{DomainResult, Entity};

use crate::error::CommandError;

/// Raw value of one attribute assignment, before registry coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrInput {
    /// Console text (also JSON strings).
    Text(String),
    /// Any other JSON value: numbers, booleans, arrays.
    Json(JsonValue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub value: AttrInput,
}

impl Assignment {
    fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AttrInput::Text(value.into()),
        }
    }

    /// Coerce through the registry and store on `entity`.
    pub fn apply(&self, entity: &mut Entity) -> DomainResult<()> {
        match &self.value {
            AttrInput::Text(raw) => entity.assign_str(&self.name, raw),
            AttrInput::Json(value) => entity.assign_json(&self.name, value),
        }
    }
}

/// Parse `blob` as a JSON object literal.
///
/// Single-quoted literals (`{'name': 'x'}`) are accepted as well.
pub fn parse_json_object(blob: &str) -> Option<Map<String, JsonValue>> {
    let blob = blob.trim();
    if !(blob.starts_with('{') && blob.ends_with('}')) {
        return None;
    }
    let parsed = serde_json::from_str::<JsonValue>(blob)
        .or_else(|_| serde_json::from_str::<JsonValue>(&blob.replace('\'', "\"")))
        .ok()?;
    match parsed {
        JsonValue::Object(map) => Some(map),
        _ => None,
    }
}

/// Split on whitespace outside quotes. Quotes and escapes are kept.
fn split_raw(blob: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut quote: Option<char> = None;
    let mut start: Option<usize> = None;
    let mut escaped = false;

    for (idx, c) in blob.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            (None, c) if c.is_whitespace() => {
                if let Some(s) = start.take() {
                    tokens.push(&blob[s..idx]);
                }
                continue;
            }
            _ => {}
        }
        start.get_or_insert(idx);
    }
    if let Some(s) = start {
        tokens.push(&blob[s..]);
    }
    tokens
}

/// Remove quoting from one raw token. Returns the text and whether any part
/// of it was quoted.
fn unquote(raw: &str) -> (String, bool) {
    let mut out = String::with_capacity(raw.len());
    let mut quote: Option<char> = None;
    let mut quoted = false;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (_, '\\') if matches!(chars.peek(), Some('"' | '\'' | '\\')) => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => {
                quote = Some(c);
                quoted = true;
            }
            _ => out.push(c),
        }
    }
    (out, quoted)
}

/// Quote-aware tokenizer used by positional `update` arguments.
pub fn tokenize(blob: &str) -> Vec<String> {
    split_raw(blob).into_iter().map(|raw| unquote(raw).0).collect()
}

/// `name=value` tokens of a `create` line.
///
/// Quoted values have `_` replaced by a space. Tokens without `=` are skipped.
pub fn parse_create(blob: &str) -> Result<Vec<Assignment>, CommandError> {
    let mut assignments = Vec::new();
    for raw in split_raw(blob) {
        let Some((name, value)) = raw.split_once('=') else {
            tracing::debug!(token = raw, "skipping create token without '='");
            continue;
        };
        let (mut value, quoted) = unquote(value);
        if quoted {
            value = value.replace('_', " ");
        }
        if value.is_empty() {
            return Err(CommandError::MissingAttributeValue);
        }
        assignments.push(Assignment::text(unquote(name).0, value));
    }
    Ok(assignments)
}

/// Assignments of an `update` line: a JSON object or name/value pairs.
///
/// Empty text values are `MissingAttributeValue` in both forms.
pub fn parse_update(blob: &str) -> Result<Vec<Assignment>, CommandError> {
    if let Some(object) = parse_json_object(blob) {
        if object.is_empty() {
            return Err(CommandError::MissingAttributeName);
        }
        return object
            .into_iter()
            .map(|(name, value)| match value {
                JsonValue::String(s) if s.is_empty() => Err(CommandError::MissingAttributeValue),
                JsonValue::String(s) => Ok(Assignment::text(name, s)),
                other => Ok(Assignment {
                    name,
                    value: AttrInput::Json(other),
                }),
            })
            .collect();
    }

    let tokens = tokenize(blob);
    if tokens.is_empty() {
        return Err(CommandError::MissingAttributeName);
    }
    tokens
        .chunks(2)
        .map(|pair| match pair {
            [_, value] if value.is_empty() => Err(CommandError::MissingAttributeValue),
            [name, value] => Ok(Assignment::text(name.as_str(), value.as_str())),
            _ => Err(CommandError::MissingAttributeValue),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbnb_core::{AttrValue, EntityKind};
    use serde_json::json;

    #[test]
    fn create_tokens_respect_quotes_and_underscores() {
        let parsed =
            parse_create(r#"name="My_little_house" description="say \"hi\"" number_rooms=4"#)
                .unwrap();
        assert_eq!(
            parsed,
            vec![
                Assignment::text("name", "My little house"),
                Assignment::text("description", "say \"hi\""),
                Assignment::text("number_rooms", "4"),
            ]
        );
    }

    #[test]
    fn create_skips_tokens_without_equals() {
        let parsed = parse_create("stray name=\"Ohio\"").unwrap();
        assert_eq!(parsed, vec![Assignment::text("name", "Ohio")]);
        assert!(parse_create("").unwrap().is_empty());
    }

    #[test]
    fn create_empty_value_is_missing_value() {
        assert!(matches!(parse_create("name="), Err(CommandError::MissingAttributeValue)));
        assert!(matches!(parse_create("name=\"\""), Err(CommandError::MissingAttributeValue)));
    }

    #[test]
    fn update_positional_pairs() {
        assert_eq!(
            parse_update("name \"New York\"").unwrap(),
            vec![Assignment::text("name", "New York")]
        );
        assert!(matches!(parse_update(""), Err(CommandError::MissingAttributeName)));
        assert!(matches!(parse_update("name"), Err(CommandError::MissingAttributeValue)));
        assert!(matches!(parse_update("a 1 b"), Err(CommandError::MissingAttributeValue)));
    }

    #[test]
    fn update_rejects_empty_values_in_both_forms() {
        assert!(matches!(parse_update("name \"\""), Err(CommandError::MissingAttributeValue)));
        assert!(matches!(parse_update("name ''"), Err(CommandError::MissingAttributeValue)));
        assert!(matches!(
            parse_update(r#"{"name": ""}"#),
            Err(CommandError::MissingAttributeValue)
        ));
    }

    #[test]
    fn update_json_object_keeps_document_order() {
        let parsed = parse_update(r#"{"max_guest": 4, "name": "Loft", "amenity_ids": ["a1"]}"#).unwrap();
        let names: Vec<_> = parsed.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["max_guest", "name", "amenity_ids"]);
        assert_eq!(parsed[0].value, AttrInput::Json(json!(4)));
        assert_eq!(parsed[1].value, AttrInput::Text("Loft".into()));
    }

    #[test]
    fn single_quoted_json_is_accepted() {
        let object = parse_json_object("{'first_name': 'Jane'}").unwrap();
        assert_eq!(object["first_name"], json!("Jane"));
        assert!(parse_json_object("first_name Jane").is_none());
        assert!(parse_json_object("{not json}").is_none());
    }

    #[test]
    fn json_and_positional_updates_assign_the_same_value() {
        let mut by_json = hbnb_core::Entity::new(EntityKind::User);
        let mut by_tokens = by_json.clone();
        for a in parse_update(r#"{"first_name": "Jane"}"#).unwrap() {
            a.apply(&mut by_json).unwrap();
        }
        for a in parse_update("first_name Jane").unwrap() {
            a.apply(&mut by_tokens).unwrap();
        }
        assert_eq!(by_json, by_tokens);
        assert_eq!(by_json.get("first_name"), Some(&AttrValue::Text("Jane".into())));
    }

    #[test]
    fn tokenizer_keeps_apostrophes_inside_double_quotes() {
        assert_eq!(tokenize(r#"text "it's fine" x"#), ["text", "it's fine", "x"]);
    }
}
