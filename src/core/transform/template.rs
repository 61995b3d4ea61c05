//! Recursive-descent parser for `{{name}}` placeholders inside template values.

use super::TransformError;
use indexmap::IndexMap;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A parsed piece of a template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart<'a> {
    Literal(&'a str),
    Variable { name: &'a str, position: usize },
}

/// Split a template into literal text and variable placeholders.
pub fn parse_template(input: &str) -> Result<Vec<TemplatePart<'_>>, TransformError> {
    let mut parser = Parser { input, pos: 0 };
    let mut parts = Vec::new();
    while parser.pos < input.len() {
        parts.push(parser.part()?);
    }
    Ok(parts)
}

/// Variable names referenced by a template, in first-occurrence order.
pub fn placeholder_names(input: &str) -> Result<Vec<&str>, TransformError> {
    let mut names: Vec<&str> = Vec::new();
    for part in parse_template(input)? {
        if let TemplatePart::Variable { name, .. } = part {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    Ok(names)
}

/// Substitute every placeholder with its binding. Substituted text is not re-scanned.
pub fn render(
    parts: &[TemplatePart<'_>],
    bindings: &IndexMap<String, String>,
) -> Result<String, TransformError> {
    let mut out = String::new();
    for part in parts {
        match part {
            TemplatePart::Literal(text) => out.push_str(text),
            TemplatePart::Variable { name, .. } => {
                let value = bindings
                    .get(*name)
                    .ok_or_else(|| TransformError::UnresolvedVariable {
                        name: (*name).to_string(),
                    })?;
                out.push_str(value);
            }
        }
    }
    Ok(out)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn part(&mut self) -> Result<TemplatePart<'a>, TransformError> {
        if self.rest().starts_with(OPEN) {
            return self.variable();
        }
        let start = self.pos;
        let len = self.rest().find(OPEN).unwrap_or(self.rest().len());
        self.pos += len;
        Ok(TemplatePart::Literal(&self.input[start..self.pos]))
    }

    fn variable(&mut self) -> Result<TemplatePart<'a>, TransformError> {
        let position = self.pos;
        self.pos += OPEN.len();
        self.skip_whitespace();
        let name_start = self.pos;
        while let Some(ch) = self.rest().chars().next() {
            if is_name_char(ch) {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        let name = &self.input[name_start..self.pos];
        self.skip_whitespace();

        if self.rest().starts_with(CLOSE) {
            if name.is_empty() {
                return Err(malformed(position, "empty variable name"));
            }
            self.pos += CLOSE.len();
            return Ok(TemplatePart::Variable { name, position });
        }
        match self.rest().chars().next() {
            None => Err(malformed(position, "unterminated placeholder")),
            Some(ch) => Err(malformed(
                self.pos,
                format!("unexpected character '{}' in variable name", ch),
            )),
        }
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.')
}

fn malformed(position: usize, reason: impl Into<String>) -> TransformError {
    TransformError::MalformedTemplate {
        position,
        reason: reason.into(),
    }
}
