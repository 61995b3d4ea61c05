//! Dotted/bracketed addresses into form state.
//!
//! A path is an ordered list of segments. Rendering joins keys with `.` and
//! writes indices as `[n]`; keys that would not survive that rendering are
//! quoted as `["..."]`. Parsing accepts exactly what rendering produces, so
//! `path.to_string().parse::<FieldPath>()` always yields the same path.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("empty key at byte {0}")]
    EmptyKey(usize),
    #[error("unterminated bracket starting at byte {0}")]
    UnterminatedBracket(usize),
    #[error("invalid index '{text}' at byte {position}")]
    InvalidIndex { position: usize, text: String },
    #[error("unexpected character '{ch}' at byte {position}")]
    UnexpectedChar { position: usize, ch: char },
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: keys
                .into_iter()
                .map(|key| PathSegment::Key(key.into()))
                .collect(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    pub fn join(&self, other: &FieldPath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn parent(&self) -> Option<FieldPath> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

fn is_plain_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '$' | '@')
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(is_plain_char)
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if is_plain_key(key) => {
                    if position > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Key(key) => {
                    f.write_str("[\"")?;
                    for ch in key.chars() {
                        if matches!(ch, '"' | '\\') {
                            f.write_str("\\")?;
                        }
                        write!(f, "{}", ch)?;
                    }
                    f.write_str("\"]")?;
                }
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut segments = Vec::new();
        let bytes = input.as_bytes();
        let mut pos = 0;
        let mut expect_key = true;

        while pos < bytes.len() {
            match bytes[pos] {
                b'[' => {
                    let start = pos;
                    pos += 1;
                    if bytes.get(pos) == Some(&b'"') {
                        pos += 1;
                        let mut key = String::new();
                        loop {
                            let ch = input[pos..]
                                .chars()
                                .next()
                                .ok_or(PathParseError::UnterminatedBracket(start))?;
                            pos += ch.len_utf8();
                            match ch {
                                '\\' => {
                                    let escaped = input[pos..]
                                        .chars()
                                        .next()
                                        .ok_or(PathParseError::UnterminatedBracket(start))?;
                                    pos += escaped.len_utf8();
                                    key.push(escaped);
                                }
                                '"' => break,
                                other => key.push(other),
                            }
                        }
                        if bytes.get(pos) != Some(&b']') {
                            return Err(PathParseError::UnterminatedBracket(start));
                        }
                        pos += 1;
                        segments.push(PathSegment::Key(key));
                    } else {
                        let end = input[pos..]
                            .find(']')
                            .map(|offset| pos + offset)
                            .ok_or(PathParseError::UnterminatedBracket(start))?;
                        let text = &input[pos..end];
                        let index = text
                            .parse::<usize>()
                            .map_err(|_| PathParseError::InvalidIndex {
                                position: pos,
                                text: text.to_string(),
                            })?;
                        segments.push(PathSegment::Index(index));
                        pos = end + 1;
                    }
                    expect_key = false;
                }
                b'.' => {
                    if expect_key {
                        return Err(PathParseError::EmptyKey(pos));
                    }
                    pos += 1;
                    expect_key = true;
                    if pos == bytes.len() {
                        return Err(PathParseError::EmptyKey(pos));
                    }
                }
                _ => {
                    if !expect_key {
                        let ch = input[pos..].chars().next().unwrap_or_default();
                        return Err(PathParseError::UnexpectedChar { position: pos, ch });
                    }
                    let start = pos;
                    while pos < bytes.len() && !matches!(bytes[pos], b'.' | b'[') {
                        pos += 1;
                    }
                    let key = &input[start..pos];
                    if let Some((offset, ch)) = key.char_indices().find(|(_, ch)| !is_plain_char(*ch)) {
                        return Err(PathParseError::UnexpectedChar {
                            position: start + offset,
                            ch,
                        });
                    }
                    segments.push(PathSegment::Key(key.to_string()));
                    expect_key = false;
                }
            }
        }
        Ok(Self { segments })
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
