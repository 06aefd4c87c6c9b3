//! Phrase patterns with typed placeholders.
//!
//! `the client receives status code {int}` compiles to an anchored regex
//! with one capture per placeholder. Captures are converted to their
//! declared kind when a step matches.

use std::fmt;

use regex::Regex;

use super::args::{StepArg, StepArgs};
use crate::error::{RegistryError, StepError};

/// Type of a placeholder in a phrase pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// `{int}`: signed 64-bit integer.
    Int,
    /// `{float}`: decimal number.
    Float,
    /// `{word}`: run of non-whitespace.
    Word,
    /// `{string}`: double-quoted text, quotes stripped.
    String,
}

impl ParamKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(ParamKind::Int),
            "float" => Some(ParamKind::Float),
            "word" => Some(ParamKind::Word),
            "string" => Some(ParamKind::String),
            _ => None,
        }
    }

    fn capture(self) -> &'static str {
        match self {
            ParamKind::Int => r"(-?\d+)",
            ParamKind::Float => r"(-?\d*\.?\d+)",
            ParamKind::Word => r"(\S+)",
            ParamKind::String => r#""([^"]*)""#,
        }
    }

    /// Convert captured text, or fail with a typed `Parameter` error.
    fn convert(self, index: usize, raw: &str) -> Result<StepArg, StepError> {
        let invalid = || StepError::Parameter {
            index,
            expected: self,
            raw: raw.to_string(),
        };
        match self {
            ParamKind::Int => raw.parse().map(StepArg::Int).map_err(|_| invalid()),
            ParamKind::Float => raw.parse().map(StepArg::Float).map_err(|_| invalid()),
            ParamKind::Word => Ok(StepArg::Word(raw.to_string())),
            ParamKind::String => Ok(StepArg::Str(raw.to_string())),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Int => "int",
            ParamKind::Float => "float",
            ParamKind::Word => "word",
            ParamKind::String => "string",
        };
        f.write_str(name)
    }
}

/// Compiled phrase pattern.
#[derive(Debug, Clone)]
pub struct StepPattern {
    raw: String,
    kinds: Vec<ParamKind>,
    regex: Regex,
}

impl StepPattern {
    pub fn parse(pattern: &str) -> Result<Self, RegistryError> {
        let mut source = String::from("^");
        let mut kinds = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(RegistryError::UnbalancedBrace(pattern.to_string())),
                            c => name.push(c),
                        }
                    }
                    if !closed {
                        return Err(RegistryError::UnbalancedBrace(pattern.to_string()));
                    }
                    let kind = ParamKind::from_name(&name).ok_or_else(|| {
                        RegistryError::UnknownPlaceholder {
                            pattern: pattern.to_string(),
                            name: name.clone(),
                        }
                    })?;
                    source.push_str(&regex::escape(&literal));
                    literal.clear();
                    source.push_str(kind.capture());
                    kinds.push(kind);
                }
                '}' => return Err(RegistryError::UnbalancedBrace(pattern.to_string())),
                c => literal.push(c),
            }
        }
        source.push_str(&regex::escape(&literal));
        source.push('$');

        Ok(Self {
            raw: pattern.to_string(),
            kinds,
            regex: Regex::new(&source)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Ordered placeholder kinds.
    pub fn param_kinds(&self) -> &[ParamKind] {
        &self.kinds
    }

    /// Cheap match test without parameter conversion.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Match `text` and extract typed arguments.
    ///
    /// `None` if the text does not match. `Some(Err)` if it matches but a
    /// capture cannot be converted to its declared kind.
    pub fn extract(&self, text: &str) -> Option<Result<StepArgs, StepError>> {
        let captures = self.regex.captures(text)?;
        let args = self
            .kinds
            .iter()
            .enumerate()
            .map(|(index, kind)| {
                let raw = captures.get(index + 1).map_or("", |m| m.as_str());
                kind.convert(index, raw)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(StepArgs::new);
        Some(args)
    }
}

impl PartialEq for StepPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl fmt::Display for StepPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
