//! Typed arguments extracted from a matched step.

use std::fmt;

use super::pattern::ParamKind;
use crate::error::StepError;

/// One extracted argument.
#[derive(Debug, Clone, PartialEq)]
pub enum StepArg {
    Int(i64),
    Float(f64),
    Word(String),
    Str(String),
}

impl fmt::Display for StepArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepArg::Int(v) => write!(f, "{}", v),
            StepArg::Float(v) => write!(f, "{}", v),
            StepArg::Word(v) => f.write_str(v),
            StepArg::Str(v) => write!(f, "\"{}\"", v),
        }
    }
}

/// Ordered arguments for a step action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepArgs(Vec<StepArg>);

impl StepArgs {
    pub fn new(args: Vec<StepArg>) -> Self {
        Self(args)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn int(&self, index: usize) -> Result<i64, StepError> {
        match self.0.get(index) {
            Some(StepArg::Int(v)) => Ok(*v),
            other => Err(mismatch(index, ParamKind::Int, other)),
        }
    }

    pub fn float(&self, index: usize) -> Result<f64, StepError> {
        match self.0.get(index) {
            Some(StepArg::Float(v)) => Ok(*v),
            other => Err(mismatch(index, ParamKind::Float, other)),
        }
    }

    pub fn word(&self, index: usize) -> Result<&str, StepError> {
        match self.0.get(index) {
            Some(StepArg::Word(v)) => Ok(v),
            other => Err(mismatch(index, ParamKind::Word, other)),
        }
    }

    pub fn string(&self, index: usize) -> Result<&str, StepError> {
        match self.0.get(index) {
            Some(StepArg::Str(v)) => Ok(v),
            other => Err(mismatch(index, ParamKind::String, other)),
        }
    }
}

fn mismatch(index: usize, expected: ParamKind, found: Option<&StepArg>) -> StepError {
    StepError::Parameter {
        index,
        expected,
        raw: found.map_or_else(|| "<missing>".to_string(), ToString::to_string),
    }
}
