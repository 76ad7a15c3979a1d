//! Normalizes breakpoint form input into a [`Breakpoint`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{is_base_breakpoint, is_custom_breakpoint, Breakpoint};
use crate::breakpoints::merge::equal_media;
use crate::style::media_condition::parse_media_condition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftKind {
    /// "from this width and wider"
    MinWidth,
    /// "up to this width"
    MaxWidth,
    Condition,
}

/// Raw values from the breakpoint editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointDraft {
    pub label: String,
    pub kind: DraftKind,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreakpointError {
    #[error("breakpoint label must not be empty")]
    EmptyLabel,
    #[error("breakpoint '{0}' needs a width")]
    MissingWidth(String),
    #[error("breakpoint '{0}' needs a media condition")]
    MissingCondition(String),
    #[error("invalid media condition '{condition}' for breakpoint '{label}'")]
    InvalidCondition { label: String, condition: String },
}

pub fn build_breakpoint(id: &str, draft: &BreakpointDraft) -> Result<Breakpoint, BreakpointError> {
    let label = draft.label.trim();
    if label.is_empty() {
        return Err(BreakpointError::EmptyLabel);
    }

    let breakpoint = match draft.kind {
        DraftKind::MinWidth => {
            let width = draft
                .width
                .ok_or_else(|| BreakpointError::MissingWidth(label.to_string()))?;
            Breakpoint::min(id, label, width)
        }
        DraftKind::MaxWidth => {
            let width = draft
                .width
                .ok_or_else(|| BreakpointError::MissingWidth(label.to_string()))?;
            Breakpoint::max(id, label, width)
        }
        DraftKind::Condition => {
            let condition = draft
                .condition
                .as_deref()
                .map(str::trim)
                .filter(|condition| !condition.is_empty())
                .ok_or_else(|| BreakpointError::MissingCondition(label.to_string()))?;
            if parse_media_condition(condition).is_none() {
                return Err(BreakpointError::InvalidCondition {
                    label: label.to_string(),
                    condition: condition.to_string(),
                });
            }
            Breakpoint::custom(id, label, condition)
        }
    };

    log::debug!("built breakpoint {} ({})", breakpoint.id, breakpoint.label);
    Ok(breakpoint)
}

/// First breakpoint, other than `candidate` itself, with the same media.
pub fn find_duplicate<'a, I>(breakpoints: I, candidate: &Breakpoint) -> Option<&'a Breakpoint>
where
    I: IntoIterator<Item = &'a Breakpoint>,
{
    breakpoints
        .into_iter()
        .filter(|existing| existing.id != candidate.id)
        .find(|existing| equal_media(existing, candidate))
}

/// Number of unconditional base breakpoints; a project is expected to carry
/// at most one.
pub fn count_base_breakpoints<'a, I>(breakpoints: I) -> usize
where
    I: IntoIterator<Item = &'a Breakpoint>,
{
    breakpoints
        .into_iter()
        .filter(|breakpoint| is_base_breakpoint(breakpoint) && !is_custom_breakpoint(breakpoint))
        .count()
}
