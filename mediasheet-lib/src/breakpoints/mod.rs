//! Breakpoint model, classification and canonical ordering.
//!
//! A breakpoint is either width based (`min_width` and/or `max_width`), a
//! custom media condition, or the base breakpoint which carries neither and
//! applies unconditionally.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::style::media_condition::parse_media_condition;

pub mod builder;
pub mod merge;

/// A named responsive condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Breakpoint {
    pub fn base(id: &str, label: &str) -> Self {
        Breakpoint {
            id: id.to_string(),
            label: label.to_string(),
            min_width: None,
            max_width: None,
            condition: None,
        }
    }

    pub fn min(id: &str, label: &str, min_width: u32) -> Self {
        Breakpoint {
            min_width: Some(min_width),
            ..Breakpoint::base(id, label)
        }
    }

    pub fn max(id: &str, label: &str, max_width: u32) -> Self {
        Breakpoint {
            max_width: Some(max_width),
            ..Breakpoint::base(id, label)
        }
    }

    pub fn custom(id: &str, label: &str, condition: &str) -> Self {
        Breakpoint {
            condition: Some(condition.to_string()),
            ..Breakpoint::base(id, label)
        }
    }

    /// The condition with surrounding whitespace removed, if it is non-empty.
    pub fn trimmed_condition(&self) -> Option<&str> {
        self.condition
            .as_deref()
            .map(str::trim)
            .filter(|condition| !condition.is_empty())
    }
}

/// Breakpoints of one project keyed by id.
///
/// Iteration order carries no meaning; use [`group_breakpoints`] for display
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Breakpoints {
    pub by_id: HashMap<String, Breakpoint>,
}

impl Breakpoints {
    pub fn new() -> Self {
        Breakpoints {
            by_id: HashMap::new(),
        }
    }

    /// Inserts a breakpoint, replacing any previous one with the same id.
    pub fn insert(&mut self, breakpoint: Breakpoint) -> Option<Breakpoint> {
        self.by_id.insert(breakpoint.id.clone(), breakpoint)
    }

    pub fn get(&self, id: &str) -> Option<&Breakpoint> {
        self.by_id.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Breakpoint> {
        self.by_id.remove(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &Breakpoint> {
        self.by_id.values()
    }

    /// The unconditional breakpoint, if the project has one.
    pub fn base(&self) -> Option<&Breakpoint> {
        self.values().find(|breakpoint| {
            is_base_breakpoint(breakpoint) && !is_custom_breakpoint(breakpoint)
        })
    }

    /// Breakpoints in canonical display order.
    pub fn ordered(&self) -> Vec<Breakpoint> {
        let mut all: Vec<&Breakpoint> = self.values().collect();
        // HashMap order is arbitrary, so pin ties down by id first.
        all.sort_by(|a, b| a.id.cmp(&b.id));
        group_breakpoints(all).ordered()
    }
}

impl FromIterator<Breakpoint> for Breakpoints {
    fn from_iter<T: IntoIterator<Item = Breakpoint>>(iter: T) -> Self {
        let mut breakpoints = Breakpoints::new();
        for breakpoint in iter {
            breakpoints.insert(breakpoint);
        }
        breakpoints
    }
}

pub fn is_custom_breakpoint(breakpoint: &Breakpoint) -> bool {
    breakpoint.trimmed_condition().is_some()
}

/// True if the breakpoint has no width bounds.
///
/// Only widths are inspected, so a custom condition breakpoint also takes the
/// base path wherever widths are computed.
pub fn is_base_breakpoint(breakpoint: &Breakpoint) -> bool {
    breakpoint.min_width.is_none() && breakpoint.max_width.is_none()
}

/// True if the breakpoint has a non-empty condition or at least one width
/// bound.
pub fn is_valid_breakpoint(breakpoint: &Breakpoint) -> bool {
    is_custom_breakpoint(breakpoint)
        || breakpoint.min_width.is_some()
        || breakpoint.max_width.is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MediaGroup {
    MinWidth,
    Base,
    MaxWidth,
    Custom,
}

fn media_group(breakpoint: &Breakpoint) -> MediaGroup {
    if is_custom_breakpoint(breakpoint) {
        MediaGroup::Custom
    } else if breakpoint.min_width.is_some() {
        MediaGroup::MinWidth
    } else if breakpoint.max_width.is_some() {
        MediaGroup::MaxWidth
    } else {
        MediaGroup::Base
    }
}

/// Total order used for display: min-width breakpoints widest first, then
/// the base breakpoint, then max-width breakpoints widest first, then custom
/// conditions.
///
/// Breakpoints of the same group and width compare equal so stable sorts keep
/// their input order.
pub fn compare_media(a: &Breakpoint, b: &Breakpoint) -> Ordering {
    let (group_a, group_b) = (media_group(a), media_group(b));
    if group_a != group_b {
        return group_a.cmp(&group_b);
    }
    match group_a {
        MediaGroup::MinWidth => b.min_width.cmp(&a.min_width),
        MediaGroup::MaxWidth => b.max_width.cmp(&a.max_width),
        MediaGroup::Base | MediaGroup::Custom => Ordering::Equal,
    }
}

/// Order in which media blocks must be emitted so narrower ranges win: the
/// base breakpoint, then min-width breakpoints narrowest first, then
/// max-width breakpoints widest first, then custom conditions.
///
/// Rules generated per breakpoint share one specificity, so the block written
/// last takes effect wherever ranges overlap.
pub fn compare_cascade(a: &Breakpoint, b: &Breakpoint) -> Ordering {
    let (group_a, group_b) = (cascade_rank(media_group(a)), cascade_rank(media_group(b)));
    if group_a != group_b {
        return group_a.cmp(&group_b);
    }
    match media_group(a) {
        MediaGroup::MinWidth => a.min_width.cmp(&b.min_width),
        MediaGroup::MaxWidth => b.max_width.cmp(&a.max_width),
        MediaGroup::Base | MediaGroup::Custom => Ordering::Equal,
    }
}

fn cascade_rank(group: MediaGroup) -> u8 {
    match group {
        MediaGroup::Base => 0,
        MediaGroup::MinWidth => 1,
        MediaGroup::MaxWidth => 2,
        MediaGroup::Custom => 3,
    }
}

/// Breakpoints sorted by [`compare_cascade`]; ties keep their input order.
pub fn cascade_order<'a, I>(breakpoints: I) -> Vec<Breakpoint>
where
    I: IntoIterator<Item = &'a Breakpoint>,
{
    let mut ordered: Vec<Breakpoint> = breakpoints.into_iter().cloned().collect();
    ordered.sort_by(compare_cascade);
    ordered
}

/// Width based and custom breakpoints, each in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedBreakpoints {
    pub width_based: Vec<Breakpoint>,
    pub custom: Vec<Breakpoint>,
}

impl GroupedBreakpoints {
    pub fn ordered(self) -> Vec<Breakpoint> {
        let mut all = self.width_based;
        all.extend(self.custom);
        all
    }
}

pub fn group_breakpoints<'a, I>(breakpoints: I) -> GroupedBreakpoints
where
    I: IntoIterator<Item = &'a Breakpoint>,
{
    let (custom, mut width_based): (Vec<Breakpoint>, Vec<Breakpoint>) = breakpoints
        .into_iter()
        .cloned()
        .partition(is_custom_breakpoint);
    // `sort_by` is stable, equal widths keep their input order.
    width_based.sort_by(compare_media);
    GroupedBreakpoints {
        width_based,
        custom,
    }
}

/// The media predicate of a breakpoint, as written after `@media`.
pub fn media_text(breakpoint: &Breakpoint) -> String {
    if let Some(condition) = breakpoint.trimmed_condition() {
        return match parse_media_condition(condition) {
            Some(parsed) => format!("({}: {})", parsed.feature, parsed.value),
            None if condition.starts_with('(') => condition.to_string(),
            None => format!("({})", condition),
        };
    }

    let mut parts = Vec::new();
    if let Some(min_width) = breakpoint.min_width {
        parts.push(format!("(min-width: {}px)", min_width));
    }
    if let Some(max_width) = breakpoint.max_width {
        parts.push(format!("(max-width: {}px)", max_width));
    }
    if parts.is_empty() {
        return "all".to_string();
    }
    parts.join(" and ")
}
