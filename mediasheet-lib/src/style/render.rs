//! Turns style declarations into CSS through a fresh [`CssEngine`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::breakpoints::{cascade_order, Breakpoint};
use crate::style::css_engine::{CssEngine, EngineError};
use crate::style::value::{Style, StyleValue};

/// One property value scoped to a breakpoint and a style source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDecl {
    pub breakpoint_id: String,
    pub style_source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub property: String,
    pub value: StyleValue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedStyles {
    pub css_text: String,
    /// Generated class names per style source, in rule order.
    pub class_names: HashMap<String, Vec<String>>,
}

type RuleKey = (String, String, Option<String>);

/// Renders `decls` with one rule per style source, breakpoint and state.
///
/// Breakpoints are registered in cascade order, so base styles come first and
/// each narrower range is written after the wider one it overrides. A
/// declaration that names an unregistered breakpoint fails the whole render.
pub fn render_styles(
    breakpoints: &[Breakpoint],
    decls: &[StyleDecl],
) -> Result<RenderedStyles, EngineError> {
    let mut engine = CssEngine::new();
    for breakpoint in cascade_order(breakpoints) {
        engine.add_breakpoint(&breakpoint);
    }

    let mut groups: IndexMap<RuleKey, Style> = IndexMap::new();
    for decl in decls {
        let key = (
            decl.style_source_id.clone(),
            decl.breakpoint_id.clone(),
            decl.state.clone(),
        );
        groups
            .entry(key)
            .or_default()
            .insert(decl.property.clone(), decl.value.clone());
    }

    let mut rendered = RenderedStyles::default();
    for ((style_source_id, breakpoint_id, state), style) in &groups {
        let handle = match state {
            Some(state) => engine.add_rule_with_state(style, breakpoint_id, state)?,
            None => engine.add_rule(style, breakpoint_id)?,
        };
        rendered
            .class_names
            .entry(style_source_id.clone())
            .or_default()
            .push(handle.class_name);
    }
    log::debug!(
        "rendered {} declarations into {} rules",
        decls.len(),
        groups.len()
    );

    rendered.css_text = engine.css_text();
    Ok(rendered)
}
