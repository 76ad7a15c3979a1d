//! Canvas width for the selected breakpoint.
//!
//! Switching to a breakpoint lands the canvas at the narrowest width inside
//! that breakpoint's active range, unless the user resized the canvas to a
//! width of their own.

use crate::breakpoints::{is_base_breakpoint, Breakpoint};

/// The canvas is never narrower than this.
pub const MIN_CANVAS_WIDTH: u32 = 240;
/// Used when a breakpoint has no usable lower bound.
pub const DEFAULT_CANVAS_WIDTH: u32 = 320;

#[derive(Debug, Clone, Copy)]
pub struct CanvasWidthInput<'a> {
    pub breakpoints: &'a [Breakpoint],
    pub selected: &'a Breakpoint,
    pub workspace_width: u32,
    /// The current canvas width, if the canvas was already sized.
    pub canvas_width: Option<u32>,
}

/// Whether `canvas_width` was picked by the user rather than derived from a
/// breakpoint.
///
/// Widths sitting exactly on a breakpoint's `min_width` or one past its
/// `max_width` are the values this module produces, so they are not custom.
pub fn is_custom_canvas_width(
    breakpoints: &[Breakpoint],
    selected: &Breakpoint,
    canvas_width: u32,
) -> bool {
    if is_base_breakpoint(selected)
        && !breakpoints
            .iter()
            .any(|breakpoint| breakpoint.min_width.is_some())
    {
        return false;
    }
    let on_boundary = breakpoints.iter().any(|breakpoint| {
        breakpoint.min_width == Some(canvas_width)
            || breakpoint
                .max_width
                .map(|max_width| max_width.saturating_add(1))
                == Some(canvas_width)
    });
    !on_boundary
}

pub fn calc_canvas_width(input: CanvasWidthInput<'_>) -> u32 {
    let CanvasWidthInput {
        breakpoints,
        selected,
        workspace_width,
        canvas_width,
    } = input;

    if let Some(canvas_width) = canvas_width {
        if is_custom_canvas_width(breakpoints, selected, canvas_width) {
            return canvas_width;
        }
    }

    if is_base_breakpoint(selected) {
        if breakpoints.len() <= 1 {
            return workspace_width;
        }
        return base_canvas_width(breakpoints, workspace_width);
    }

    if let Some(min_width) = selected.min_width {
        return if min_width == 0 {
            DEFAULT_CANVAS_WIDTH
        } else {
            min_width
        };
    }

    narrowest_width_below(breakpoints, selected)
}

/// The base breakpoint is active between the widest max-width breakpoint and
/// the narrowest min-width breakpoint.
fn base_canvas_width(breakpoints: &[Breakpoint], workspace_width: u32) -> u32 {
    let lowest_min_width = breakpoints
        .iter()
        .filter_map(|breakpoint| breakpoint.min_width)
        .filter(|min_width| *min_width < workspace_width)
        .min()
        .unwrap_or(workspace_width);
    let highest_max_width = breakpoints
        .iter()
        .filter_map(|breakpoint| breakpoint.max_width)
        .filter(|max_width| *max_width > MIN_CANVAS_WIDTH)
        .max()
        .unwrap_or(MIN_CANVAS_WIDTH);

    lowest_min_width
        .saturating_sub(1)
        .max(highest_max_width.saturating_add(1))
}

/// A max-width breakpoint starts one pixel past the next narrower one.
fn narrowest_width_below(breakpoints: &[Breakpoint], selected: &Breakpoint) -> u32 {
    let mut max_widths: Vec<&Breakpoint> = breakpoints
        .iter()
        .filter(|breakpoint| breakpoint.max_width.is_some())
        .collect();
    max_widths.sort_by(|a, b| b.max_width.cmp(&a.max_width));

    let narrower = max_widths
        .iter()
        .position(|breakpoint| breakpoint.id == selected.id)
        .and_then(|index| max_widths.get(index + 1))
        .and_then(|breakpoint| breakpoint.max_width);

    match narrower {
        Some(max_width) => max_width.saturating_add(1),
        None => DEFAULT_CANVAS_WIDTH,
    }
}
