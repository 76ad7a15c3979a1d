//! Responsive breakpoint handling and CSS generation for a visual site
//! builder.
//!
//! - [`breakpoints`]: the breakpoint model, display and cascade order, validation and
//!   fragment merging.
//! - [`canvas`]: canvas width for the selected breakpoint.
//! - [`style`]: the CSS rule engine, the in-memory stylesheet model and the
//!   media condition simulator.

pub mod breakpoints;
pub mod canvas;
pub mod style;

pub use breakpoints::{cascade_order, group_breakpoints, Breakpoint, Breakpoints};
pub use canvas::{calc_canvas_width, CanvasWidthInput};
pub use style::css_engine::{CssEngine, EngineError};
pub use style::media_condition::{parse_media_condition, MediaCondition};
pub use style::simulator::MediaSimulator;
