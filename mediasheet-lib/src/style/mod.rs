pub mod css_engine;
pub mod media_condition;
pub mod owned_css;
pub mod render;
pub mod simulator;
pub mod value;
