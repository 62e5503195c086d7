//! UI widgets for the tank overlay.

pub mod help;
pub mod indicator;
pub mod status_bar;

pub use help::render_help;
pub use indicator::render_indicator;
pub use status_bar::render_status_bar;
