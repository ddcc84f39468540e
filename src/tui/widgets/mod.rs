//! Reusable UI widgets

pub mod preview;
pub mod progress;
pub mod sidebar;

pub use preview::render_preview;
pub use progress::render_progress;
pub use sidebar::render_sidebar;
