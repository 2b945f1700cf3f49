/// BookLens - AI-generated book landing page for the terminal.
///
/// Core library providing the generated book model, the Gemini content
/// and chat call sites, and the ratatui view layer.

pub mod config;
pub mod core;
pub mod tui;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
