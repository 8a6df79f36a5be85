pub mod config;
pub mod error;
pub mod model;
pub mod navigation;
pub mod remote;
pub mod session;
pub mod tui_shell;
pub mod widget_cache;

pub use error::ApplinError;
