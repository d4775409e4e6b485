//! User interface glue for Matchday
//!
//! This crate turns the persisted theme mode into the palette screens render
//! with. Screens themselves live outside this workspace.
//!
//! # Example
//!
//! ```rust
//! use app_state::ThemeMode;
//! use app_ui::get_theme;
//!
//! let theme = get_theme(ThemeMode::Light);
//! assert!(!theme.is_dark());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod theme;

pub use theme::{dark_theme, get_theme, light_theme, Palette, Theme, ThemeProvider};
