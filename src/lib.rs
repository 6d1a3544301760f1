//! Dars - a terminal study companion for Arabic school curricula
//!
//! Dars browses a grade → subject → unit → lesson curriculum fetched from a
//! backend, renders lesson content, objectives and practice questions, and
//! pairs them with a streaming chat tutor. Text selected in a lesson can be
//! sent to the tutor through a floating action popup.

pub mod api;
pub mod app;
pub mod config;
pub mod curriculum;
pub mod theme;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use theme::Theme;
