pub mod config;
pub mod document;
pub mod editor;
pub mod render;
pub mod shortcut;
pub mod store;
pub mod theme;
