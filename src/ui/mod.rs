//! UI components for Texpad

pub mod editor;
pub mod preview;
pub mod status_bar;
