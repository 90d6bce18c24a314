//! Core functionality for the document session, its collaborators and configuration

pub mod config;
pub mod editor;
pub mod environment;
pub mod error;
pub mod motion;
pub mod session;
pub mod status;
pub mod timer;
