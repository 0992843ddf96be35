//! Voice Clip Bot - save voice notes under a name, replay them by trigger
//!
//! This library exports the core modules for the binary and for testing
//! against other transports.

/// Clip storage: names, formats, registry, retention
pub mod clip;
/// Text command parsing
pub mod command;
/// Configuration management
pub mod config;
/// Local stdin/stdout transport
pub mod console;
/// Event dispatch and replies
pub mod dispatcher;
/// Error taxonomy
pub mod error;
/// Inbound event types
pub mod event;
/// Outbound transport port
pub mod messenger;
/// Pending upload correlation
pub mod pending;
/// Media arrival routing
pub mod router;
/// Shared bot state
pub mod state;
/// Clip name suggestions
pub mod suggest;
/// Logging setup
pub mod telemetry;

pub use dispatcher::Dispatcher;
pub use error::ClipError;
pub use event::{ChatId, InboundEvent, MediaAttachment, MediaKind};
pub use messenger::Messenger;
pub use state::BotState;
