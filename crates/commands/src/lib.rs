//! Chat command surface for card games.
//!
//! Parses `cah ...` messages, checks permissions through a
//! [`PermissionResolver`], drives the [`GameRegistry`](cahbot_sessions::GameRegistry)
//! and hands committed changes to a [`GameEngine`].

pub mod engine;
pub mod handler;
pub mod humanize;
pub mod parse;
pub mod permissions;

pub use {
    engine::{GameEngine, LoggingEngine},
    handler::{CommandContext, CommandHandler, describe},
    humanize::{format_pack_list, humanize_error},
    parse::{Command, ParseError, parse_command},
    permissions::{PermissionResolver, StaticPermissions},
};
