//! Shared types used across cahbot crates.

pub mod types;

pub use types::{ChannelId, GuildId, ParseIdError, UserId};
