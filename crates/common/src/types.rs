use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Error returned when a chat platform identifier cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier: {0:?}")]
pub struct ParseIdError(pub String);

/// Parse a raw snowflake, accepting the `<#123>` / `<@123>` / `<@!123>`
/// mention forms chat platforms use.
fn parse_snowflake(raw: &str) -> Result<u64, ParseIdError> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .map(|s| s.trim_start_matches(['#', '@', '!']))
        .unwrap_or(trimmed);
    inner
        .parse::<u64>()
        .map_err(|_| ParseIdError(raw.to_string()))
}

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(v: u64) -> Self {
                Self(v)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_snowflake(s).map(Self)
            }
        }
    };
}

snowflake_id!(
    /// A guild (server) on the chat platform.
    GuildId
);
snowflake_id!(
    /// A text channel or thread a game can be bound to.
    ChannelId
);
snowflake_id!(
    /// A chat platform user.
    UserId
);
