use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use {
    cahbot_common::{ChannelId, GuildId, UserId},
    serde::{Deserialize, Serialize},
};

/// Opaque identity of a game, stable for its whole lifetime (moves included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A user seated in a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: UserId,
    pub name: String,
}

/// One running game bound to a channel.
///
/// Values handed out by the registry are snapshots: they do not track later
/// changes to the live game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    guild_id: GuildId,
    channel_id: ChannelId,
    creator_id: UserId,
    creator_name: String,
    vote_mode: bool,
    packs: Vec<String>,
    participants: Vec<Participant>,
    created_at: u64,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl Session {
    pub(crate) fn new(
        guild_id: GuildId,
        channel_id: ChannelId,
        creator_id: UserId,
        creator_name: String,
        vote_mode: bool,
        packs: Vec<String>,
    ) -> Self {
        let creator = Participant {
            user_id: creator_id,
            name: creator_name.clone(),
        };
        Self {
            id: SessionId::new(),
            guild_id,
            channel_id,
            creator_id,
            creator_name,
            vote_mode,
            packs,
            participants: vec![creator],
            created_at: now_ms(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    pub fn creator_id(&self) -> UserId {
        self.creator_id
    }

    pub fn creator_name(&self) -> &str {
        &self.creator_name
    }

    /// Players vote on the winning card instead of a rotating card czar.
    pub fn vote_mode(&self) -> bool {
        self.vote_mode
    }

    /// Resolved pack names, in the order they were requested.
    pub fn packs(&self) -> &[String] {
        &self.packs
    }

    /// Seated players in join order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn is_participant(&self, user: UserId) -> bool {
        self.participants.iter().any(|p| p.user_id == user)
    }

    /// Creation time in milliseconds since the Unix epoch.
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub(crate) fn set_channel(&mut self, channel: ChannelId) {
        self.channel_id = channel;
    }

    pub(crate) fn add_participant(&mut self, participant: Participant) {
        self.participants.push(participant);
    }

    /// Returns whether the user was seated.
    pub(crate) fn remove_participant(&mut self, user: UserId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.user_id != user);
        self.participants.len() != before
    }
}
