use {
    cahbot_common::{ChannelId, UserId},
    cahbot_packs::UnknownPack,
};

/// Why a move was refused. The game stays where it was in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveFailure {
    #[error("no game in the source channel")]
    SourceEmpty,
    #[error("destination channel already hosts a game")]
    DestinationOccupied,
    #[error("source and destination are the same channel")]
    SameChannel,
}

/// Failure kinds surfaced by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("channel {0} already hosts a game")]
    ChannelOccupied(ChannelId),

    #[error("unknown pack: {0}")]
    UnknownPack(String),

    #[error("no active game")]
    NoActiveGame,

    #[error("move failed: {0}")]
    MoveFailed(MoveFailure),

    #[error("user {0} is already seated in a game")]
    PlayerAlreadyInGame(UserId),

    #[error("game is full ({max} players)")]
    GameFull { max: usize },
}

impl GameError {
    /// Stable short name, used as a metrics label and in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChannelOccupied(_) => "channel_occupied",
            Self::UnknownPack(_) => "unknown_pack",
            Self::NoActiveGame => "no_active_game",
            Self::MoveFailed(_) => "move_failed",
            Self::PlayerAlreadyInGame(_) => "player_already_in_game",
            Self::GameFull { .. } => "game_full",
        }
    }
}

impl From<UnknownPack> for GameError {
    fn from(e: UnknownPack) -> Self {
        Self::UnknownPack(e.0)
    }
}
