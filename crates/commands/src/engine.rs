use {
    anyhow::Result,
    async_trait::async_trait,
    cahbot_common::{ChannelId, UserId},
    cahbot_sessions::Session,
    tracing::info,
};

/// Gameplay collaborator. Called after a registry change has committed, with
/// a snapshot of the affected game; never while the registry lock is held.
#[async_trait]
pub trait GameEngine: Send + Sync {
    async fn session_started(&self, session: &Session) -> Result<()>;

    async fn session_ended(&self, session: &Session) -> Result<()>;

    async fn session_moved(&self, session: &Session, from: ChannelId) -> Result<()>;

    async fn player_joined(&self, session: &Session, user: UserId) -> Result<()>;

    /// `session` is the game as it stood after the player was removed.
    async fn player_removed(&self, session: &Session, user: UserId) -> Result<()>;
}

/// Engine that only records lifecycle events in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEngine;

#[async_trait]
impl GameEngine for LoggingEngine {
    async fn session_started(&self, session: &Session) -> Result<()> {
        info!(
            session = %session.id(),
            channel = %session.channel_id(),
            guild = %session.guild_id(),
            vote_mode = session.vote_mode(),
            packs = ?session.packs(),
            "engine: game started"
        );
        Ok(())
    }

    async fn session_ended(&self, session: &Session) -> Result<()> {
        info!(session = %session.id(), channel = %session.channel_id(), "engine: game ended");
        Ok(())
    }

    async fn session_moved(&self, session: &Session, from: ChannelId) -> Result<()> {
        info!(
            session = %session.id(),
            from = %from,
            to = %session.channel_id(),
            "engine: game moved"
        );
        Ok(())
    }

    async fn player_joined(&self, session: &Session, user: UserId) -> Result<()> {
        info!(session = %session.id(), user = %user, "engine: player joined");
        Ok(())
    }

    async fn player_removed(&self, session: &Session, user: UserId) -> Result<()> {
        info!(session = %session.id(), user = %user, "engine: player removed");
        Ok(())
    }
}
