use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use {
    cahbot_common::{ChannelId, GuildId, UserId},
    cahbot_packs::PackCatalog,
    tracing::debug,
};

#[cfg(feature = "metrics")]
use cahbot_metrics::{counter, gauge, names};

use crate::{
    error::{GameError, MoveFailure},
    index::GameIndex,
    session::{Participant, Session},
};

/// Seat limit used when none is configured.
pub const DEFAULT_MAX_PLAYERS: usize = 20;

/// What happened to a game when one of its players was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KickOutcome {
    /// The player left; the game continues with the others.
    Removed(Session),
    /// The player was the last one seated, so the game was destroyed.
    SessionEnded(Session),
}

impl KickOutcome {
    pub fn session(&self) -> &Session {
        match self {
            Self::Removed(s) | Self::SessionEnded(s) => s,
        }
    }

    pub fn ended(&self) -> bool {
        matches!(self, Self::SessionEnded(_))
    }
}

/// Process-wide authority over live games.
///
/// One `RwLock` covers the game store and both lookups, so each mutating
/// call commits all three together or not at all. Pack resolution happens
/// before the lock is taken, and nothing here blocks on I/O.
pub struct GameRegistry {
    index: RwLock<GameIndex>,
    catalog: Arc<dyn PackCatalog>,
    max_players: usize,
}

impl GameRegistry {
    pub fn new(catalog: Arc<dyn PackCatalog>) -> Self {
        Self {
            index: RwLock::new(GameIndex::default()),
            catalog,
            max_players: DEFAULT_MAX_PLAYERS,
        }
    }

    /// Override the per-game seat limit (minimum 1).
    pub fn with_max_players(mut self, max_players: usize) -> Self {
        self.max_players = max_players.max(1);
        self
    }

    pub fn catalog(&self) -> &Arc<dyn PackCatalog> {
        &self.catalog
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    fn read(&self) -> RwLockReadGuard<'_, GameIndex> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, GameIndex> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a game in `channel` with the creator as its first player.
    ///
    /// The channel check and the insert happen under one write lock, so of
    /// several racing creates for the same channel exactly one wins.
    pub fn create_game(
        &self,
        guild: GuildId,
        channel: ChannelId,
        creator: UserId,
        creator_name: &str,
        vote_mode: bool,
        packs: &[String],
    ) -> Result<Session, GameError> {
        let packs = self.catalog.resolve(packs).map_err(reject)?;
        let session = Session::new(
            guild,
            channel,
            creator,
            creator_name.to_string(),
            vote_mode,
            packs,
        );

        let active = {
            let mut index = self.write();
            if index.in_channel(channel).is_some() {
                return Err(reject(GameError::ChannelOccupied(channel)));
            }
            if index.of_user(creator).is_some() {
                return Err(reject(GameError::PlayerAlreadyInGame(creator)));
            }
            index.insert(session.clone());
            debug_check(&index);
            index.len()
        };

        debug!(
            session = %session.id(),
            channel = %channel,
            creator = %creator,
            vote_mode,
            packs = ?session.packs(),
            "game created"
        );
        #[cfg(feature = "metrics")]
        {
            counter!(names::GAMES_CREATED_TOTAL).increment(1);
            gauge!(names::GAMES_ACTIVE).set(active as f64);
        }
        #[cfg(not(feature = "metrics"))]
        let _ = active;
        Ok(session)
    }

    /// Destroy the game in `channel`. For callers that already passed an
    /// admin check.
    pub fn remove_game(&self, channel: ChannelId) -> Result<Session, GameError> {
        let (session, active) = {
            let mut index = self.write();
            let id = index
                .id_in_channel(channel)
                .ok_or_else(|| reject(GameError::NoActiveGame))?;
            let session = index.remove(id);
            debug_check(&index);
            (session, index.len())
        };
        ended(&session, "removed", active);
        Ok(session)
    }

    /// Self-service end: destroy the game `user` is seated in.
    pub fn try_admin_remove_game(&self, user: UserId) -> Result<Session, GameError> {
        let (session, active) = {
            let mut index = self.write();
            let id = index
                .id_of_user(user)
                .ok_or_else(|| reject(GameError::NoActiveGame))?;
            let session = index.remove(id);
            debug_check(&index);
            (session, index.len())
        };
        ended(&session, "self_removed", active);
        Ok(session)
    }

    /// Remove `target` from whichever game seats them. Whether `requester`
    /// may do so is decided by the caller.
    pub fn admin_kick_user(
        &self,
        requester: UserId,
        target: UserId,
    ) -> Result<KickOutcome, GameError> {
        let outcome = self.unseat(target)?;
        debug!(
            session = %outcome.session().id(),
            requester = %requester,
            target = %target,
            ended = outcome.ended(),
            "player kicked"
        );
        #[cfg(feature = "metrics")]
        counter!(names::PLAYERS_KICKED_TOTAL).increment(1);
        Ok(outcome)
    }

    /// Seat `user` in the game running in `channel`.
    pub fn join_game(
        &self,
        channel: ChannelId,
        user: UserId,
        name: &str,
    ) -> Result<Session, GameError> {
        let session = {
            let mut index = self.write();
            let id = index
                .id_in_channel(channel)
                .ok_or_else(|| reject(GameError::NoActiveGame))?;
            if index.of_user(user).is_some() {
                return Err(reject(GameError::PlayerAlreadyInGame(user)));
            }
            if index.get(id).participants().len() >= self.max_players {
                return Err(reject(GameError::GameFull {
                    max: self.max_players,
                }));
            }
            index.seat(id, Participant {
                user_id: user,
                name: name.to_string(),
            });
            debug_check(&index);
            index.get(id).clone()
        };
        debug!(session = %session.id(), user = %user, "player joined");
        Ok(session)
    }

    /// Give up the caller's own seat.
    pub fn leave_game(&self, user: UserId) -> Result<KickOutcome, GameError> {
        let outcome = self.unseat(user)?;
        debug!(
            session = %outcome.session().id(),
            user = %user,
            ended = outcome.ended(),
            "player left"
        );
        Ok(outcome)
    }

    fn unseat(&self, user: UserId) -> Result<KickOutcome, GameError> {
        let (outcome, active) = {
            let mut index = self.write();
            let (id, remaining) = index
                .unseat(user)
                .ok_or_else(|| reject(GameError::NoActiveGame))?;
            let outcome = if remaining == 0 {
                KickOutcome::SessionEnded(index.remove(id))
            } else {
                KickOutcome::Removed(index.get(id).clone())
            };
            debug_check(&index);
            (outcome, index.len())
        };
        if let KickOutcome::SessionEnded(session) = &outcome {
            ended(session, "emptied", active);
        }
        Ok(outcome)
    }

    /// Advisory lookup: the game in channel `identifier`, else the game the
    /// user `identifier` is seated in. The result may be stale by the time
    /// the caller acts on it.
    pub fn find_game_from_channel_or_user(&self, identifier: u64) -> Option<Session> {
        let index = self.read();
        index
            .in_channel(ChannelId(identifier))
            .or_else(|| index.of_user(UserId(identifier)))
            .cloned()
    }

    pub fn game_in_channel(&self, channel: ChannelId) -> Option<Session> {
        self.read().in_channel(channel).cloned()
    }

    pub fn game_of_user(&self, user: UserId) -> Option<Session> {
        self.read().of_user(user).cloned()
    }

    /// Relocate the game at `source` to `dest`. Returns false when the
    /// source is empty or the destination is taken at commit time.
    pub fn move_game_to(&self, source: ChannelId, dest: ChannelId) -> bool {
        self.try_move_game_to(source, dest).is_ok()
    }

    /// Like [`Self::move_game_to`] but reports why a move was refused and
    /// returns the relocated game.
    pub fn try_move_game_to(
        &self,
        source: ChannelId,
        dest: ChannelId,
    ) -> Result<Session, GameError> {
        if source == dest {
            return Err(reject(GameError::MoveFailed(MoveFailure::SameChannel)));
        }
        let session = {
            let mut index = self.write();
            let id = index
                .id_in_channel(source)
                .ok_or_else(|| reject(GameError::MoveFailed(MoveFailure::SourceEmpty)))?;
            if index.in_channel(dest).is_some() {
                return Err(reject(GameError::MoveFailed(
                    MoveFailure::DestinationOccupied,
                )));
            }
            index.relocate(id, dest);
            debug_check(&index);
            index.get(id).clone()
        };
        debug!(session = %session.id(), from = %source, to = %dest, "game moved");
        #[cfg(feature = "metrics")]
        counter!(names::GAMES_MOVED_TOTAL).increment(1);
        Ok(session)
    }

    /// Snapshot of every live game.
    pub fn list_games(&self) -> Vec<Session> {
        let mut games: Vec<_> = self.read().iter().cloned().collect();
        games.sort_by_key(Session::created_at);
        games
    }

    pub fn game_count(&self) -> usize {
        self.read().len()
    }

    /// Drop every live game, returning what was running.
    pub fn shutdown(&self) -> Vec<Session> {
        let drained = self.write().drain();
        for session in &drained {
            ended(session, "shutdown", 0);
        }
        debug!(count = drained.len(), "game registry shut down");
        drained
    }

    /// Panic unless the game store and both lookups agree.
    pub fn assert_consistent(&self) {
        self.read().assert_consistent();
    }
}

fn reject(err: impl Into<GameError>) -> GameError {
    let err = err.into();
    #[cfg(feature = "metrics")]
    counter!(names::REGISTRY_REJECTIONS_TOTAL, "kind" => err.kind()).increment(1);
    err
}

fn ended(session: &Session, reason: &'static str, active: usize) {
    debug!(session = %session.id(), channel = %session.channel_id(), reason, "game ended");
    #[cfg(feature = "metrics")]
    {
        counter!(names::GAMES_ENDED_TOTAL, "reason" => reason).increment(1);
        gauge!(names::GAMES_ACTIVE).set(active as f64);
    }
    #[cfg(not(feature = "metrics"))]
    let _ = active;
}

fn debug_check(index: &GameIndex) {
    if cfg!(debug_assertions) {
        index.assert_consistent();
    }
}
