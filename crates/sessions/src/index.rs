use std::collections::HashMap;

use cahbot_common::{ChannelId, UserId};

use crate::session::{Participant, Session, SessionId};

/// Live games plus the two derived lookups.
///
/// Only ever touched under the registry lock. Every method leaves the three
/// maps agreeing with each other; a disagreement found on the way is a broken
/// invariant and panics.
#[derive(Debug, Default)]
pub(crate) struct GameIndex {
    /// session id → game
    sessions: HashMap<SessionId, Session>,
    /// channel → session id
    by_channel: HashMap<ChannelId, SessionId>,
    /// seated user → session id
    by_user: HashMap<UserId, SessionId>,
}

impl GameIndex {
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn in_channel(&self, channel: ChannelId) -> Option<&Session> {
        self.by_channel.get(&channel).map(|id| self.get(*id))
    }

    pub fn of_user(&self, user: UserId) -> Option<&Session> {
        self.by_user.get(&user).map(|id| self.get(*id))
    }

    pub fn id_in_channel(&self, channel: ChannelId) -> Option<SessionId> {
        self.by_channel.get(&channel).copied()
    }

    pub fn id_of_user(&self, user: UserId) -> Option<SessionId> {
        self.by_user.get(&user).copied()
    }

    pub fn get(&self, id: SessionId) -> &Session {
        match self.sessions.get(&id) {
            Some(s) => s,
            None => panic!("game index points at missing session {id}"),
        }
    }

    fn get_mut(&mut self, id: SessionId) -> &mut Session {
        match self.sessions.get_mut(&id) {
            Some(s) => s,
            None => panic!("game index points at missing session {id}"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Link a new game. Callers check channel and seat availability first.
    pub fn insert(&mut self, session: Session) {
        let id = session.id();
        assert!(
            !self.by_channel.contains_key(&session.channel_id()),
            "channel {} already indexed",
            session.channel_id()
        );
        self.by_channel.insert(session.channel_id(), id);
        for p in session.participants() {
            let prev = self.by_user.insert(p.user_id, id);
            assert!(prev.is_none(), "user {} seated twice", p.user_id);
        }
        self.sessions.insert(id, session);
    }

    /// Unlink a game and every seat pointing at it.
    pub fn remove(&mut self, id: SessionId) -> Session {
        let Some(session) = self.sessions.remove(&id) else {
            panic!("removing unknown session {id}");
        };
        let linked = self.by_channel.remove(&session.channel_id());
        assert_eq!(linked, Some(id), "channel index out of sync for {id}");
        for p in session.participants() {
            let seat = self.by_user.remove(&p.user_id);
            assert_eq!(seat, Some(id), "user index out of sync for {}", p.user_id);
        }
        session
    }

    pub fn seat(&mut self, id: SessionId, participant: Participant) {
        let prev = self.by_user.insert(participant.user_id, id);
        assert!(prev.is_none(), "user {} seated twice", participant.user_id);
        self.get_mut(id).add_participant(participant);
    }

    /// Free the user's seat. Returns the session id and how many players are
    /// still seated there.
    pub fn unseat(&mut self, user: UserId) -> Option<(SessionId, usize)> {
        let id = self.by_user.remove(&user)?;
        let session = self.get_mut(id);
        assert!(
            session.remove_participant(user),
            "user {user} indexed but not seated in {id}"
        );
        Some((id, session.participants().len()))
    }

    /// Rekey a game to another channel. Callers check the destination first.
    pub fn relocate(&mut self, id: SessionId, dest: ChannelId) {
        assert!(
            !self.by_channel.contains_key(&dest),
            "channel {dest} already indexed"
        );
        let source = self.get(id).channel_id();
        let linked = self.by_channel.remove(&source);
        assert_eq!(linked, Some(id), "channel index out of sync for {id}");
        self.by_channel.insert(dest, id);
        self.get_mut(id).set_channel(dest);
    }

    pub fn drain(&mut self) -> Vec<Session> {
        self.by_channel.clear();
        self.by_user.clear();
        self.sessions.drain().map(|(_, s)| s).collect()
    }

    /// Full cross-check of the three maps.
    pub fn assert_consistent(&self) {
        assert_eq!(
            self.sessions.len(),
            self.by_channel.len(),
            "session and channel index sizes differ"
        );
        for (channel, id) in &self.by_channel {
            assert_eq!(
                self.get(*id).channel_id(),
                *channel,
                "channel index points {channel} at a game located elsewhere"
            );
        }

        let mut seats = 0;
        for (id, session) in &self.sessions {
            assert!(
                !session.participants().is_empty(),
                "session {id} has no participants"
            );
            for p in session.participants() {
                assert_eq!(
                    self.by_user.get(&p.user_id),
                    Some(id),
                    "participant {} missing from user index",
                    p.user_id
                );
            }
            seats += session.participants().len();
        }
        assert_eq!(seats, self.by_user.len(), "stale entries in user index");
    }
}
