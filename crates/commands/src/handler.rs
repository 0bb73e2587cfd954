use std::sync::Arc;

use {
    cahbot_common::{ChannelId, GuildId, UserId},
    cahbot_sessions::{GameError, GameRegistry, KickOutcome, Session},
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use cahbot_metrics::{counter, names};

use crate::{
    engine::GameEngine,
    humanize::{format_pack_list, humanize_error},
    parse::{Command, ParseError, parse_command},
    permissions::PermissionResolver,
};

/// Where a command came from and who sent it.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub guild: GuildId,
    pub channel: ChannelId,
    pub author: UserId,
    pub author_name: String,
}

/// Maps chat commands onto registry operations.
///
/// Permission checks and engine notifications run outside registry calls,
/// on snapshots the registry returned.
pub struct CommandHandler {
    registry: Arc<GameRegistry>,
    engine: Arc<dyn GameEngine>,
    permissions: Arc<dyn PermissionResolver>,
    prefix: String,
}

impl CommandHandler {
    pub fn new(
        registry: Arc<GameRegistry>,
        engine: Arc<dyn GameEngine>,
        permissions: Arc<dyn PermissionResolver>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            engine,
            permissions,
            prefix: prefix.into(),
        }
    }

    pub fn registry(&self) -> &Arc<GameRegistry> {
        &self.registry
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Handle a raw chat message. Returns `None` if it is not addressed to us.
    pub async fn handle_message(&self, ctx: &CommandContext, text: &str) -> Option<String> {
        let reply = match parse_command(&self.prefix, text)? {
            Ok(cmd) => self.dispatch(ctx, cmd).await,
            Err(e) => {
                debug!(error = %e, text, "unparseable command");
                self.parse_failure(&e)
            },
        };
        Some(reply)
    }

    /// Run a parsed command and produce the reply text.
    pub async fn dispatch(&self, ctx: &CommandContext, cmd: Command) -> String {
        #[cfg(feature = "metrics")]
        counter!(names::COMMANDS_TOTAL, "command" => cmd.name()).increment(1);
        debug!(command = cmd.name(), channel = %ctx.channel, author = %ctx.author, "dispatching");

        let result = match cmd {
            Command::Create { vote_mode, packs } => self.create(ctx, vote_mode, &packs).await,
            Command::End => self.end(ctx).await,
            Command::Kick { user } => self.kick(ctx, user).await,
            Command::Packs => Ok(format_pack_list(&self.registry.catalog().list())),
            Command::Move { channel } => self.move_to(ctx, channel).await,
            Command::Join => self.join(ctx).await,
            Command::Leave => self.leave(ctx).await,
            Command::Help => Ok(self.usage()),
        };
        result.unwrap_or_else(|e| humanize_error(&e))
    }

    async fn create(
        &self,
        ctx: &CommandContext,
        vote_mode: bool,
        packs: &[String],
    ) -> Result<String, GameError> {
        let session = self.registry.create_game(
            ctx.guild,
            ctx.channel,
            ctx.author,
            &ctx.author_name,
            vote_mode,
            packs,
        )?;
        info!(channel = %ctx.channel, guild = %ctx.guild, "created a new game");
        self.notify("session_started", self.engine.session_started(&session).await);

        let mode = if session.vote_mode() {
            "vote mode"
        } else {
            "card czar mode"
        };
        Ok(format!(
            "Started a game in {mode} with packs: {}. Use `{} join` to play!",
            session.packs().join(", "),
            self.prefix
        ))
    }

    async fn end(&self, ctx: &CommandContext) -> Result<String, GameError> {
        let session = if self.is_admin(ctx).await {
            self.registry.remove_game(ctx.channel)?
        } else {
            self.registry.try_admin_remove_game(ctx.author)?
        };
        info!(channel = %session.channel_id(), by = %ctx.author, "game stopped");
        self.notify("session_ended", self.engine.session_ended(&session).await);
        Ok("Stopped the game".into())
    }

    async fn kick(&self, ctx: &CommandContext, target: UserId) -> Result<String, GameError> {
        if !self.is_admin(ctx).await {
            return Ok("You need admin permissions to kick players".into());
        }
        let outcome = self.registry.admin_kick_user(ctx.author, target)?;
        self.removed(outcome, target).await;
        Ok("User removed".into())
    }

    async fn move_to(&self, ctx: &CommandContext, dest: ChannelId) -> Result<String, GameError> {
        // Advisory only; the registry re-checks the destination atomically.
        if self
            .registry
            .find_game_from_channel_or_user(dest.get())
            .is_some()
        {
            return Ok("There is already a game in the new channel".into());
        }
        let session = self.registry.try_move_game_to(ctx.channel, dest)?;
        info!(from = %ctx.channel, to = %dest, guild = %ctx.guild, "moved a game");
        self.notify(
            "session_moved",
            self.engine.session_moved(&session, ctx.channel).await,
        );
        Ok("Cah moved".into())
    }

    async fn join(&self, ctx: &CommandContext) -> Result<String, GameError> {
        let session = self
            .registry
            .join_game(ctx.channel, ctx.author, &ctx.author_name)?;
        self.notify(
            "player_joined",
            self.engine.player_joined(&session, ctx.author).await,
        );
        Ok(format!(
            "{} joined the game ({} players)",
            ctx.author_name,
            session.participants().len()
        ))
    }

    async fn leave(&self, ctx: &CommandContext) -> Result<String, GameError> {
        let outcome = self.registry.leave_game(ctx.author)?;
        let ended = outcome.ended();
        self.removed(outcome, ctx.author).await;
        Ok(if ended {
            "Left the game. Nobody was left, so it has ended".into()
        } else {
            "Left the game".into()
        })
    }

    async fn removed(&self, outcome: KickOutcome, user: UserId) {
        match outcome {
            KickOutcome::Removed(session) => {
                self.notify("player_removed", self.engine.player_removed(&session, user).await);
            },
            KickOutcome::SessionEnded(session) => {
                self.notify("session_ended", self.engine.session_ended(&session).await);
            },
        }
    }

    async fn is_admin(&self, ctx: &CommandContext) -> bool {
        match self
            .permissions
            .is_admin(ctx.guild, ctx.channel, ctx.author)
            .await
        {
            Ok(admin) => admin,
            Err(e) => {
                warn!(error = %e, user = %ctx.author, "permission lookup failed, treating as non-admin");
                false
            },
        }
    }

    fn notify(&self, event: &'static str, result: anyhow::Result<()>) {
        if let Err(e) = result {
            warn!(event, error = %e, "game engine rejected notification");
        }
    }

    fn parse_failure(&self, err: &ParseError) -> String {
        match err {
            ParseError::UnknownCommand(cmd) => {
                format!("Unknown command `{cmd}`.\n{}", self.usage())
            },
            ParseError::MissingArgument(arg) => format!("Missing argument: {arg}"),
            ParseError::InvalidId(e) => format!("Not a valid user or channel: {}", e.0),
        }
    }

    fn usage(&self) -> String {
        let p = &self.prefix;
        format!(
            "Play cards against humanity!\n\
             `{p} create [-v] [packs...]` - create a game here, `*` for all packs, `-v` for vote mode\n\
             `{p} join` / `{p} leave` - take or give up a seat\n\
             `{p} end` - end the game\n\
             `{p} kick <user>` - remove a player (admin)\n\
             `{p} move <channel>` - move the game to another channel\n\
             `{p} packs` - list available packs"
        )
    }
}

/// Convenience for callers that want the snapshot a reply was based on.
pub fn describe(session: &Session) -> String {
    format!(
        "game {} in <#{}> by {} ({} players, packs: {})",
        session.id(),
        session.channel_id(),
        session.creator_name(),
        session.participants().len(),
        session.packs().join(", ")
    )
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{engine::LoggingEngine, permissions::StaticPermissions},
        async_trait::async_trait,
        cahbot_packs::StaticCatalog,
        std::sync::Mutex,
    };

    /// Engine that records every notification it receives.
    #[derive(Default)]
    struct RecordingEngine {
        events: Mutex<Vec<String>>,
    }

    impl RecordingEngine {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[async_trait]
    impl GameEngine for RecordingEngine {
        async fn session_started(&self, s: &Session) -> anyhow::Result<()> {
            self.push(format!("started {}", s.channel_id()));
            Ok(())
        }

        async fn session_ended(&self, s: &Session) -> anyhow::Result<()> {
            self.push(format!("ended {}", s.channel_id()));
            Ok(())
        }

        async fn session_moved(&self, s: &Session, from: ChannelId) -> anyhow::Result<()> {
            self.push(format!("moved {from}->{}", s.channel_id()));
            Ok(())
        }

        async fn player_joined(&self, _s: &Session, user: UserId) -> anyhow::Result<()> {
            self.push(format!("joined {user}"));
            Ok(())
        }

        async fn player_removed(&self, _s: &Session, user: UserId) -> anyhow::Result<()> {
            self.push(format!("removed {user}"));
            anyhow::bail!("engine hiccup")
        }
    }

    const ADMIN: UserId = UserId(1);

    fn handler_with(engine: Arc<dyn GameEngine>) -> CommandHandler {
        let registry = Arc::new(GameRegistry::new(Arc::new(StaticCatalog::builtin())));
        CommandHandler::new(
            registry,
            engine,
            Arc::new(StaticPermissions::new([ADMIN])),
            "cah",
        )
    }

    fn ctx(channel: u64, user: u64, name: &str) -> CommandContext {
        CommandContext {
            guild: GuildId(1),
            channel: ChannelId(channel),
            author: UserId(user),
            author_name: name.into(),
        }
    }

    #[tokio::test]
    async fn create_then_duplicate_create() {
        let engine = Arc::new(RecordingEngine::default());
        let h = handler_with(engine.clone());

        let reply = h
            .handle_message(&ctx(10, 5, "alice"), "cah create main -v")
            .await
            .unwrap();
        assert!(reply.contains("vote mode"), "{reply}");
        assert!(reply.contains("main"));

        let reply = h
            .handle_message(&ctx(10, 6, "bob"), "cah create")
            .await
            .unwrap();
        assert_eq!(reply, "There's already a game running in this channel");
        assert_eq!(engine.events(), vec!["started 10".to_string()]);
    }

    #[tokio::test]
    async fn non_admin_end_only_stops_own_game() {
        let engine = Arc::new(RecordingEngine::default());
        let h = handler_with(engine.clone());
        h.handle_message(&ctx(10, 5, "alice"), "cah create").await;

        let reply = h.handle_message(&ctx(10, 6, "bob"), "cah end").await.unwrap();
        assert_eq!(reply, "Couldn't find a game you're part of");
        assert!(h.registry().game_in_channel(ChannelId(10)).is_some());

        let reply = h
            .handle_message(&ctx(10, 5, "alice"), "cah end")
            .await
            .unwrap();
        assert_eq!(reply, "Stopped the game");
        assert!(h.registry().game_in_channel(ChannelId(10)).is_none());
        assert_eq!(engine.events(), vec!["started 10", "ended 10"]);
    }

    #[tokio::test]
    async fn admin_end_targets_channel() {
        let h = handler_with(Arc::new(LoggingEngine));
        h.handle_message(&ctx(10, 5, "alice"), "cah create").await;

        let reply = h.handle_message(&ctx(10, 1, "mod"), "cah end").await.unwrap();
        assert_eq!(reply, "Stopped the game");
        assert_eq!(h.registry().game_count(), 0);
    }

    #[tokio::test]
    async fn kick_requires_admin_and_survives_engine_errors() {
        let engine = Arc::new(RecordingEngine::default());
        let h = handler_with(engine.clone());
        h.handle_message(&ctx(10, 5, "alice"), "cah create").await;
        h.handle_message(&ctx(10, 6, "bob"), "cah join").await;

        let reply = h
            .handle_message(&ctx(10, 5, "alice"), "cah kick <@6>")
            .await
            .unwrap();
        assert_eq!(reply, "You need admin permissions to kick players");

        let reply = h
            .handle_message(&ctx(10, 1, "mod"), "cah kick <@6>")
            .await
            .unwrap();
        assert_eq!(reply, "User removed");
        assert!(h.registry().game_of_user(UserId(6)).is_none());

        let reply = h
            .handle_message(&ctx(10, 1, "mod"), "cah kick 5")
            .await
            .unwrap();
        assert_eq!(reply, "User removed");
        assert_eq!(h.registry().game_count(), 0);
        assert_eq!(engine.events(), vec![
            "started 10",
            "joined 6",
            "removed 6",
            "ended 10"
        ]);
    }

    #[tokio::test]
    async fn move_checks_destination_and_source() {
        let engine = Arc::new(RecordingEngine::default());
        let h = handler_with(engine.clone());
        h.handle_message(&ctx(10, 5, "alice"), "cah create").await;
        h.handle_message(&ctx(30, 7, "carol"), "cah create").await;

        let reply = h
            .handle_message(&ctx(10, 5, "alice"), "cah move <#30>")
            .await
            .unwrap();
        assert_eq!(reply, "There is already a game in the new channel");

        let reply = h
            .handle_message(&ctx(11, 5, "alice"), "cah move 20")
            .await
            .unwrap();
        assert_eq!(reply, "It seems that there is no game in the current channel");

        let reply = h
            .handle_message(&ctx(10, 5, "alice"), "cah move 20")
            .await
            .unwrap();
        assert_eq!(reply, "Cah moved");
        assert_eq!(
            h.registry().game_in_channel(ChannelId(20)).unwrap().creator_id(),
            UserId(5)
        );
        assert!(engine.events().contains(&"moved 10->20".to_string()));
    }

    #[tokio::test]
    async fn packs_and_help() {
        let h = handler_with(Arc::new(LoggingEngine));
        let reply = h.handle_message(&ctx(10, 5, "a"), "cah packs").await.unwrap();
        assert!(reply.starts_with("Available packs:"));
        assert!(reply.contains("`main` - "));

        let reply = h.handle_message(&ctx(10, 5, "a"), "cah").await.unwrap();
        assert!(reply.contains("cah create"));

        let reply = h.handle_message(&ctx(10, 5, "a"), "cah dance").await.unwrap();
        assert!(reply.starts_with("Unknown command `dance`"));

        assert!(h.handle_message(&ctx(10, 5, "a"), "good game").await.is_none());
    }

    #[tokio::test]
    async fn unknown_pack_is_humanized() {
        let h = handler_with(Arc::new(LoggingEngine));
        let reply = h
            .handle_message(&ctx(10, 5, "a"), "cah create main bogus")
            .await
            .unwrap();
        assert!(reply.contains("`bogus`"), "{reply}");
        assert_eq!(h.registry().game_count(), 0);
    }

    #[tokio::test]
    async fn leave_last_seat_ends_game() {
        let engine = Arc::new(RecordingEngine::default());
        let h = handler_with(engine.clone());
        h.handle_message(&ctx(10, 5, "alice"), "cah create").await;

        let reply = h
            .handle_message(&ctx(10, 5, "alice"), "cah leave")
            .await
            .unwrap();
        assert!(reply.contains("it has ended"));
        assert_eq!(engine.events(), vec!["started 10", "ended 10"]);
    }

    #[test]
    fn describe_mentions_creator_and_packs() {
        let registry = GameRegistry::new(Arc::new(StaticCatalog::builtin()));
        let s = registry
            .create_game(GuildId(1), ChannelId(10), UserId(5), "alice", false, &[])
            .unwrap();
        let text = describe(&s);
        assert!(text.contains("alice"));
        assert!(text.contains("<#10>"));
        assert!(text.contains("main"));
    }
}
