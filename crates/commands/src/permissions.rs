use {
    anyhow::Result,
    async_trait::async_trait,
    cahbot_common::{ChannelId, GuildId, UserId},
    cahbot_config::PermissionsConfig,
};

/// Answers whether a user holds elevated rights where a command was issued.
#[async_trait]
pub trait PermissionResolver: Send + Sync {
    async fn is_admin(&self, guild: GuildId, channel: ChannelId, user: UserId) -> Result<bool>;
}

/// Fixed admin list from the `[permissions]` config section, valid in every
/// guild and channel.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissions {
    config: PermissionsConfig,
}

impl StaticPermissions {
    pub fn new(admins: impl IntoIterator<Item = UserId>) -> Self {
        Self::from_config(&PermissionsConfig {
            admins: admins.into_iter().collect(),
        })
    }

    pub fn from_config(cfg: &PermissionsConfig) -> Self {
        Self {
            config: cfg.clone(),
        }
    }
}

#[async_trait]
impl PermissionResolver for StaticPermissions {
    async fn is_admin(&self, _guild: GuildId, _channel: ChannelId, user: UserId) -> Result<bool> {
        Ok(self.config.is_admin(user))
    }
}
