//! Metrics facade for cahbot.
//!
//! Crates record through the re-exported `metrics` macros using the names in
//! [`names`]. Without an installed recorder every call is a no-op.

pub use metrics::{counter, gauge};

/// Metric names, grouped by subsystem.
pub mod names {
    /// Games successfully created.
    pub const GAMES_CREATED_TOTAL: &str = "cah_games_created_total";
    /// Games destroyed, labelled by `reason` (removed, self_removed, emptied, shutdown).
    pub const GAMES_ENDED_TOTAL: &str = "cah_games_ended_total";
    /// Games relocated to another channel.
    pub const GAMES_MOVED_TOTAL: &str = "cah_games_moved_total";
    /// Players removed from a game by an admin.
    pub const PLAYERS_KICKED_TOTAL: &str = "cah_players_kicked_total";
    /// Live games right now.
    pub const GAMES_ACTIVE: &str = "cah_games_active";
    /// Registry operations rejected, labelled by `kind`.
    pub const REGISTRY_REJECTIONS_TOTAL: &str = "cah_registry_rejections_total";
    /// Chat commands handled, labelled by `command`.
    pub const COMMANDS_TOTAL: &str = "cah_commands_total";
}

/// Install a global Prometheus recorder and return the scrape handle.
#[cfg(feature = "prometheus")]
pub fn install_prometheus()
-> anyhow::Result<metrics_exporter_prometheus::PrometheusHandle> {
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("install prometheus recorder: {e}"))?;
    tracing::debug!("prometheus recorder installed");
    Ok(handle)
}
