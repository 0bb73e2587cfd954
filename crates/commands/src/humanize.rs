use {
    cahbot_packs::PackInfo,
    cahbot_sessions::{GameError, MoveFailure},
};

/// User-facing text for a registry failure.
pub fn humanize_error(err: &GameError) -> String {
    match err {
        GameError::ChannelOccupied(_) => "There's already a game running in this channel".into(),
        GameError::UnknownPack(pack) => {
            format!("Unknown pack `{pack}`, use the packs command to see what's available")
        },
        GameError::NoActiveGame => "Couldn't find a game you're part of".into(),
        GameError::MoveFailed(MoveFailure::SourceEmpty) => {
            "It seems that there is no game in the current channel".into()
        },
        GameError::MoveFailed(MoveFailure::DestinationOccupied) => {
            "There is already a game in the new channel".into()
        },
        GameError::MoveFailed(MoveFailure::SameChannel) => {
            "The game is already in that channel".into()
        },
        GameError::PlayerAlreadyInGame(_) => {
            "Already playing in another game, leave that one first".into()
        },
        GameError::GameFull { max } => format!("The game is full ({max} players max)"),
    }
}

/// The `packs` command listing, one `` `name` - description`` per line.
pub fn format_pack_list(packs: &[PackInfo]) -> String {
    let mut out = String::from("Available packs: \n\n");
    for pack in packs {
        out.push('`');
        out.push_str(&pack.name);
        out.push_str("` - ");
        out.push_str(&pack.description);
        out.push('\n');
    }
    out
}
