use cahbot_common::{ChannelId, ParseIdError, UserId};

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `create [-v] [packs...]` (alias `c`). `-v` selects vote mode.
    Create { vote_mode: bool, packs: Vec<String> },
    /// `end`: admins end the channel's game, others their own.
    End,
    /// `kick <user>`
    Kick { user: UserId },
    /// `packs`
    Packs,
    /// `move <channel>`
    Move { channel: ChannelId },
    /// `join`
    Join,
    /// `leave`
    Leave,
    /// `help`, or the bare prefix.
    Help,
}

impl Command {
    /// Label used for logging and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::End => "end",
            Self::Kick { .. } => "kick",
            Self::Packs => "packs",
            Self::Move { .. } => "move",
            Self::Join => "join",
            Self::Leave => "leave",
            Self::Help => "help",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error(transparent)]
    InvalidId(#[from] ParseIdError),
}

/// Parse a chat message addressed to `prefix`.
///
/// Returns `None` when the message is not a command for us at all.
pub fn parse_command(prefix: &str, text: &str) -> Option<Result<Command, ParseError>> {
    let mut words = text.split_whitespace();
    if !words.next()?.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let Some(sub) = words.next() else {
        return Some(Ok(Command::Help));
    };
    let args: Vec<&str> = words.collect();

    let parsed = match sub.to_ascii_lowercase().as_str() {
        "create" | "c" => {
            let vote_mode = args.iter().any(|a| *a == "-v");
            let packs = args
                .iter()
                .filter(|a| **a != "-v")
                .map(|a| (*a).to_string())
                .collect();
            Ok(Command::Create { vote_mode, packs })
        },
        "end" => Ok(Command::End),
        "kick" => first_arg(&args, "user")
            .and_then(|raw| Ok(Command::Kick { user: raw.parse()? })),
        "packs" => Ok(Command::Packs),
        "move" => first_arg(&args, "channel")
            .and_then(|raw| Ok(Command::Move {
                channel: raw.parse()?,
            })),
        "join" => Ok(Command::Join),
        "leave" => Ok(Command::Leave),
        "help" => Ok(Command::Help),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    };
    Some(parsed)
}

fn first_arg<'a>(args: &[&'a str], name: &'static str) -> Result<&'a str, ParseError> {
    args.first().copied().ok_or(ParseError::MissingArgument(name))
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("cah create", Command::Create { vote_mode: false, packs: vec![] })]
    #[case("cah c main -v science", Command::Create { vote_mode: true, packs: vec!["main".into(), "science".into()] })]
    #[case("CAH Create *", Command::Create { vote_mode: false, packs: vec!["*".into()] })]
    #[case("cah end", Command::End)]
    #[case("cah kick <@!42>", Command::Kick { user: UserId(42) })]
    #[case("cah packs", Command::Packs)]
    #[case("cah move <#77>", Command::Move { channel: ChannelId(77) })]
    #[case("cah join", Command::Join)]
    #[case("cah leave", Command::Leave)]
    #[case("cah", Command::Help)]
    fn parses_commands(#[case] text: &str, #[case] expected: Command) {
        assert_eq!(parse_command("cah", text), Some(Ok(expected)));
    }

    #[test]
    fn ignores_other_messages() {
        assert_eq!(parse_command("cah", "hello there"), None);
        assert_eq!(parse_command("cah", ""), None);
        assert_eq!(parse_command("cah", "cahoots create"), None);
    }

    #[test]
    fn reports_bad_arguments() {
        assert_eq!(
            parse_command("cah", "cah kick"),
            Some(Err(ParseError::MissingArgument("user")))
        );
        assert_eq!(
            parse_command("cah", "cah move general"),
            Some(Err(ParseError::InvalidId(ParseIdError("general".into()))))
        );
        assert_eq!(
            parse_command("cah", "cah dance"),
            Some(Err(ParseError::UnknownCommand("dance".into())))
        );
    }

    #[test]
    fn custom_prefix() {
        assert_eq!(parse_command("cards", "cards end"), Some(Ok(Command::End)));
        assert_eq!(parse_command("cards", "cah end"), None);
    }
}
