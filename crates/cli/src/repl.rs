use {
    anyhow::{Context, Result},
    cahbot_commands::{CommandContext, CommandHandler, describe},
    tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    tracing::{debug, info, warn},
};

/// Meta command that lists live games instead of going to the chat surface.
const GAMES_META: &str = "!games";

/// Read chat lines from `input`, dispatch them and write replies to `output`.
///
/// Stops on EOF or Ctrl-C, then drains the registry.
pub async fn run<R, W>(handler: &CommandHandler, input: R, mut output: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    info!(prefix = handler.prefix(), "reading chat lines from stdin");

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("read chat line")?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                None
            },
        };
        let Some(line) = line else { break };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line == GAMES_META {
            let games = handler.registry().list_games();
            if games.is_empty() {
                output.write_all(b"no active games\n").await?;
            }
            for game in &games {
                output
                    .write_all(format!("{}\n", describe(game)).as_bytes())
                    .await?;
            }
            continue;
        }

        let Some((ctx, message)) = parse_line(line) else {
            warn!(line, "expected `<guild> <channel> <user> <name> <message...>`");
            continue;
        };
        if let Some(reply) = handler.handle_message(&ctx, message).await {
            output
                .write_all(format!("[{}] {reply}\n", ctx.channel).as_bytes())
                .await?;
        } else {
            debug!(line, "not a command");
        }
    }

    output.flush().await?;
    let drained = handler.registry().shutdown();
    info!(games = drained.len(), "registry drained");
    Ok(())
}

fn parse_line(line: &str) -> Option<(CommandContext, &str)> {
    let mut parts = line.splitn(5, char::is_whitespace);
    let guild = parts.next()?.parse().ok()?;
    let channel = parts.next()?.parse().ok()?;
    let author = parts.next()?.parse().ok()?;
    let author_name = parts.next()?.to_string();
    let message = parts.next()?.trim();
    Some((
        CommandContext {
            guild,
            channel,
            author,
            author_name,
        },
        message,
    ))
}
