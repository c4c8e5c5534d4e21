//! Console chat with the career counselor.
//!
//! Counselor lines are printed with `> `, input is read after `< `. Typing
//! `exit` or `quit`, or closing stdin, ends the conversation. Set
//! `COUNSELOR_TRANSCRIPT_PATH` to keep a transcript of the session.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use elizaos_plugin_eliza_counselor::{ConversationSession, CounselorConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = CounselorConfig::from_env().context("reading counselor configuration")?;
    let mut session = ConversationSession::new(&config).context("loading counselor script")?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    print_lines(&mut stdout, &session.start())?;

    let mut input = stdin.lock().lines();
    while !session.is_ended() {
        write!(stdout, "< ")?;
        stdout.flush()?;

        let line = match input.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "input stream failed");
                break;
            }
            None => break,
        };

        let turn = session.respond(&line);
        print_lines(&mut stdout, &turn.lines)?;
    }

    if let Some(farewell) = session.end() {
        writeln!(stdout)?;
        print_lines(&mut stdout, &[farewell])?;
    }

    if let Some(path) = &config.transcript_path {
        let transcript = session.transcript_lines().join("\n") + "\n";
        std::fs::write(path, transcript)
            .with_context(|| format!("writing transcript to {}", path.display()))?;
    }

    Ok(())
}

fn print_lines(stdout: &mut impl Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(stdout, "> {}", line)?;
    }
    stdout.flush()
}
