//! Raw-terminal console.
//!
//! Type a command and press Enter. End a line with a TAB (type the partial
//! name, then TAB, then Enter) to list completions instead of running it.
//!
//! ```text
//! cargo run --example text_console
//! ```

use std::io::{self, BufRead, Write};

use cvars::{ConsoleSession, LineKind};

const MAX_WIDTH: usize = 80;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    cvars::create("demo.Speed", 2.5f32).map_err(io::Error::other)?;
    cvars::create("demo.Name", String::from("player")).map_err(io::Error::other)?;
    cvars::create("demo.Flags", vec![1, 2, 3]).map_err(io::Error::other)?;
    cvars::create_function("demo.echo", |args, _| {
        cvars::CommandResult::ok(args.join(" "))
    })
    .map_err(io::Error::other)?;

    let session = cvars::with_registry(ConsoleSession::new).map_err(io::Error::other)?;
    cvars::with_registry(|registry| session.startup(registry));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim() == "quit" {
            break;
        }

        match line.strip_suffix('\t') {
            Some(partial) => {
                let completion =
                    cvars::with_registry(|registry| session.complete(registry, partial, MAX_WIDTH));
                match completion {
                    Some(completion) => {
                        for listing in completion.lines() {
                            writeln!(stdout, "{listing}")?;
                        }
                        writeln!(stdout, "{}", completion.command)?;
                    }
                    None => writeln!(stdout, "no completions")?,
                }
            }
            None => {
                let result = cvars::with_registry(|registry| session.submit(registry, &line));
                if !result.text.is_empty() {
                    let marker = if result.success { "" } else { "error: " };
                    writeln!(stdout, "{marker}{}", result.text)?;
                }
            }
        }

        write!(stdout, "> ")?;
        stdout.flush()?;
    }

    cvars::with_registry(|registry| session.shutdown(registry));
    let errors = session
        .lines()
        .iter()
        .filter(|line| line.kind == LineKind::Error)
        .count();
    tracing::info!("session ended with {} failed commands", errors);
    cvars::teardown();
    Ok(())
}
