//! Terminal backend for headless apps.
//!
//! Reads lines from stdin on a background thread and prints console output
//! to stdout. A line ending in a TAB is a completion request: the listing is
//! printed and nothing is executed.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use bevy::prelude::*;

use crate::global::with_registry;
use crate::plugin::{ConsoleInputEvent, ConsoleOutputEvent, ConsoleOutputLevel};

/// Plugin that adds stdin/stdout console support.
pub struct TerminalPlugin;

impl Plugin for TerminalPlugin {
    fn build(&self, app: &mut App) {
        let (sender, receiver) = mpsc::channel();
        let _handle = spawn_stdin_reader(sender);

        app.insert_resource(StdinReceiver(Mutex::new(receiver)))
            .init_resource::<TerminalConfig>()
            .add_systems(Update, (read_stdin, write_stdout));
    }
}

/// Terminal behavior.
#[derive(Resource)]
pub struct TerminalConfig {
    /// Use ANSI colors.
    pub colored: bool,
    /// Line width completion listings wrap at.
    pub max_width: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            colored: false,
            max_width: 80,
        }
    }
}

#[derive(Resource)]
struct StdinReceiver(Mutex<Receiver<String>>);

fn spawn_stdin_reader(sender: Sender<String>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(std::result::Result::ok) {
            if line.trim().is_empty() {
                continue;
            }
            if sender.send(line).is_err() {
                break;
            }
        }
    })
}

fn read_stdin(
    receiver: Res<StdinReceiver>,
    config: Res<TerminalConfig>,
    mut input: MessageWriter<ConsoleInputEvent>,
    mut output: MessageWriter<ConsoleOutputEvent>,
) {
    let rx = receiver.0.lock().unwrap_or_else(PoisonError::into_inner);
    while let Ok(line) = rx.try_recv() {
        match line.strip_suffix('\t') {
            Some(partial) => {
                for event in completion_output(partial, config.max_width) {
                    output.write(event);
                }
            }
            None => {
                input.write(ConsoleInputEvent::new(line.trim()));
            }
        }
    }
}

fn completion_output(partial: &str, max_width: usize) -> Vec<ConsoleOutputEvent> {
    let Some(completion) = with_registry(|registry| registry.complete(partial, max_width)) else {
        return Vec::new();
    };

    let mut events: Vec<ConsoleOutputEvent> =
        completion.lines().map(ConsoleOutputEvent::info).collect();
    events.push(ConsoleOutputEvent::command(completion.command));
    events
}

fn write_stdout(mut events: MessageReader<ConsoleOutputEvent>, config: Res<TerminalConfig>) {
    let mut stdout = io::stdout().lock();
    for event in events.read() {
        let written = if config.colored {
            writeln!(stdout, "{}{}\x1b[0m", color_code(event.level), event.message)
        } else {
            writeln!(stdout, "{}", event.message)
        };
        if let Err(err) = written.and_then(|()| stdout.flush()) {
            warn!("failed to write console output: {}", err);
            return;
        }
    }
}

fn color_code(level: ConsoleOutputLevel) -> &'static str {
    match level {
        ConsoleOutputLevel::Info => "\x1b[0m",
        ConsoleOutputLevel::Error => "\x1b[31m",
        ConsoleOutputLevel::Command => "\x1b[36m",
        ConsoleOutputLevel::Result => "\x1b[32m",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_codes_reset_on_info() {
        assert_eq!(color_code(ConsoleOutputLevel::Info), "\x1b[0m");
        assert_ne!(color_code(ConsoleOutputLevel::Error), color_code(ConsoleOutputLevel::Result));
    }
}
