//! Bevy front-end adapter.
//!
//! Lines arrive as [`ConsoleInputEvent`] messages, run against the
//! process-wide registry through a [`ConsoleSession`], and come back as
//! [`ConsoleOutputEvent`] messages.

use bevy::prelude::*;

use crate::console::ConsoleSession;
use crate::core::{Color as CVarColor, CommandResult};
use crate::global::with_registry;

/// Message sent when a command line is submitted.
///
/// # Examples
///
/// ```ignore
/// fn submit_command(mut messages: MessageWriter<ConsoleInputEvent>) {
///     messages.write(ConsoleInputEvent::new("gui.width = 1024"));
/// }
/// ```
#[derive(Message, Debug, Clone)]
pub struct ConsoleInputEvent {
    /// The raw command line.
    pub command: String,
}

impl ConsoleInputEvent {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

/// Message sent when output should be displayed.
#[derive(Message, Debug, Clone)]
pub struct ConsoleOutputEvent {
    pub message: String,
    pub level: ConsoleOutputLevel,
}

/// Kind of console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleOutputLevel {
    #[default]
    Info,
    Error,
    /// Echo of the submitted line.
    Command,
    /// Output of a successful command.
    Result,
}

impl ConsoleOutputEvent {
    pub fn new(level: ConsoleOutputLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Error, message)
    }

    pub fn command(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Command, message)
    }

    pub fn result(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Result, message)
    }

    fn from_result(result: &CommandResult) -> Option<Self> {
        if result.text.is_empty() {
            None
        } else if result.success {
            Some(Self::result(result.text.clone()))
        } else {
            Some(Self::error(result.text.clone()))
        }
    }
}

impl From<CVarColor> for bevy::color::Color {
    fn from(color: CVarColor) -> Self {
        bevy::color::Color::srgba(color.r, color.g, color.b, color.a)
    }
}

/// Console session bound to the process-wide registry.
#[derive(Resource, Clone)]
pub struct CVarsSession(pub Option<ConsoleSession>);

/// Plugin running console input through the process-wide registry.
///
/// # Configuration
///
/// ```ignore
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(CVarsPlugin::default())
///     .run();
/// ```
#[derive(Default)]
pub struct CVarsPlugin {
    /// Run `startup` once the session exists.
    pub run_startup: bool,
}

impl Plugin for CVarsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ConsoleInputEvent>()
            .add_message::<ConsoleOutputEvent>()
            .init_resource::<PendingCommands>()
            .insert_resource(CVarsSession(None));

        if self.run_startup {
            app.add_systems(Startup, (attach_session, run_startup).chain());
        } else {
            app.add_systems(Startup, attach_session);
        }

        // 1. parse_console_input: queue submitted lines
        // 2. execute_pending_commands: run them against the registry
        // 3. send_pending_outputs: publish the results
        app.add_systems(
            Update,
            (
                parse_console_input,
                execute_pending_commands,
                send_pending_outputs,
            )
                .chain(),
        );
    }
}

#[derive(Resource, Default)]
struct PendingCommands {
    queue: Vec<String>,
    outputs: Vec<ConsoleOutputEvent>,
}

fn attach_session(mut session: ResMut<CVarsSession>) {
    match with_registry(ConsoleSession::new) {
        Ok(created) => session.0 = Some(created),
        Err(err) => warn!("console session unavailable: {}", err),
    }
}

fn run_startup(session: Res<CVarsSession>, mut pending: ResMut<PendingCommands>) {
    if let Some(session) = &session.0 {
        let result = with_registry(|registry| session.startup(registry));
        pending.outputs.extend(ConsoleOutputEvent::from_result(&result));
    }
}

fn parse_console_input(
    mut input: MessageReader<ConsoleInputEvent>,
    mut pending: ResMut<PendingCommands>,
) {
    for event in input.read() {
        let line = event.command.trim();
        if line.is_empty() {
            continue;
        }
        pending.outputs.push(ConsoleOutputEvent::command(format!("$ {line}")));
        pending.queue.push(line.to_string());
    }
}

fn execute_pending_commands(session: Res<CVarsSession>, mut pending: ResMut<PendingCommands>) {
    let queue = std::mem::take(&mut pending.queue);
    if queue.is_empty() {
        return;
    }

    let results: Vec<CommandResult> = with_registry(|registry| {
        queue
            .iter()
            .map(|line| match &session.0 {
                Some(session) => session.submit(registry, line),
                None => registry.execute(line, true),
            })
            .collect()
    });

    for result in &results {
        pending.outputs.extend(ConsoleOutputEvent::from_result(result));
    }
}

fn send_pending_outputs(
    mut pending: ResMut<PendingCommands>,
    mut output: MessageWriter<ConsoleOutputEvent>,
) {
    for event in pending.outputs.drain(..) {
        output.write(event);
    }
}
