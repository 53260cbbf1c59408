//! Interactive console session.
//!
//! A [`ConsoleSession`] is what a front-end talks to: it submits lines to the
//! interpreter, keeps a capped log of commands and results, tracks command
//! history for up/down navigation and records scripts. Its file commands are
//! registered as console functions, so they work from any command line:
//!
//! - `console.history.save [file]`, `console.history.load [file]`,
//!   `console.history.clear`
//! - `script.record.start`, `script.record.stop`, `script.record.pause`,
//!   `script.show`, `script.run [file]`, `script.save [file]`, `script.load [file]`
//! - `console.settings.save [file]`, `console.settings.load [file]`
//! - `startup`, `shutdown`

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::{
    CVar, CVarRef, CVarRegistry, CommandArgs, CommandResult, Completion, ConsoleFunc, Result,
};
use crate::persist::write_file;

/// Maximum number of log lines a session keeps.
pub const MAX_HISTORY: &str = "console.history.MaxHistory";
/// History file used by `console.history.save`/`load`.
pub const HISTORY_FILE: &str = "console.history.HistoryFileName";
/// Script file used by `script.save`/`load`/`run`.
pub const SCRIPT_FILE: &str = "script.ScriptFileName";
/// Settings file used by `console.settings.save`/`load`.
pub const SETTINGS_FILE: &str = "console.settings.SettingsFileName";
/// Script run by `startup`.
pub const INITIAL_SCRIPT: &str = "console.InitialScriptFileName";

/// Name prefixes written by `console.settings.save`.
pub const SETTINGS_FILTERS: [&str; 2] = ["console", "script"];

const DEFAULT_HISTORY_FILE: &str = ".cvar_history";
const DEFAULT_SCRIPT_FILE: &str = "default.script";
const DEFAULT_SETTINGS_FILE: &str = ".cvar_settings";
const DEFAULT_INITIAL_SCRIPT: &str = "initial.script";

/// How deeply `script.run`, `script.load` and `startup` may nest.
const MAX_SCRIPT_DEPTH: usize = 8;

/// Kind of a console log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A submitted command.
    Command,
    /// Output of a successful command.
    Output,
    /// Output of a failed command.
    Error,
}

/// One console log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub kind: LineKind,
    pub text: String,
}

/// Script recorder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Recording {
    #[default]
    Off,
    On,
    Paused,
}

#[derive(Debug)]
struct SessionState {
    log: VecDeque<LogLine>,
    commands: Vec<String>,
    cursor: Option<usize>,
    script: Vec<String>,
    recording: Recording,
    /// Scripts currently running inside one another.
    depth: usize,
    max_lines: CVarRef<i32>,
}

impl SessionState {
    fn max(&self) -> usize {
        usize::try_from(self.max_lines.get()).unwrap_or(0)
    }

    fn push(&mut self, kind: LineKind, text: &str) {
        for line in text.lines() {
            self.log.push_back(LogLine {
                kind,
                text: line.to_string(),
            });
        }

        let max = self.max();
        while self.log.len() > max {
            self.log.pop_front();
        }
    }

    // Consecutive repeats are stored once; the oldest commands drop past the cap.
    fn push_command(&mut self, line: &str) {
        if line.is_empty() || self.commands.last().map(String::as_str) == Some(line) {
            return;
        }
        self.commands.push(line.to_string());

        let excess = self.commands.len().saturating_sub(self.max());
        self.commands.drain(..excess);
    }

    fn push_result(&mut self, result: &CommandResult) {
        let kind = if result.success {
            LineKind::Output
        } else {
            LineKind::Error
        };
        self.push(kind, &result.text);
    }
}

type Shared = Arc<Mutex<SessionState>>;

fn lock(state: &Shared) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Front-end state attached to one registry.
///
/// # Examples
///
/// ```
/// use cvars::core::CVarRegistry;
/// use cvars::ConsoleSession;
///
/// let mut registry = CVarRegistry::new();
/// registry.create("gui.width", 800i32).unwrap();
/// let session = ConsoleSession::new(&mut registry).unwrap();
///
/// let result = session.submit(&mut registry, "gui.width = 640");
/// assert_eq!(result.text, "gui.width = 640");
/// assert_eq!(session.history_back().as_deref(), Some("gui.width = 640"));
/// ```
#[derive(Debug, Clone)]
pub struct ConsoleSession {
    state: Shared,
}

impl ConsoleSession {
    /// Create the session's settings and register its console functions.
    ///
    /// Fails with `AlreadyExists` if another session is attached to the
    /// registry.
    pub fn new(registry: &mut CVarRegistry) -> Result<Self> {
        let max_lines = registry.register_or_get(
            CVar::new(MAX_HISTORY, 100i32).help("Maximum number of lines kept in the console log"),
        )?;
        let settings = [
            (HISTORY_FILE, DEFAULT_HISTORY_FILE, "File the command history is saved to"),
            (SCRIPT_FILE, DEFAULT_SCRIPT_FILE, "File scripts are saved to and run from"),
            (SETTINGS_FILE, DEFAULT_SETTINGS_FILE, "File console settings are saved to"),
            (INITIAL_SCRIPT, DEFAULT_INITIAL_SCRIPT, "Script run by startup"),
        ];
        for (name, value, help) in settings {
            registry.register_or_get(CVar::new(name, value.to_string()).help(help))?;
        }

        let state = Arc::new(Mutex::new(SessionState {
            log: VecDeque::new(),
            commands: Vec::new(),
            cursor: None,
            script: Vec::new(),
            recording: Recording::Off,
            depth: 0,
            max_lines,
        }));
        register_functions(registry, &state)?;

        Ok(Self { state })
    }

    /// Execute a line and record it in the log and the history.
    pub fn submit(&self, registry: &mut CVarRegistry, line: &str) -> CommandResult {
        let line = line.trim();
        let result = registry.execute(line, true);

        let mut state = lock(&self.state);
        state.push(LineKind::Command, line);
        state.push_result(&result);
        state.cursor = None;
        state.push_command(line);
        if state.recording == Recording::On && result.success && !line.starts_with("script.") {
            state.script.push(line.to_string());
        }

        result
    }

    /// Complete a partial line, logging the candidate listing.
    pub fn complete(
        &self,
        registry: &CVarRegistry,
        partial: &str,
        max_width: usize,
    ) -> Option<Completion> {
        let completion = registry.complete(partial, max_width)?;
        if !completion.is_unique() {
            let mut state = lock(&self.state);
            for line in completion.lines() {
                state.push(LineKind::Output, line);
            }
        }
        Some(completion)
    }

    /// Step back through submitted commands.
    pub fn history_back(&self) -> Option<String> {
        let mut state = lock(&self.state);
        let index = match state.cursor {
            Some(0) => 0,
            Some(index) => index - 1,
            None => state.commands.len().checked_sub(1)?,
        };
        state.cursor = Some(index);
        state.commands.get(index).cloned()
    }

    /// Step forward through submitted commands. Past the newest one the
    /// cursor resets and `None` is returned.
    pub fn history_forward(&self) -> Option<String> {
        let mut state = lock(&self.state);
        let next = state.cursor? + 1;
        if next < state.commands.len() {
            state.cursor = Some(next);
            state.commands.get(next).cloned()
        } else {
            state.cursor = None;
            None
        }
    }

    /// Add a line of output that did not come from a command.
    pub fn print(&self, text: &str) {
        lock(&self.state).push(LineKind::Output, text);
    }

    /// Snapshot of the log, oldest first.
    pub fn lines(&self) -> Vec<LogLine> {
        lock(&self.state).log.iter().cloned().collect()
    }

    pub fn clear_log(&self) {
        lock(&self.state).log.clear();
    }

    /// Submitted commands, oldest first.
    pub fn commands(&self) -> Vec<String> {
        lock(&self.state).commands.clone()
    }

    /// The recorded script.
    pub fn script(&self) -> Vec<String> {
        lock(&self.state).script.clone()
    }

    pub fn recording(&self) -> Recording {
        lock(&self.state).recording
    }

    /// Load settings and history, then run the initial script.
    pub fn startup(&self, registry: &mut CVarRegistry) -> CommandResult {
        registry.execute("startup", true)
    }

    /// Save history and settings.
    pub fn shutdown(&self, registry: &mut CVarRegistry) -> CommandResult {
        registry.execute("shutdown", true)
    }
}

fn register_functions(registry: &mut CVarRegistry, state: &Shared) -> Result<()> {
    type Handler = fn(&Shared, &CommandArgs<'_>, &mut CVarRegistry) -> CommandResult;

    let funcs: [(&str, &str, Handler); 14] = [
        ("console.history.save", "console.history.save [file]: save the command history", history_save),
        ("console.history.load", "console.history.load [file]: show a saved history without running it", history_load),
        ("console.history.clear", "Clear the console log and the command history", history_clear),
        ("script.record.start", "Start recording successful commands into the script", record_start),
        ("script.record.stop", "Stop recording the script", record_stop),
        ("script.record.pause", "Pause or resume script recording", record_pause),
        ("script.show", "Show the recorded script", script_show),
        ("script.run", "script.run [file]: run the recorded script or a script file", script_run),
        ("script.save", "script.save [file]: save the recorded script", script_save),
        ("script.load", "script.load [file]: load a script file and run it", script_load),
        ("console.settings.save", "console.settings.save [file]: save console and script settings", settings_save),
        ("console.settings.load", "console.settings.load [file]: load console and script settings", settings_load),
        ("startup", "Load settings and history, then run the initial script", startup),
        ("shutdown", "Save history and settings", shutdown),
    ];

    for (name, help, handler) in funcs {
        let state = Arc::clone(state);
        let func = ConsoleFunc::new(move |args, registry| handler(&state, args, registry));
        registry.register(CVar::new(name, func).help(help).unsaved())?;
    }
    Ok(())
}

// First argument, or the file named by a setting.
fn file_arg(args: &CommandArgs<'_>, registry: &CVarRegistry, setting: &str, fallback: &str) -> String {
    match args.get(0) {
        Some(file) => file.to_string(),
        None => registry.text_setting(setting, fallback),
    }
}

fn read_lines(file: &str) -> std::io::Result<Vec<String>> {
    Ok(fs::read_to_string(file)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn history_save(state: &Shared, args: &CommandArgs<'_>, registry: &mut CVarRegistry) -> CommandResult {
    let file = file_arg(args, registry, HISTORY_FILE, DEFAULT_HISTORY_FILE);
    let commands = lock(state).commands.clone();

    let mut contents = commands.join("\n");
    contents.push('\n');
    match write_file(Path::new(&file), &contents) {
        Ok(()) => CommandResult::ok(format!("Saved {} lines to \"{file}\".", commands.len())),
        Err(err) => CommandResult::err(format!("Error saving file: {err}")),
    }
}

fn history_load(state: &Shared, args: &CommandArgs<'_>, registry: &mut CVarRegistry) -> CommandResult {
    let file = file_arg(args, registry, HISTORY_FILE, DEFAULT_HISTORY_FILE);
    let lines = match read_lines(&file) {
        Ok(lines) => lines,
        Err(err) => return CommandResult::err(format!("Error: could not load \"{file}\": {err}")),
    };

    // Replayed lines are displayed, never rerun.
    let results: Vec<CommandResult> = lines.iter().map(|line| registry.execute(line, false)).collect();

    let mut guard = lock(state);
    for (line, result) in lines.iter().zip(&results) {
        guard.push(LineKind::Command, line);
        guard.push_result(result);
    }
    for line in &lines {
        guard.push_command(line);
    }
    guard.cursor = None;

    CommandResult::ok(format!("Loaded {} lines from \"{file}\".", lines.len()))
}

fn history_clear(state: &Shared, _args: &CommandArgs<'_>, _registry: &mut CVarRegistry) -> CommandResult {
    let mut guard = lock(state);
    guard.log.clear();
    guard.commands.clear();
    guard.cursor = None;
    CommandResult::empty()
}

fn record_start(state: &Shared, _args: &CommandArgs<'_>, _registry: &mut CVarRegistry) -> CommandResult {
    let mut guard = lock(state);
    guard.script.clear();
    guard.recording = Recording::On;
    CommandResult::ok("Recording script.")
}

fn record_stop(state: &Shared, _args: &CommandArgs<'_>, _registry: &mut CVarRegistry) -> CommandResult {
    let mut guard = lock(state);
    guard.recording = Recording::Off;
    CommandResult::ok(format!("Recorded {} lines.", guard.script.len()))
}

fn record_pause(state: &Shared, _args: &CommandArgs<'_>, _registry: &mut CVarRegistry) -> CommandResult {
    let mut guard = lock(state);
    match guard.recording {
        Recording::On => {
            guard.recording = Recording::Paused;
            CommandResult::ok("Script recording paused.")
        }
        Recording::Paused => {
            guard.recording = Recording::On;
            CommandResult::ok("Script recording resumed.")
        }
        Recording::Off => CommandResult::err("script.record.pause: not recording"),
    }
}

fn script_show(state: &Shared, _args: &CommandArgs<'_>, _registry: &mut CVarRegistry) -> CommandResult {
    CommandResult::ok(lock(state).script.join("\n"))
}

// Run `f` one script level deeper. Past MAX_SCRIPT_DEPTH it fails instead,
// which stops scripts that load themselves.
fn nested(state: &Shared, command: &str, f: impl FnOnce() -> CommandResult) -> CommandResult {
    {
        let mut guard = lock(state);
        if guard.depth >= MAX_SCRIPT_DEPTH {
            return CommandResult::err(format!(
                "{command}: scripts nested deeper than {MAX_SCRIPT_DEPTH} levels"
            ));
        }
        guard.depth += 1;
    }

    let result = f();
    let mut guard = lock(state);
    guard.depth = guard.depth.saturating_sub(1);
    result
}

fn run_lines(registry: &mut CVarRegistry, lines: &[String]) -> CommandResult {
    let mut success = true;
    let mut output = Vec::new();
    for line in lines {
        let result = registry.execute(line, true);
        success &= result.success;
        if !result.text.is_empty() {
            output.push(result.text);
        }
    }
    CommandResult {
        success,
        text: output.join("\n"),
    }
}

fn script_run(state: &Shared, args: &CommandArgs<'_>, registry: &mut CVarRegistry) -> CommandResult {
    let lines = match args.get(0) {
        Some(file) => match read_lines(file) {
            Ok(lines) => lines,
            Err(err) => {
                return CommandResult::err(format!("Error: could not load \"{file}\": {err}"));
            }
        },
        None => lock(state).script.clone(),
    };
    nested(state, "script.run", || run_lines(registry, &lines))
}

fn script_save(state: &Shared, args: &CommandArgs<'_>, registry: &mut CVarRegistry) -> CommandResult {
    let file = file_arg(args, registry, SCRIPT_FILE, DEFAULT_SCRIPT_FILE);
    let script = lock(state).script.clone();

    let mut contents = script.join("\n");
    contents.push('\n');
    match write_file(Path::new(&file), &contents) {
        Ok(()) => CommandResult::ok(format!("Saved {} lines to \"{file}\".", script.len())),
        Err(err) => CommandResult::err(format!("Error saving file: {err}")),
    }
}

fn script_load(state: &Shared, args: &CommandArgs<'_>, registry: &mut CVarRegistry) -> CommandResult {
    let file = file_arg(args, registry, SCRIPT_FILE, DEFAULT_SCRIPT_FILE);
    let lines = match read_lines(&file) {
        Ok(lines) => lines,
        Err(err) => return CommandResult::err(format!("Error: could not load \"{file}\": {err}")),
    };

    lock(state).script = lines.clone();
    nested(state, "script.load", || run_lines(registry, &lines))
}

fn settings_save(_state: &Shared, args: &CommandArgs<'_>, registry: &mut CVarRegistry) -> CommandResult {
    let file = file_arg(args, registry, SETTINGS_FILE, DEFAULT_SETTINGS_FILE);
    match registry.save(&file, &SETTINGS_FILTERS) {
        Ok(count) => CommandResult::ok(format!("Saved {count} settings to \"{file}\".")),
        Err(err) => CommandResult::err(format!("Error saving file: {err}")),
    }
}

fn settings_load(_state: &Shared, args: &CommandArgs<'_>, registry: &mut CVarRegistry) -> CommandResult {
    let file = file_arg(args, registry, SETTINGS_FILE, DEFAULT_SETTINGS_FILE);
    match registry.load(&file, &SETTINGS_FILTERS) {
        Ok(count) => CommandResult::ok(format!("Loaded {count} settings from \"{file}\".")),
        Err(err) => CommandResult::err(format!("Error: could not load \"{file}\": {err}")),
    }
}

// Missing files are normal on a first run and are skipped.
fn startup(state: &Shared, _args: &CommandArgs<'_>, registry: &mut CVarRegistry) -> CommandResult {
    nested(state, "startup", || startup_steps(registry))
}

fn startup_steps(registry: &mut CVarRegistry) -> CommandResult {
    let steps = [
        (SETTINGS_FILE, DEFAULT_SETTINGS_FILE, "console.settings.load"),
        (HISTORY_FILE, DEFAULT_HISTORY_FILE, "console.history.load"),
        (INITIAL_SCRIPT, DEFAULT_INITIAL_SCRIPT, "script.load"),
    ];

    let mut success = true;
    let mut output = Vec::new();
    for (setting, fallback, command) in steps {
        let file = registry.text_setting(setting, fallback);
        if !Path::new(&file).exists() {
            tracing::debug!("startup: \"{}\" not found, skipped", file);
            continue;
        }
        let result = registry.execute(&format!("{command} {file}"), true);
        success &= result.success;
        if !result.text.is_empty() {
            output.push(result.text);
        }
    }

    CommandResult {
        success,
        text: output.join("\n"),
    }
}

fn shutdown(_state: &Shared, _args: &CommandArgs<'_>, registry: &mut CVarRegistry) -> CommandResult {
    let history = registry.execute("console.history.save", true);
    let settings = registry.execute("console.settings.save", true);
    CommandResult {
        success: history.success && settings.success,
        text: format!("{}\n{}", history.text, settings.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (CVarRegistry, ConsoleSession) {
        let mut registry = CVarRegistry::new();
        registry.create("gui.width", 800i32).unwrap();
        let session = ConsoleSession::new(&mut registry).unwrap();
        (registry, session)
    }

    fn path_in(dir: &tempfile::TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn test_settings_are_created() {
        let (registry, _) = setup();
        assert_eq!(registry.get::<i32>(MAX_HISTORY).unwrap(), 100);
        assert_eq!(registry.get::<String>(HISTORY_FILE).unwrap(), ".cvar_history");
        assert!(registry.is_function("script.run"));
        assert!(registry.is_function("startup"));
    }

    #[test]
    fn test_second_session_is_rejected() {
        let (mut registry, _) = setup();
        assert!(ConsoleSession::new(&mut registry).is_err());
    }

    #[test]
    fn test_submit_logs_command_and_result() {
        let (mut registry, session) = setup();
        session.submit(&mut registry, "gui.width");
        session.submit(&mut registry, "nope");

        assert_eq!(
            session.lines(),
            vec![
                LogLine { kind: LineKind::Command, text: "gui.width".into() },
                LogLine { kind: LineKind::Output, text: "gui.width = 800".into() },
                LogLine { kind: LineKind::Command, text: "nope".into() },
                LogLine { kind: LineKind::Error, text: "nope: command not found".into() },
            ]
        );
    }

    #[test]
    fn test_log_is_capped() {
        let (mut registry, session) = setup();
        registry.set(MAX_HISTORY, 3i32).unwrap();
        for _ in 0..5 {
            session.submit(&mut registry, "gui.width");
        }
        assert_eq!(session.lines().len(), 3);
    }

    #[test]
    fn test_command_history_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let file = path_in(&dir, "history");

        let (mut registry, session) = setup();
        registry.set(MAX_HISTORY, 3i32).unwrap();
        for width in 0..5 {
            session.submit(&mut registry, &format!("gui.width = {width}"));
        }
        assert_eq!(
            session.commands(),
            vec!["gui.width = 2", "gui.width = 3", "gui.width = 4"]
        );
        assert_eq!(session.history_back().as_deref(), Some("gui.width = 4"));

        fs::write(&file, "a.one\na.two\na.three\na.four\n").unwrap();
        registry.execute("console.history.clear", true);
        assert!(registry.execute(&format!("console.history.load {file}"), true).success);
        assert_eq!(session.commands(), vec!["a.two", "a.three", "a.four"]);
    }

    #[test]
    fn test_history_navigation() {
        let (mut registry, session) = setup();
        session.submit(&mut registry, "gui.width = 1");
        session.submit(&mut registry, "gui.width = 2");
        session.submit(&mut registry, "gui.width = 2");

        assert_eq!(session.commands().len(), 2);
        assert_eq!(session.history_back().as_deref(), Some("gui.width = 2"));
        assert_eq!(session.history_back().as_deref(), Some("gui.width = 1"));
        assert_eq!(session.history_back().as_deref(), Some("gui.width = 1"));
        assert_eq!(session.history_forward().as_deref(), Some("gui.width = 2"));
        assert_eq!(session.history_forward(), None);
    }

    #[test]
    fn test_history_save_and_dry_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = path_in(&dir, "history");

        let (mut registry, session) = setup();
        session.submit(&mut registry, "gui.width = 1024");
        let result = session.submit(&mut registry, &format!("console.history.save {file}"));
        assert!(result.success, "{}", result.text);

        registry.set("gui.width", 5i32).unwrap();
        registry.execute("console.history.clear", true);
        assert!(session.commands().is_empty());

        let result = registry.execute(&format!("console.history.load {file}"), true);
        assert!(result.success, "{}", result.text);

        // Displayed, not rerun.
        assert_eq!(registry.get::<i32>("gui.width").unwrap(), 5);
        assert_eq!(session.commands()[0], "gui.width = 1024");
        assert!(session.lines().iter().any(|l| l.text == "gui.width = 1024"));
    }

    #[test]
    fn test_script_recording() {
        let (mut registry, session) = setup();
        session.submit(&mut registry, "gui.width = 1");
        session.submit(&mut registry, "script.record.start");
        assert_eq!(session.recording(), Recording::On);

        session.submit(&mut registry, "gui.width = 2");
        session.submit(&mut registry, "bogus");
        session.submit(&mut registry, "script.record.pause");
        session.submit(&mut registry, "gui.width = 3");
        session.submit(&mut registry, "script.record.pause");
        session.submit(&mut registry, "gui.width = 4");
        session.submit(&mut registry, "script.record.stop");

        assert_eq!(session.script(), vec!["gui.width = 2", "gui.width = 4"]);
        assert_eq!(
            registry.execute("script.show", true).text,
            "gui.width = 2\ngui.width = 4"
        );

        let result = registry.execute("script.run", true);
        assert!(result.success);
        assert_eq!(result.text, "gui.width = 2\ngui.width = 4");
        assert!(!registry.execute("script.record.pause", true).success);
    }

    #[test]
    fn test_script_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = path_in(&dir, "scripts/test.script");

        let (mut registry, session) = setup();
        session.submit(&mut registry, "script.record.start");
        session.submit(&mut registry, "gui.width = 77");
        session.submit(&mut registry, "script.record.stop");
        assert!(registry.execute(&format!("script.save {file}"), true).success);

        registry.set("gui.width", 0i32).unwrap();
        let result = registry.execute(&format!("script.load {file}"), true);
        assert!(result.success, "{}", result.text);
        assert_eq!(registry.get::<i32>("gui.width").unwrap(), 77);

        assert!(!registry.execute("script.run /nonexistent/x.script", true).success);
    }

    #[test]
    fn test_self_loading_script_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let file = path_in(&dir, "loop.script");
        fs::write(&file, format!("gui.width = 9\nscript.load {file}\n")).unwrap();

        let (mut registry, _session) = setup();
        let result = registry.execute(&format!("script.load {file}"), true);
        assert!(!result.success);
        assert!(result.text.contains("script.load: scripts nested deeper than 8 levels"));
        assert_eq!(registry.get::<i32>("gui.width").unwrap(), 9);

        // The depth unwinds once the chain fails.
        fs::write(&file, "gui.width = 10\n").unwrap();
        assert!(registry.execute(&format!("script.load {file}"), true).success);
        assert_eq!(registry.get::<i32>("gui.width").unwrap(), 10);
    }

    #[test]
    fn test_startup_running_itself_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let script = path_in(&dir, "initial.script");
        fs::write(&script, "startup\n").unwrap();

        let (mut registry, session) = setup();
        registry.set(HISTORY_FILE, path_in(&dir, "history")).unwrap();
        registry.set(SETTINGS_FILE, path_in(&dir, "settings")).unwrap();
        registry.set(INITIAL_SCRIPT, script).unwrap();

        let result = session.startup(&mut registry);
        assert!(!result.success);
        assert!(result.text.contains("nested deeper than"));
    }

    #[test]
    fn test_settings_save_filters_names() {
        let dir = tempfile::tempdir().unwrap();
        let file = path_in(&dir, "settings.xml");

        let (mut registry, _session) = setup();
        let result = registry.execute(&format!("console.settings.save {file}"), true);
        assert!(result.success, "{}", result.text);

        let text = fs::read_to_string(&file).unwrap();
        assert!(text.contains("<console.history.MaxHistory>100</console.history.MaxHistory>"));
        assert!(text.contains("<script.ScriptFileName>"));
        assert!(!text.contains("gui.width"));

        registry.set(MAX_HISTORY, 7i32).unwrap();
        assert!(registry.execute(&format!("console.settings.load {file}"), true).success);
        assert_eq!(registry.get::<i32>(MAX_HISTORY).unwrap(), 100);
    }

    #[test]
    fn test_startup_and_shutdown() {
        let dir = tempfile::tempdir().unwrap();

        let (mut registry, session) = setup();
        registry.set(HISTORY_FILE, path_in(&dir, "history")).unwrap();
        registry.set(SETTINGS_FILE, path_in(&dir, "settings")).unwrap();
        registry.set(INITIAL_SCRIPT, path_in(&dir, "initial.script")).unwrap();
        fs::write(dir.path().join("initial.script"), "gui.width = 320\n").unwrap();

        let result = session.startup(&mut registry);
        assert!(result.success, "{}", result.text);
        assert_eq!(registry.get::<i32>("gui.width").unwrap(), 320);

        session.submit(&mut registry, "gui.width");
        let result = session.shutdown(&mut registry);
        assert!(result.success, "{}", result.text);
        assert!(dir.path().join("history").exists());
        assert!(dir.path().join("settings").exists());
    }

    #[test]
    fn test_complete_logs_listing() {
        let (mut registry, session) = setup();
        registry.create("gui.height", 600i32).unwrap();

        let completion = session.complete(&registry, "gui.", 80).unwrap();
        assert!(!completion.is_unique());
        assert_eq!(session.lines().len(), 1);

        let completion = session.complete(&registry, "gui.w", 80).unwrap();
        assert_eq!(completion.command, "gui.width = 800");
        assert_eq!(session.lines().len(), 1);
    }
}
