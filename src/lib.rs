//! Run-time configurable console variables.
//!
//! `cvars` keeps named, typed values that an application exposes for live
//! inspection and modification through a small command language:
//!
//! - **Registry**: a character trie from dotted names (`console.history.MaxHistory`)
//!   to type-erased cells
//! - **Interpreter**: `name` queries, `name = value` assigns, `function args...` invokes
//! - **Completion**: grouped tab completion over the name hierarchy
//! - **Persistence**: filtered save/load as XML (default), plain text or RON
//! - **Session**: history, script recording and settings files for front-ends
//!
//! # Features
//!
//! - `bevy`: `CVarsPlugin` routing console messages through the process-wide registry
//! - `terminal`: stdin/stdout backend for headless apps (implies `bevy`)
//!
//! # Quick Start
//!
//! ```
//! use cvars::core::CVarRegistry;
//!
//! let mut registry = CVarRegistry::new();
//! let gravity = registry.create("world.Gravity", 9.8f32).unwrap();
//!
//! let result = registry.execute("world.Gravity = 3.7", true);
//! assert_eq!(result.text, "world.Gravity = 3.7");
//! assert_eq!(gravity.get(), 3.7);
//!
//! let completion = registry.complete("world.G", 80).unwrap();
//! assert_eq!(completion.command, "world.Gravity = 3.7");
//! ```
//!
//! The process-wide registry is reached through the free functions at the
//! crate root:
//!
//! ```
//! cvars::create_or_get("gui.width", 800i32).unwrap();
//! assert_eq!(cvars::execute("gui.width", true).text, "gui.width = 800");
//! # cvars::teardown();
//! ```

// Everything but `plugin` and `terminal` builds without bevy
pub mod core;
pub mod persist;

mod console;
mod global;

#[cfg(feature = "bevy")]
pub mod plugin;

#[cfg(feature = "terminal")]
pub mod terminal;

pub use crate::core::{
    CVar, CVarDyn, CVarError, CVarInfo, CVarRef, CVarRegistry, CVarValue, Color, CommandArgs,
    CommandResult, Completion, ConsoleFunc, Result,
};
pub use console::{
    ConsoleSession, HISTORY_FILE, INITIAL_SCRIPT, LineKind, LogLine, MAX_HISTORY, Recording,
    SCRIPT_FILE, SETTINGS_FILE, SETTINGS_FILTERS,
};
pub use global::{
    complete, create, create_function, create_or_get, create_or_get_unsaved, create_unsaved,
    execute, exists, find, get, get_help, get_ref, is_initialized, load, save, set, set_from_text,
    teardown, value_as_text, with_registry,
};
pub use persist::{DEFAULT_CVARS_FILE, NameFilter, StreamFormat};

#[cfg(feature = "bevy")]
pub use plugin::{CVarsPlugin, CVarsSession, ConsoleInputEvent, ConsoleOutputEvent, ConsoleOutputLevel};

#[cfg(feature = "terminal")]
pub use terminal::{TerminalConfig, TerminalPlugin};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::console::ConsoleSession;
    pub use crate::core::{
        CVar, CVarError, CVarRef, CVarRegistry, CVarValue, Color, CommandArgs, CommandResult,
    };
    pub use crate::persist::{NameFilter, StreamFormat};

    #[cfg(feature = "bevy")]
    pub use crate::plugin::{CVarsPlugin, ConsoleInputEvent, ConsoleOutputEvent, ConsoleOutputLevel};
}
