//! Core console variable types with zero optional dependencies.
//!
//! This module provides the fundamental building blocks:
//! - [`CVarRegistry`] - Central registry for every variable and function
//! - [`CVar`] / [`CVarRef`] - Typed cells and live bindings to their values
//! - [`ConsoleFunc`] - Callables stored in the registry like variables
//! - [`Trie`] - Character trie used for lookup and tab completion
//! - [`parse_line`] - Command line classification for the interpreter

mod builtins;
mod complete;
mod cvar;
mod error;
mod function;
mod interpreter;
mod parse;
mod registry;
mod trie;
mod value;

pub use builtins::{INDENT_INCR, VERBOSE_PADDING_WIDTH};
pub use complete::{Completion, recursion_level};
pub use cvar::{CVar, CVarDyn, CVarRef, DEFAULT_HELP, FromText, ToText};
pub use error::{CVarError, Result};
pub use function::{CommandArgs, CommandResult, ConsoleFunc, FuncHandler};
pub use parse::{CommandLine, parse_line};
pub use registry::{CVarInfo, CVarRegistry, RESERVED_NAMES};
pub use trie::{NodeId, NodeKind, Trie, TrieNode};
pub use value::{CVarValue, Color};
