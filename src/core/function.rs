//! Console functions: variables whose value is a callable.
//!
//! A console function is stored in an ordinary cell and told apart from other
//! variables only by its value type. It is invoked by naming it on the
//! command line, optionally followed by whitespace-separated arguments.

use std::fmt;
use std::sync::Arc;

use super::{CVarRegistry, CVarValue};

/// Arguments passed to a console function.
#[derive(Debug, Clone)]
pub struct CommandArgs<'a> {
    /// Arguments after the function name.
    args: Vec<&'a str>,
}

impl<'a> CommandArgs<'a> {
    pub fn new(args: Vec<&'a str>) -> Self {
        Self { args }
    }

    /// Get the number of arguments.
    #[inline]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Get an argument by index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).copied()
    }

    /// Get an argument or a default value.
    #[inline]
    pub fn get_or(&self, index: usize, default: &'a str) -> &'a str {
        self.args.get(index).copied().unwrap_or(default)
    }

    #[inline]
    pub fn as_slice(&self) -> &[&'a str] {
        &self.args
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.args.iter().copied()
    }

    /// Join all arguments with a separator.
    pub fn join(&self, separator: &str) -> String {
        self.args.join(separator)
    }
}

/// Outcome of one interpreter call: a success flag and the text to display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandResult {
    pub success: bool,
    pub text: String,
}

impl CommandResult {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: text.into(),
        }
    }

    pub fn err(text: impl Into<String>) -> Self {
        Self {
            success: false,
            text: text.into(),
        }
    }

    /// A silent success.
    pub fn empty() -> Self {
        Self::ok(String::new())
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl<E: std::error::Error> From<Result<String, E>> for CommandResult {
    fn from(result: Result<String, E>) -> Self {
        match result {
            Ok(text) => Self::ok(text),
            Err(err) => Self::err(err.to_string()),
        }
    }
}

/// Signature of console function handlers.
///
/// Handlers get the parsed arguments and the registry that is executing them.
/// They run while the registry is borrowed for the call, so they reach other
/// variables through the `registry` argument only.
pub type FuncHandler =
    dyn Fn(&CommandArgs<'_>, &mut CVarRegistry) -> CommandResult + Send + Sync;

/// A callable stored as a variable value.
///
/// # Examples
///
/// ```
/// use cvars::core::{CommandResult, CVarRegistry};
///
/// let mut registry = CVarRegistry::empty();
/// registry
///     .create_function("echo", |args, _| CommandResult::ok(args.join(" ")))
///     .unwrap();
///
/// let result = registry.execute("echo hello world", true);
/// assert!(result.success);
/// assert_eq!(result.text, "hello world");
/// ```
#[derive(Clone)]
pub struct ConsoleFunc(Arc<FuncHandler>);

impl ConsoleFunc {
    /// Wrap a handler.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&CommandArgs<'_>, &mut CVarRegistry) -> CommandResult + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    /// Run the handler.
    pub fn call(&self, args: &CommandArgs<'_>, registry: &mut CVarRegistry) -> CommandResult {
        (self.0)(args, registry)
    }
}

impl fmt::Debug for ConsoleFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConsoleFunc")
    }
}

/// Functions have no text form: they render empty, so save skips them, and
/// no text parses into one.
impl CVarValue for ConsoleFunc {
    fn from_text(_text: &str) -> Option<Self> {
        None
    }

    fn to_text(&self) -> String {
        String::new()
    }
}
