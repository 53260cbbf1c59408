//! Registry of console variables.
//!
//! A character trie maps each name to its type-erased cell. The registry owns
//! every cell: dropping the registry (or calling [`CVarRegistry::clear`])
//! releases all of them.

use std::any::type_name;
use std::fmt;

use super::{
    CVar, CVarDyn, CVarError, CVarRef, CVarValue, CommandArgs, CommandResult, ConsoleFunc,
    Result, Trie, builtins,
};
use crate::persist::StreamFormat;

/// Names the filter-list syntax claims for itself.
pub const RESERVED_NAMES: [&str; 3] = ["true", "false", "not"];

/// One row of [`CVarRegistry::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CVarInfo {
    pub name: String,
    pub value: String,
    pub help: String,
    pub is_function: bool,
}

/// Central storage for console variables and console functions.
///
/// # Examples
///
/// ```
/// use cvars::core::{CVarError, CVarRegistry};
///
/// let mut registry = CVarRegistry::new();
///
/// let gravity = registry.create("world.Gravity", 9.8f32).unwrap();
/// assert_eq!(registry.get::<f32>("world.Gravity").unwrap(), 9.8);
///
/// // Declaring it again hands back the same binding.
/// let again = registry.create_or_get("world.Gravity", 1.0f32).unwrap();
/// assert!(again.ptr_eq(&gravity));
///
/// assert!(matches!(
///     registry.create("world.Gravity", 0.0f32),
///     Err(CVarError::AlreadyExists(_))
/// ));
/// ```
pub struct CVarRegistry {
    trie: Trie<Box<dyn CVarDyn>>,
    verbose: bool,
    format: StreamFormat,
}

impl Default for CVarRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CVarRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CVarRegistry")
            .field("len", &self.trie.len())
            .field("verbose", &self.verbose)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl CVarRegistry {
    /// Create a registry holding the built-in variables and functions.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        builtins::register(&mut registry);
        registry
    }

    /// Create a registry with nothing in it.
    pub fn empty() -> Self {
        Self {
            trie: Trie::new(),
            verbose: false,
            format: StreamFormat::default(),
        }
    }

    /// Check that `name` may be registered.
    ///
    /// Names double as XML element names in saved files, so they are limited
    /// to alphanumerics, `.`, `_`, `-` and `:`, and may not start with a
    /// digit, `.` or `-`.
    pub fn validate_name(name: &str) -> Result<()> {
        if RESERVED_NAMES.contains(&name) {
            return Err(CVarError::ReservedName(name.to_string()));
        }
        let valid_start = name
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_' || c == ':');
        let valid_rest = name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | ':'));
        if !valid_start || !valid_rest {
            return Err(CVarError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    /// Register a fully configured cell.
    pub fn register<T: CVarValue>(&mut self, cvar: CVar<T>) -> Result<CVarRef<T>> {
        let name = cvar.name().to_string();
        Self::validate_name(&name)?;
        if self.trie.contains(&name) {
            return Err(CVarError::AlreadyExists(name));
        }

        let handle = cvar.handle();
        self.trie.insert(&name, Box::new(cvar));
        tracing::trace!("registered {} ({})", name, type_name::<T>());
        Ok(handle)
    }

    /// Register a cell, or return the existing binding if the name is taken.
    ///
    /// The existing value is left as it is.
    pub fn register_or_get<T: CVarValue>(&mut self, cvar: CVar<T>) -> Result<CVarRef<T>> {
        if self.trie.contains(cvar.name()) {
            self.get_ref(cvar.name())
        } else {
            self.register(cvar)
        }
    }

    /// Create a persisted variable.
    pub fn create<T: CVarValue>(&mut self, name: &str, value: T) -> Result<CVarRef<T>> {
        self.register(CVar::new(name, value))
    }

    /// Create a variable that save and load ignore.
    pub fn create_unsaved<T: CVarValue>(&mut self, name: &str, value: T) -> Result<CVarRef<T>> {
        self.register(CVar::new(name, value).unsaved())
    }

    /// Create a persisted variable, or bind to the one already registered.
    pub fn create_or_get<T: CVarValue>(&mut self, name: &str, value: T) -> Result<CVarRef<T>> {
        self.register_or_get(CVar::new(name, value))
    }

    /// [`create_or_get`](Self::create_or_get) for a variable save and load ignore.
    pub fn create_or_get_unsaved<T: CVarValue>(
        &mut self,
        name: &str,
        value: T,
    ) -> Result<CVarRef<T>> {
        self.register_or_get(CVar::new(name, value).unsaved())
    }

    /// Create a console function.
    pub fn create_function<F>(&mut self, name: &str, handler: F) -> Result<CVarRef<ConsoleFunc>>
    where
        F: Fn(&CommandArgs<'_>, &mut CVarRegistry) -> CommandResult + Send + Sync + 'static,
    {
        self.register(CVar::new(name, ConsoleFunc::new(handler)).unsaved())
    }

    /// Type-erased cell for `name`.
    pub fn cell(&self, name: &str) -> Result<&dyn CVarDyn> {
        self.trie
            .get(name)
            .map(|cell| &**cell)
            .ok_or_else(|| CVarError::NotFound(name.to_string()))
    }

    fn typed<T: CVarValue>(&self, name: &str) -> Result<&CVar<T>> {
        self.cell(name)?
            .downcast_ref::<T>()
            .ok_or_else(|| CVarError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Copy of a variable's value.
    pub fn get<T: CVarValue>(&self, name: &str) -> Result<T> {
        self.typed::<T>(name).map(CVar::get)
    }

    /// Live binding to a variable's value.
    pub fn get_ref<T: CVarValue>(&self, name: &str) -> Result<CVarRef<T>> {
        self.typed::<T>(name).map(CVar::handle)
    }

    /// Overwrite a variable's value.
    pub fn set<T: CVarValue>(&self, name: &str, value: T) -> Result<()> {
        self.typed::<T>(name)?.set(value);
        Ok(())
    }

    /// Check whether a name is registered.
    #[inline]
    pub fn exists(&self, name: &str) -> bool {
        self.trie.contains(name)
    }

    /// True when `name` is registered and holds a console function.
    pub fn is_function(&self, name: &str) -> bool {
        self.cell(name).is_ok_and(|cell| cell.is_function())
    }

    /// A variable's value in its text form.
    pub fn value_as_text(&self, name: &str) -> Result<String> {
        Ok(self.cell(name)?.value_text())
    }

    /// Parse `text` with the variable's own conversion and store the result.
    pub fn set_from_text(&self, name: &str, text: &str) -> Result<()> {
        if self.cell(name)?.set_text(text) {
            Ok(())
        } else {
            Err(CVarError::InvalidValue {
                name: name.to_string(),
                text: text.to_string(),
            })
        }
    }

    /// A variable's help text.
    pub fn get_help(&self, name: &str) -> Result<String> {
        Ok(self.cell(name)?.help().to_string())
    }

    /// Names containing `needle`, in creation order.
    pub fn find(&self, needle: &str) -> Vec<String> {
        self.trie
            .find_by_substring(needle)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Every variable with its value and help, in name-index order.
    pub fn list(&self) -> Vec<CVarInfo> {
        self.iter()
            .map(|(name, cell)| CVarInfo {
                name: name.to_string(),
                value: cell.value_text(),
                help: cell.help().to_string(),
                is_function: cell.is_function(),
            })
            .collect()
    }

    /// Iterate over `(name, cell)` in name-index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn CVarDyn)> {
        self.trie.iter().map(|(name, cell)| (name, &**cell))
    }

    /// Iterate over names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.trie.names()
    }

    /// Number of registered names.
    #[inline]
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Drop every cell. Outstanding [`CVarRef`]s keep their values but are
    /// no longer reachable by name.
    pub fn clear(&mut self) {
        self.trie.clear();
    }

    /// The name index.
    #[inline]
    pub fn trie(&self) -> &Trie<Box<dyn CVarDyn>> {
        &self.trie
    }

    #[inline]
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Default verbosity for save and load when a filter list does not set it.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    #[inline]
    pub fn format(&self) -> StreamFormat {
        self.format
    }

    /// Select the stream format used by save and load.
    pub fn set_format(&mut self, format: StreamFormat) {
        self.format = format;
    }

    /// Read an integer setting, falling back when it is absent or not an `i32`.
    pub(crate) fn int_setting(&self, name: &str, fallback: i32) -> i32 {
        self.get::<i32>(name).unwrap_or(fallback)
    }

    /// Read a text setting, falling back when it is absent, empty or not a `String`.
    pub(crate) fn text_setting(&self, name: &str, fallback: &str) -> String {
        self.get::<String>(name)
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}
