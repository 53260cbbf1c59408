//! Console variable cells.
//!
//! A cell owns one value behind a shared handle, plus its help text, its
//! persist flag and the text conversion chosen when it was built. The
//! registry stores cells as `Box<dyn CVarDyn>` so it never needs to know the
//! concrete value type.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{CVarValue, ConsoleFunc};

/// Help text given to variables created without one.
pub const DEFAULT_HELP: &str = "No help available";

/// Value to text conversion for one cell.
pub type ToText<T> = fn(&T) -> String;

/// Text to value conversion for one cell.
pub type FromText<T> = fn(&str) -> Option<T>;

/// Live binding to a variable's storage.
///
/// Host code keeps this handle; the interpreter and the persistence codecs
/// write through the same storage, so changes made either way are visible to
/// both.
///
/// # Examples
///
/// ```
/// use cvars::core::CVarRegistry;
///
/// let mut registry = CVarRegistry::empty();
/// let width = registry.create("gui.width", 800i32).unwrap();
///
/// registry.execute("gui.width = 1024", true);
/// assert_eq!(width.get(), 1024);
///
/// width.set(640);
/// assert_eq!(registry.value_as_text("gui.width").unwrap(), "640");
/// ```
pub struct CVarRef<T>(Arc<RwLock<T>>);

impl<T> Clone for CVarRef<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: CVarValue> CVarRef<T> {
    fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Copy of the current value.
    #[inline]
    pub fn get(&self) -> T {
        self.read().clone()
    }

    /// Overwrite the value.
    #[inline]
    pub fn set(&self, value: T) {
        *self.write() = value;
    }

    /// Modify the value in place.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.write());
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// True when both handles point at the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: CVarValue + fmt::Debug> fmt::Debug for CVarRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CVarRef").field(&*self.read()).finish()
    }
}

/// A console variable cell, built with a name and an initial value.
///
/// # Examples
///
/// ```
/// use cvars::core::{CVar, CVarRegistry};
///
/// let mut registry = CVarRegistry::empty();
/// let fov = registry
///     .register(CVar::new("camera.Fov", 90i32).help("Field of view in degrees"))
///     .unwrap();
///
/// assert_eq!(fov.get(), 90);
/// assert_eq!(registry.get_help("camera.Fov").unwrap(), "Field of view in degrees");
/// ```
pub struct CVar<T: CVarValue> {
    name: Box<str>,
    value: CVarRef<T>,
    help: String,
    persist: bool,
    to_text: ToText<T>,
    from_text: FromText<T>,
}

impl<T: CVarValue> CVar<T> {
    /// Create a persisted cell using `T`'s own text conversion.
    pub fn new(name: impl Into<Box<str>>, value: T) -> Self {
        Self {
            name: name.into(),
            value: CVarRef::new(value),
            help: DEFAULT_HELP.to_string(),
            persist: true,
            to_text: T::to_text,
            from_text: T::from_text,
        }
    }

    /// Set the help text.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Exclude the cell from save and load.
    pub fn unsaved(mut self) -> Self {
        self.persist = false;
        self
    }

    /// Set whether the cell takes part in save and load.
    pub fn persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Replace the text conversion for this one cell.
    pub fn codec(mut self, to_text: ToText<T>, from_text: FromText<T>) -> Self {
        self.to_text = to_text;
        self.from_text = from_text;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle to the cell's storage.
    #[inline]
    pub fn handle(&self) -> CVarRef<T> {
        self.value.clone()
    }

    #[inline]
    pub fn get(&self) -> T {
        self.value.get()
    }

    #[inline]
    pub fn set(&self, value: T) {
        self.value.set(value);
    }

    #[inline]
    pub fn get_help(&self) -> &str {
        &self.help
    }

    #[inline]
    pub fn is_persistent(&self) -> bool {
        self.persist
    }
}

/// Type-erased interface every cell implements.
pub trait CVarDyn: Send + Sync {
    fn name(&self) -> &str;

    fn help(&self) -> &str;

    /// Whether save and load include this cell.
    fn persist(&self) -> bool;

    /// Current value through the cell's value-to-text conversion.
    fn value_text(&self) -> String;

    /// Parse `text` with the cell's text-to-value conversion and store it.
    /// Returns `false`, leaving the value untouched, if parsing fails.
    fn set_text(&self, text: &str) -> bool;

    /// Type tag of the stored value.
    fn value_type(&self) -> TypeId;

    /// Rust name of the stored value type.
    fn type_name(&self) -> &'static str;

    /// See [`CVarValue::STRUCTURED`].
    fn structured(&self) -> bool;

    /// Get as Any for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: CVarValue> CVarDyn for CVar<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn help(&self) -> &str {
        &self.help
    }

    fn persist(&self) -> bool {
        self.persist
    }

    fn value_text(&self) -> String {
        (self.to_text)(&self.value.read())
    }

    fn set_text(&self, text: &str) -> bool {
        match (self.from_text)(text) {
            Some(value) => {
                self.value.set(value);
                true
            }
            None => false,
        }
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn structured(&self) -> bool {
        T::STRUCTURED
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<'a> dyn CVarDyn + 'a {
    /// True when the cell holds a [`ConsoleFunc`].
    #[inline]
    pub fn is_function(&self) -> bool {
        self.value_type() == TypeId::of::<ConsoleFunc>()
    }

    /// The callable, if the cell holds one.
    pub fn function(&self) -> Option<ConsoleFunc> {
        self.downcast_ref::<ConsoleFunc>().map(CVar::get)
    }

    /// Try to view the cell as a `CVar<T>`.
    pub fn downcast_ref<T: CVarValue>(&self) -> Option<&CVar<T>> {
        self.as_any().downcast_ref()
    }
}

impl<T: CVarValue> fmt::Display for CVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value_text())
    }
}

impl<T: CVarValue> fmt::Debug for CVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CVar")
            .field("name", &self.name)
            .field("value", &self.value_text())
            .field("persist", &self.persist)
            .finish_non_exhaustive()
    }
}
