//! Process-wide registry.
//!
//! Command lines do not say which registry they address, so front-ends share
//! one. It is created on first use, may be requested any number of times
//! and is dropped by [`teardown`]. Every function here locks it for the
//! duration of the call.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::core::{
    CVarRef, CVarRegistry, CVarValue, CommandArgs, CommandResult, Completion, ConsoleFunc, Result,
};

static REGISTRY: Mutex<Option<CVarRegistry>> = Mutex::new(None);

fn lock() -> MutexGuard<'static, Option<CVarRegistry>> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run `f` with exclusive access to the process-wide registry, creating it
/// if needed.
///
/// Console functions already hold this lock while they run: they must use
/// the registry they are handed instead of calling back in here.
pub fn with_registry<R>(f: impl FnOnce(&mut CVarRegistry) -> R) -> R {
    let mut guard = lock();
    let registry = guard.get_or_insert_with(|| {
        tracing::debug!("creating the process-wide cvar registry");
        CVarRegistry::new()
    });
    f(registry)
}

/// True between first use and [`teardown`].
pub fn is_initialized() -> bool {
    lock().is_some()
}

/// Drop the process-wide registry and every cell it owns.
///
/// Returns false when there was nothing to drop. The next call to any
/// function in this module starts over with a fresh registry.
pub fn teardown() -> bool {
    let registry = lock().take();
    if let Some(registry) = &registry {
        tracing::debug!("dropping the process-wide cvar registry ({} names)", registry.len());
    }
    registry.is_some()
}

/// [`CVarRegistry::create`] on the process-wide registry.
pub fn create<T: CVarValue>(name: &str, value: T) -> Result<CVarRef<T>> {
    with_registry(|registry| registry.create(name, value))
}

/// [`CVarRegistry::create_unsaved`] on the process-wide registry.
pub fn create_unsaved<T: CVarValue>(name: &str, value: T) -> Result<CVarRef<T>> {
    with_registry(|registry| registry.create_unsaved(name, value))
}

/// [`CVarRegistry::create_or_get`] on the process-wide registry.
pub fn create_or_get<T: CVarValue>(name: &str, value: T) -> Result<CVarRef<T>> {
    with_registry(|registry| registry.create_or_get(name, value))
}

/// [`CVarRegistry::create_or_get_unsaved`] on the process-wide registry.
pub fn create_or_get_unsaved<T: CVarValue>(name: &str, value: T) -> Result<CVarRef<T>> {
    with_registry(|registry| registry.create_or_get_unsaved(name, value))
}

/// [`CVarRegistry::create_function`] on the process-wide registry.
pub fn create_function<F>(name: &str, handler: F) -> Result<CVarRef<ConsoleFunc>>
where
    F: Fn(&CommandArgs<'_>, &mut CVarRegistry) -> CommandResult + Send + Sync + 'static,
{
    with_registry(|registry| registry.create_function(name, handler))
}

pub fn get<T: CVarValue>(name: &str) -> Result<T> {
    with_registry(|registry| registry.get(name))
}

pub fn get_ref<T: CVarValue>(name: &str) -> Result<CVarRef<T>> {
    with_registry(|registry| registry.get_ref(name))
}

pub fn set<T: CVarValue>(name: &str, value: T) -> Result<()> {
    with_registry(|registry| registry.set(name, value))
}

pub fn exists(name: &str) -> bool {
    with_registry(|registry| registry.exists(name))
}

pub fn get_help(name: &str) -> Result<String> {
    with_registry(|registry| registry.get_help(name))
}

pub fn value_as_text(name: &str) -> Result<String> {
    with_registry(|registry| registry.value_as_text(name))
}

pub fn set_from_text(name: &str, text: &str) -> Result<()> {
    with_registry(|registry| registry.set_from_text(name, text))
}

pub fn find(needle: &str) -> Vec<String> {
    with_registry(|registry| registry.find(needle))
}

/// Interpret a command line against the process-wide registry.
pub fn execute(line: &str, execute: bool) -> CommandResult {
    with_registry(|registry| registry.execute(line, execute))
}

/// Complete a partial command line against the process-wide registry.
pub fn complete(partial: &str, max_width: usize) -> Option<Completion> {
    with_registry(|registry| registry.complete(partial, max_width))
}

pub fn save<S: AsRef<str>>(path: impl AsRef<Path>, filters: &[S]) -> Result<usize> {
    with_registry(|registry| registry.save(path, filters))
}

pub fn load<S: AsRef<str>>(path: impl AsRef<Path>, filters: &[S]) -> Result<usize> {
    with_registry(|registry| registry.load(path, filters))
}
