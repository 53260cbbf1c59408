//! Command interpreter: query, assign and invoke.
//!
//! Forms are tried in this order on the trimmed line:
//!
//! 1. a registered name alone: print `name = value`, or call it if it is a
//!    console function
//! 2. `name = value`: parse `value` with the variable's own conversion
//! 3. `function arg ...`: call a console function with the arguments
//!
//! Anything else fails with "command not found". A blank line succeeds
//! silently. Failures come back as `CommandResult { success: false, .. }`,
//! never as a panic or an `Err`.

use super::{CVarError, CVarRegistry, CommandArgs, CommandLine, CommandResult, parse_line};

impl CVarRegistry {
    /// Interpret one command line.
    ///
    /// With `execute == false` the line is parsed and resolved but nothing is
    /// assigned or called. Front-ends use that mode to echo replayed history.
    ///
    /// # Examples
    ///
    /// ```
    /// use cvars::core::CVarRegistry;
    ///
    /// let mut registry = CVarRegistry::empty();
    /// registry.create("foo", 5i32).unwrap();
    ///
    /// assert_eq!(registry.execute("foo", true).text, "foo = 5");
    /// assert_eq!(registry.execute("foo = 10", true).text, "foo = 10");
    /// assert!(!registry.execute("bar = 1", true).success);
    /// ```
    pub fn execute(&mut self, line: &str, execute: bool) -> CommandResult {
        let trimmed = line.trim();
        tracing::debug!("execute{}: {}", if execute { "" } else { " (dry)" }, trimmed);

        match parse_line(trimmed) {
            CommandLine::Empty => CommandResult::empty(),
            CommandLine::Name(name) => {
                if self.is_function(name) {
                    self.invoke(name, trimmed, Vec::new(), execute)
                } else {
                    match self.value_as_text(name) {
                        Ok(value) => CommandResult::ok(format!("{name} = {value}")),
                        Err(_) => not_found_command(trimmed),
                    }
                }
            }
            CommandLine::Assign { name, value } => self.assign(name, value, execute),
            CommandLine::Call { name, args } => {
                if self.is_function(name) {
                    self.invoke(name, trimmed, args, execute)
                } else {
                    not_found_command(trimmed)
                }
            }
        }
    }

    fn assign(&mut self, name: &str, value: &str, execute: bool) -> CommandResult {
        if value.is_empty() {
            return not_found_command(name);
        }
        if !self.exists(name) {
            return CommandResult::err(CVarError::NotFound(name.to_string()).to_string());
        }
        if !execute {
            return CommandResult::ok(format!("{name} = {value}"));
        }

        match self
            .set_from_text(name, value)
            .and_then(|()| self.value_as_text(name))
        {
            Ok(text) => CommandResult::ok(format!("{name} = {text}")),
            Err(err) => {
                tracing::warn!("{}", err);
                CommandResult::err(err.to_string())
            }
        }
    }

    fn invoke(&mut self, name: &str, line: &str, args: Vec<&str>, execute: bool) -> CommandResult {
        let Some(func) = self.cell(name).ok().and_then(|cell| cell.function()) else {
            return not_found_command(line);
        };
        if !execute {
            return CommandResult::empty();
        }

        // The handle is cloned out, so the handler may borrow the registry.
        func.call(&CommandArgs::new(args), self)
    }
}

fn not_found_command(line: &str) -> CommandResult {
    CommandResult::err(CVarError::ParseFailure(line.to_string()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CVarRef;
    use std::sync::{Arc, Mutex};

    fn registry_with_foo() -> (CVarRegistry, CVarRef<i32>) {
        let mut registry = CVarRegistry::empty();
        let foo = registry.create("foo", 5i32).unwrap();
        (registry, foo)
    }

    #[test]
    fn test_query() {
        let (mut registry, _) = registry_with_foo();
        let result = registry.execute("foo", true);
        assert_eq!(result, CommandResult::ok("foo = 5"));

        let result = registry.execute("   foo   ", true);
        assert_eq!(result.text, "foo = 5");
    }

    #[test]
    fn test_assign() {
        let (mut registry, foo) = registry_with_foo();
        let result = registry.execute("foo = 10", true);
        assert!(result.success);
        assert_eq!(result.text, "foo = 10");
        assert_eq!(foo.get(), 10);

        let result = registry.execute("foo=11", true);
        assert_eq!(result.text, "foo = 11");
    }

    #[test]
    fn test_assign_unknown() {
        let (mut registry, _) = registry_with_foo();
        let result = registry.execute("bar = 1", true);
        assert!(!result.success);
        assert!(result.text.contains("bar"));
        assert!(result.text.contains("not found"));
    }

    #[test]
    fn test_assign_empty_value() {
        let (mut registry, foo) = registry_with_foo();
        let result = registry.execute("foo =", true);
        assert!(!result.success);
        assert_eq!(result.text, "foo: command not found");
        assert_eq!(foo.get(), 5);
    }

    #[test]
    fn test_assign_unparsable() {
        let (mut registry, foo) = registry_with_foo();
        let result = registry.execute("foo = ten", true);
        assert!(!result.success);
        assert_eq!(foo.get(), 5);
    }

    #[test]
    fn test_empty_line() {
        let (mut registry, _) = registry_with_foo();
        assert_eq!(registry.execute("", true), CommandResult::empty());
        assert_eq!(registry.execute("   ", false), CommandResult::empty());
    }

    #[test]
    fn test_unknown() {
        let (mut registry, _) = registry_with_foo();
        let result = registry.execute("nonsense", true);
        assert_eq!(result, CommandResult::err("nonsense: command not found"));

        let result = registry.execute("foo 3", true);
        assert_eq!(result, CommandResult::err("foo 3: command not found"));
    }

    #[test]
    fn test_dry_mode_changes_nothing() {
        let (mut registry, foo) = registry_with_foo();
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        registry
            .create_function("bump", move |_, _| {
                *counter.lock().unwrap() += 1;
                CommandResult::ok("bumped")
            })
            .unwrap();

        let result = registry.execute("foo = 42", false);
        assert!(result.success);
        assert_eq!(result.text, "foo = 42");
        assert_eq!(foo.get(), 5);

        assert!(registry.execute("bump", false).success);
        assert!(registry.execute("bump a b", false).success);
        assert_eq!(*calls.lock().unwrap(), 0);

        assert!(!registry.execute("bar = 1", false).success);

        assert_eq!(registry.execute("bump", true).text, "bumped");
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_invoke_with_args() {
        let mut registry = CVarRegistry::empty();
        registry
            .create_function("sum", |args, _| {
                let total: i32 = args.iter().filter_map(|a| a.parse::<i32>().ok()).sum();
                CommandResult::ok(total.to_string())
            })
            .unwrap();

        let result = registry.execute("sum 1  2 3", true);
        assert_eq!(result, CommandResult::ok("6"));

        let result = registry.execute("sum", true);
        assert_eq!(result, CommandResult::ok("0"));
    }

    #[test]
    fn test_function_reaches_registry() {
        let mut registry = CVarRegistry::empty();
        registry.create("counter", 0i32).unwrap();
        registry
            .create_function("incr", |_, registry| {
                let next = registry.get::<i32>("counter").unwrap_or(0) + 1;
                match registry.set("counter", next) {
                    Ok(()) => CommandResult::ok(next.to_string()),
                    Err(err) => CommandResult::err(err.to_string()),
                }
            })
            .unwrap();

        registry.execute("incr", true);
        registry.execute("incr", true);
        assert_eq!(registry.get::<i32>("counter").unwrap(), 2);
    }

    #[test]
    fn test_function_failure_propagates() {
        let mut registry = CVarRegistry::empty();
        registry
            .create_function("fail", |_, _| CommandResult::err("fail: nope"))
            .unwrap();

        let result = registry.execute("fail", true);
        assert!(!result.success);
        assert_eq!(result.text, "fail: nope");
    }
}
