//! Variables and functions every [`CVarRegistry::new`] starts with.

use super::{CVar, CVarRegistry, CommandArgs, CommandResult, ConsoleFunc};
use crate::persist::DEFAULT_CVARS_FILE;

/// Name padding used by verbose save/load logging.
pub const VERBOSE_PADDING_WIDTH: &str = "console.VerbosePaddingWidth";

/// Indentation step of the XML writer.
pub const INDENT_INCR: &str = "console.CVarIndentIncr";

const GENERAL_HELP: &str = "\
----------------- HELP -----------------
Press TAB to see the available commands and functions
Setting a value: [command] = value
Getting a value: [command]
Functions: [function] [arg1] [arg2] ...
help [name] gives help about a variable or function
find [substring] lists the names containing it
----------------- HELP -----------------";

pub(crate) fn register(registry: &mut CVarRegistry) {
    let vars = [
        CVar::new(VERBOSE_PADDING_WIDTH, 30i32)
            .help("Width names are padded to in verbose save and load output"),
        CVar::new(INDENT_INCR, 4i32).help("Indentation step of saved files"),
    ];
    for cvar in vars {
        if let Err(err) = registry.register_or_get(cvar) {
            tracing::warn!("{}", err);
        }
    }

    let funcs: [(&str, &str, fn(&CommandArgs<'_>, &mut CVarRegistry) -> CommandResult); 6] = [
        (
            "help",
            "Gives help information about the console or more specifically about a CVar.",
            help,
        ),
        (
            "find",
            "find 'name' will return the list of CVars containing 'name' as a substring.",
            find,
        ),
        (
            "save",
            "save [file] [substrings...] [true|false]: save the CVars to a file",
            save,
        ),
        (
            "load",
            "load [file] [substrings...] [true|false]: load CVars from a file",
            load,
        ),
        ("console.version", "The current version of the CVars library", version),
        ("cvars.list", "cvars.list [prefix]: list variables and their values", list),
    ];
    for (name, help, handler) in funcs {
        let cvar = CVar::new(name, ConsoleFunc::new(handler)).help(help).unsaved();
        if let Err(err) = registry.register_or_get(cvar) {
            tracing::warn!("{}", err);
        }
    }
}

fn help(args: &CommandArgs<'_>, registry: &mut CVarRegistry) -> CommandResult {
    if args.is_empty() {
        return CommandResult::ok(GENERAL_HELP);
    }

    let mut success = true;
    let lines: Vec<String> = args
        .iter()
        .map(|name| match registry.get_help(name) {
            Ok(help) => format!("{name}: {help}"),
            Err(err) => {
                success = false;
                err.to_string()
            }
        })
        .collect();

    CommandResult {
        success,
        text: lines.join("\n"),
    }
}

fn find(args: &CommandArgs<'_>, registry: &mut CVarRegistry) -> CommandResult {
    let names: Vec<String> = args.iter().flat_map(|needle| registry.find(needle)).collect();
    CommandResult::ok(names.join("\n"))
}

fn save(args: &CommandArgs<'_>, registry: &mut CVarRegistry) -> CommandResult {
    let file = args.get_or(0, DEFAULT_CVARS_FILE);
    let filters = args.as_slice().get(1..).unwrap_or(&[]);

    match registry.save(file, filters) {
        Ok(count) => CommandResult::ok(format!("Saved {count} cvars to \"{file}\".")),
        Err(err) => CommandResult::err(format!("Error saving file: {err}")),
    }
}

fn load(args: &CommandArgs<'_>, registry: &mut CVarRegistry) -> CommandResult {
    let file = args.get_or(0, DEFAULT_CVARS_FILE);
    let filters = args.as_slice().get(1..).unwrap_or(&[]);

    match registry.load(file, filters) {
        Ok(count) => CommandResult::ok(format!("Loaded {count} cvars from \"{file}\".")),
        Err(err) => CommandResult::err(format!("Error: could not load \"{file}\": {err}")),
    }
}

fn version(_args: &CommandArgs<'_>, _registry: &mut CVarRegistry) -> CommandResult {
    CommandResult::ok(format!("CVars v{}", env!("CARGO_PKG_VERSION")))
}

fn list(args: &CommandArgs<'_>, registry: &mut CVarRegistry) -> CommandResult {
    let prefix = args.get_or(0, "");

    let mut lines: Vec<String> = registry
        .list()
        .into_iter()
        .filter(|info| !info.is_function && info.name.starts_with(prefix))
        .map(|info| format!("{} = {}", info.name, info.value))
        .collect();
    lines.push(format!("{} cvars", lines.len()));

    CommandResult::ok(lines.join("\n"))
}
