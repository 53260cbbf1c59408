//! Command line classification.
//!
//! A line is one of:
//!
//! - empty (only whitespace)
//! - an assignment, `name = value`, split at the first `=`
//! - a word list, `name [arg ...]`, split on whitespace
//!
//! Variable names never contain whitespace or `=`, so a single-word line is
//! always a candidate bare name. There is no quoting: every whitespace run
//! separates two arguments.

/// A classified command line borrowing from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine<'a> {
    /// Nothing but whitespace.
    Empty,
    /// `name = value`, both sides trimmed. `value` may be empty.
    Assign { name: &'a str, value: &'a str },
    /// A name with no arguments.
    Name(&'a str),
    /// A name followed by whitespace-separated arguments.
    Call { name: &'a str, args: Vec<&'a str> },
}

impl<'a> CommandLine<'a> {
    /// The name the line addresses, if any.
    pub fn name(&self) -> Option<&'a str> {
        match self {
            CommandLine::Empty => None,
            CommandLine::Assign { name, .. }
            | CommandLine::Name(name)
            | CommandLine::Call { name, .. } => Some(name),
        }
    }
}

/// Classify a command line.
///
/// # Examples
///
/// ```
/// use cvars::core::{parse_line, CommandLine};
///
/// assert_eq!(parse_line("   "), CommandLine::Empty);
/// assert_eq!(parse_line("gui.width"), CommandLine::Name("gui.width"));
/// assert_eq!(
///     parse_line(" gui.width =  800 "),
///     CommandLine::Assign { name: "gui.width", value: "800" }
/// );
/// assert_eq!(
///     parse_line("save  my.xml gui"),
///     CommandLine::Call { name: "save", args: vec!["my.xml", "gui"] }
/// );
/// ```
pub fn parse_line(input: &str) -> CommandLine<'_> {
    let line = input.trim();
    if line.is_empty() {
        return CommandLine::Empty;
    }

    if let Some((name, value)) = line.split_once('=') {
        return CommandLine::Assign {
            name: name.trim(),
            value: value.trim(),
        };
    }

    let mut words = line.split_whitespace();
    let name = words.next().unwrap_or(line);
    let args: Vec<&str> = words.collect();

    if args.is_empty() {
        CommandLine::Name(name)
    } else {
        CommandLine::Call { name, args }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(parse_line(""), CommandLine::Empty);
        assert_eq!(parse_line(" \t "), CommandLine::Empty);
        assert_eq!(parse_line("").name(), None);
    }

    #[test]
    fn test_bare_name() {
        assert_eq!(parse_line("  foo  "), CommandLine::Name("foo"));
        assert_eq!(parse_line("foo").name(), Some("foo"));
    }

    #[test]
    fn test_assignment_splits_at_first_equals() {
        assert_eq!(
            parse_line("foo = 10"),
            CommandLine::Assign { name: "foo", value: "10" }
        );
        assert_eq!(
            parse_line("expr=a=b"),
            CommandLine::Assign { name: "expr", value: "a=b" }
        );
        assert_eq!(
            parse_line("foo ="),
            CommandLine::Assign { name: "foo", value: "" }
        );
    }

    #[test]
    fn test_assignment_keeps_inner_spaces() {
        assert_eq!(
            parse_line("title =  hello   world "),
            CommandLine::Assign { name: "title", value: "hello   world" }
        );
    }

    #[test]
    fn test_call_args() {
        assert_eq!(
            parse_line("find  gui   console"),
            CommandLine::Call { name: "find", args: vec!["gui", "console"] }
        );
    }

    #[test]
    fn test_no_quoting() {
        assert_eq!(
            parse_line(r#"echo "two words""#),
            CommandLine::Call { name: "echo", args: vec!["\"two", "words\""] }
        );
    }

    #[test]
    fn test_tabs_separate_args() {
        assert_eq!(
            parse_line(" a  b\tc "),
            CommandLine::Call { name: "a", args: vec!["b", "c"] }
        );
    }
}
