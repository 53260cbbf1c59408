//! Tab completion over the name index.
//!
//! Candidates are grouped by "recursion level", the number of `.` separators
//! in a name. Completing `console.` while `console.history.MaxHistory` and
//! `console.MaxLines` exist lists `console.MaxLines` and `console.history`,
//! not every leaf below.

use std::collections::BTreeMap;

use super::{CVarRegistry, NodeKind};

/// Padding added after the longest candidate in a listing.
const COLUMN_GAP: usize = 3;

/// Result of [`CVarRegistry::complete`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// The command line after completion: extended by any unambiguous
    /// characters, or `name = value` for a unique variable.
    pub command: String,
    /// Grouped candidate names, sorted.
    pub candidates: Vec<String>,
    /// Column-formatted listing of variable candidates.
    pub variable_lines: Vec<String>,
    /// Column-formatted listing of function candidates.
    pub function_lines: Vec<String>,
}

impl Completion {
    /// True when the partial line resolved to a single name.
    pub fn is_unique(&self) -> bool {
        self.variable_lines.is_empty() && self.function_lines.is_empty()
    }

    /// Variable lines followed by function lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.variable_lines
            .iter()
            .chain(&self.function_lines)
            .map(String::as_str)
    }
}

/// Number of `.` separators in a name.
pub fn recursion_level(name: &str) -> usize {
    name.matches('.').count()
}

/// Cut `name` before the separator that ends segment `level`.
///
/// A negative level, or one deeper than the name, keeps the whole name.
fn truncate_at_level(name: &str, level: isize) -> &str {
    if level < 0 {
        return name;
    }
    match name.match_indices('.').nth(level.unsigned_abs()) {
        Some((cut, _)) => &name[..cut],
        None => name,
    }
}

impl CVarRegistry {
    /// Complete a partial command line.
    ///
    /// Returns `None` when nothing in the registry matches. Listings wrap
    /// once a line would exceed `max_width` characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use cvars::core::CVarRegistry;
    ///
    /// let mut registry = CVarRegistry::empty();
    /// registry.create("a.one", 1i32).unwrap();
    /// registry.create("a.two", 2i32).unwrap();
    /// registry.create("b.one", 3i32).unwrap();
    ///
    /// let listing = registry.complete("a", 80).unwrap();
    /// assert_eq!(listing.command, "a.");
    /// assert_eq!(listing.candidates, ["a.one", "a.two"]);
    ///
    /// let unique = registry.complete("a.one", 80).unwrap();
    /// assert_eq!(unique.command, "a.one = 1");
    /// ```
    pub fn complete(&self, partial: &str, max_width: usize) -> Option<Completion> {
        let trie = self.trie();
        let mut command = partial.trim().to_string();

        let node = match trie.find_prefix_node(&command) {
            Some(node) => node,
            None => {
                let stripped = command[..command.rfind('=')?].trim().to_string();
                let node = trie.find_prefix_node(&stripped)?;
                command = stripped;
                node
            }
        };

        if trie.node(node).is_leaf() || trie.node(node).children().is_empty() {
            return self.complete_unique(&command);
        }

        let leaves = trie.collect_leaves(node);
        let names: Vec<&str> = leaves
            .iter()
            .filter_map(|&leaf| trie.node(leaf).name())
            .collect();

        match names.as_slice() {
            [] => return None,
            [only] => return self.complete_unique(only),
            _ => {}
        }

        let level = grouping_level(&names);

        // Truncated entry -> whether every name behind it is a function.
        let mut groups: BTreeMap<&str, bool> = BTreeMap::new();
        for name in &names {
            let is_function = self.is_function(name);
            groups
                .entry(truncate_at_level(name, level))
                .and_modify(|all| *all &= is_function)
                .or_insert(is_function);
        }

        let width = groups.keys().map(|entry| entry.chars().count()).max().unwrap_or(0) + COLUMN_GAP;
        let variables = groups.iter().filter(|(_, f)| !**f).map(|(entry, _)| *entry);
        let functions = groups.iter().filter(|(_, f)| **f).map(|(entry, _)| *entry);
        let variable_lines = format_columns(variables, width, max_width);
        let function_lines = format_columns(functions, width, max_width);

        // Extend through every branch with a single child.
        let mut extra = 0;
        let mut current = node;
        while let [only] = trie.node(current).children() {
            if !matches!(trie.node(*only).kind(), NodeKind::Branch(_)) {
                break;
            }
            current = *only;
            extra += 1;
        }

        let candidates: Vec<String> = groups.keys().map(|entry| entry.to_string()).collect();
        let keep = command.chars().count() + extra;
        if let Some(first) = candidates.first() {
            command = first.chars().take(keep).collect();
        }

        Some(Completion {
            command,
            candidates,
            variable_lines,
            function_lines,
        })
    }

    fn complete_unique(&self, name: &str) -> Option<Completion> {
        let cell = self.cell(name).ok()?;
        let command = if cell.is_function() {
            name.to_string()
        } else {
            format!("{} = {}", name, cell.value_text())
        };

        Some(Completion {
            command,
            candidates: vec![name.to_string()],
            ..Completion::default()
        })
    }
}

/// Level to group candidates at: the shallowest candidate's level, or one
/// above it when those shallowest candidates come from different parents.
fn grouping_level(names: &[&str]) -> isize {
    let min_level = names.iter().map(|name| recursion_level(name)).min().unwrap_or(0);
    let min_level = isize::try_from(min_level).unwrap_or(isize::MAX);

    let mut roots: Vec<&str> = names
        .iter()
        .filter(|name| recursion_level(name) as isize == min_level)
        .map(|name| truncate_at_level(name, min_level - 1))
        .collect();
    roots.sort_unstable();
    roots.dedup();

    if roots.len() > 1 { min_level - 1 } else { min_level }
}

/// Pad entries to `width` and pack them into lines of at most `max_width`.
fn format_columns<'a>(
    entries: impl Iterator<Item = &'a str>,
    width: usize,
    max_width: usize,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for entry in entries {
        let padded = format!("{entry:<width$}");
        if !line.is_empty() && line.chars().count() + padded.chars().count() > max_width {
            lines.push(line.trim_end().to_string());
            line.clear();
        }
        line.push_str(&padded);
    }
    if !line.is_empty() {
        lines.push(line.trim_end().to_string());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CommandResult;

    fn abc_registry() -> CVarRegistry {
        let mut registry = CVarRegistry::empty();
        registry.create("a.one", 1i32).unwrap();
        registry.create("a.two", 2i32).unwrap();
        registry.create("b.one", 3i32).unwrap();
        registry
    }

    #[test]
    fn test_truncate_at_level() {
        assert_eq!(truncate_at_level("a.b.c", 0), "a");
        assert_eq!(truncate_at_level("a.b.c", 1), "a.b");
        assert_eq!(truncate_at_level("a.b.c", 2), "a.b.c");
        assert_eq!(truncate_at_level("a.b.c", 7), "a.b.c");
        assert_eq!(truncate_at_level("a.b.c", -1), "a.b.c");
        assert_eq!(recursion_level("console.history.MaxHistory"), 2);
    }

    #[test]
    fn test_complete_group() {
        let registry = abc_registry();
        let completion = registry.complete("a", 80).unwrap();

        assert_eq!(completion.command, "a.");
        assert_eq!(completion.candidates, vec!["a.one", "a.two"]);
        assert_eq!(completion.variable_lines, vec!["a.one   a.two"]);
        assert!(completion.function_lines.is_empty());
        assert!(!completion.is_unique());
    }

    #[test]
    fn test_complete_unique_appends_value() {
        let registry = abc_registry();
        let completion = registry.complete("a.one", 80).unwrap();

        assert_eq!(completion.command, "a.one = 1");
        assert!(completion.is_unique());
        assert_eq!(completion.lines().count(), 0);
    }

    #[test]
    fn test_complete_unique_prefix() {
        let registry = abc_registry();
        let completion = registry.complete("b", 80).unwrap();
        assert_eq!(completion.command, "b.one = 3");
    }

    #[test]
    fn test_complete_root_widens_to_parents() {
        let registry = abc_registry();
        let completion = registry.complete("", 80).unwrap();

        assert_eq!(completion.candidates, vec!["a", "b"]);
        assert_eq!(completion.command, "");
    }

    #[test]
    fn test_complete_groups_deeper_names() {
        let mut registry = CVarRegistry::empty();
        registry.create("console.MaxLines", 1i32).unwrap();
        registry.create("console.history.MaxHistory", 2i32).unwrap();
        registry.create("console.history.HistoryFileName", String::new()).unwrap();

        let completion = registry.complete("console.", 80).unwrap();
        assert_eq!(completion.candidates, vec!["console.MaxLines", "console.history"]);
        assert_eq!(completion.command, "console.");
    }

    #[test]
    fn test_complete_strips_assignment() {
        let registry = abc_registry();
        let completion = registry.complete("a.two = 99", 80).unwrap();
        assert_eq!(completion.command, "a.two = 2");
    }

    #[test]
    fn test_complete_nothing() {
        let registry = abc_registry();
        assert!(registry.complete("zzz", 80).is_none());
        assert!(registry.complete("zzz = 1", 80).is_none());
        assert!(CVarRegistry::empty().complete("", 80).is_none());
    }

    #[test]
    fn test_complete_function_stays_bare() {
        let mut registry = CVarRegistry::empty();
        registry
            .create_function("script.run", |_, _| CommandResult::empty())
            .unwrap();
        registry
            .create_function("script.show", |_, _| CommandResult::empty())
            .unwrap();
        registry.create("script.ScriptFileName", String::from("x")).unwrap();

        let completion = registry.complete("script.r", 80).unwrap();
        assert_eq!(completion.command, "script.run");

        let completion = registry.complete("script", 80).unwrap();
        assert_eq!(completion.variable_lines, vec!["script.ScriptFileName"]);
        assert_eq!(completion.function_lines.len(), 1);
        assert!(completion.function_lines[0].starts_with("script.run"));
        assert!(completion.function_lines[0].ends_with("script.show"));
    }

    #[test]
    fn test_complete_fills_common_prefix() {
        let mut registry = CVarRegistry::empty();
        registry.create("gui.window.width", 1i32).unwrap();
        registry.create("gui.window.height", 2i32).unwrap();

        let completion = registry.complete("g", 80).unwrap();
        assert_eq!(completion.command, "gui.window.");
        assert_eq!(
            completion.candidates,
            vec!["gui.window.height", "gui.window.width"]
        );
    }

    #[test]
    fn test_listing_wraps() {
        let mut registry = CVarRegistry::empty();
        for name in ["x.aaaa", "x.bbbb", "x.cccc", "x.dddd"] {
            registry.create(name, 0i32).unwrap();
        }

        // Each padded entry is 9 wide; two fit in 20 columns.
        let completion = registry.complete("x.", 20).unwrap();
        assert_eq!(
            completion.variable_lines,
            vec!["x.aaaa   x.bbbb", "x.cccc   x.dddd"]
        );
    }

    #[test]
    fn test_complete_sibling_name_and_longer_name() {
        let mut registry = CVarRegistry::empty();
        registry.create("test", 1i32).unwrap();
        registry.create("testing", 2i32).unwrap();

        let completion = registry.complete("te", 80).unwrap();
        assert_eq!(completion.candidates, vec!["test", "testing"]);
        assert_eq!(completion.command, "test");
    }
}
