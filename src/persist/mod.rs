//! Saving and loading variable values.
//!
//! Three stream formats are supported:
//!
//! - [`StreamFormat::Xml`] (default): a `<cvars>` element with one child per
//!   variable, named after it. Structured values nest.
//! - [`StreamFormat::Text`]: one `name = value` per line. Blank lines and
//!   lines starting with `#` or `//` are ignored.
//! - [`StreamFormat::Ron`]: `(cvars: { "name": "value" })`.
//!
//! Only variables with the persist flag, a non-empty text value and a name
//! accepted by the [`NameFilter`] are written. Loading parses the whole file
//! first; a structural error aborts before any variable changes.

pub mod filter;
pub mod xml;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{CVarError, CVarRegistry, INDENT_INCR, Result, VERBOSE_PADDING_WIDTH};

pub use filter::NameFilter;

/// File used when a save or load names none.
pub const DEFAULT_CVARS_FILE: &str = "cvars.xml";

/// Root element of the XML stream.
const XML_ROOT: &str = "cvars";

/// On-disk layout selected with [`CVarRegistry::set_format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamFormat {
    #[default]
    Xml,
    Text,
    Ron,
}

/// RON stream layout.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CVarsFile {
    /// Variable values (name -> text value).
    #[serde(default)]
    pub cvars: BTreeMap<String, String>,
}

struct Reporter {
    verbose: bool,
    width: usize,
}

impl Reporter {
    fn new(registry: &CVarRegistry, verbose: bool) -> Self {
        let width = registry.int_setting(VERBOSE_PADDING_WIDTH, 30);
        Self {
            verbose,
            width: usize::try_from(width).unwrap_or(0),
        }
    }

    fn line(&self, name: &str, status: &str) {
        let width = self.width;
        if self.verbose {
            tracing::info!("{name:<width$} {status}");
        } else {
            tracing::debug!("{name:<width$} {status}");
        }
    }
}

impl CVarRegistry {
    /// Save variables to `path`.
    ///
    /// `filters` is a filter list as parsed by [`NameFilter::parse`]. Returns
    /// the number of variables written.
    pub fn save<S: AsRef<str>>(&self, path: impl AsRef<Path>, filters: &[S]) -> Result<usize> {
        let (filter, verbose) = NameFilter::parse(filters);
        self.save_filtered(path, &filter, verbose.unwrap_or(self.is_verbose()))
    }

    /// Save the variables `filter` accepts to `path`.
    pub fn save_filtered(
        &self,
        path: impl AsRef<Path>,
        filter: &NameFilter,
        verbose: bool,
    ) -> Result<usize> {
        let path = path.as_ref();
        let (contents, count) = self.render(filter, verbose)?;
        write_file(path, &contents)?;

        tracing::info!("saved {} cvars to \"{}\"", count, path.display());
        Ok(count)
    }

    /// Render the variables `filter` accepts in the current stream format.
    pub fn save_to_string(&self, filter: &NameFilter) -> Result<String> {
        self.render(filter, self.is_verbose()).map(|(contents, _)| contents)
    }

    fn render(&self, filter: &NameFilter, verbose: bool) -> Result<(String, usize)> {
        let reporter = Reporter::new(self, verbose);

        let mut entries = Vec::new();
        for (name, cell) in self.iter() {
            if cell.is_function() {
                continue;
            }
            if !cell.persist() {
                reporter.line(name, "not persisted, skipped");
                continue;
            }
            if !filter.accepts(name) {
                reporter.line(name, "filtered out");
                continue;
            }

            let value = cell.value_text();
            if value.is_empty() {
                reporter.line(name, "empty, skipped");
                continue;
            }
            reporter.line(name, "saved");
            entries.push((name, value, cell.structured()));
        }

        let count = entries.len();
        let contents = match self.format() {
            StreamFormat::Xml => {
                let step = self.int_setting(INDENT_INCR, 4);
                let mut writer = xml::XmlWriter::new(usize::try_from(step).unwrap_or(4));
                writer.open(XML_ROOT);
                for (name, value, structured) in &entries {
                    writer.element(name, value, *structured);
                }
                writer.close(XML_ROOT);
                writer.finish()
            }
            StreamFormat::Text => entries
                .iter()
                .map(|(name, value, _)| format!("{} = {}\n", name, flatten(value)))
                .collect(),
            StreamFormat::Ron => {
                let file = CVarsFile {
                    cvars: entries
                        .into_iter()
                        .map(|(name, value, _)| (name.to_string(), value))
                        .collect(),
                };
                let pretty = ron::ser::PrettyConfig::new()
                    .depth_limit(2)
                    .separate_tuple_members(true)
                    .enumerate_arrays(false);
                ron::ser::to_string_pretty(&file, pretty)
                    .map_err(|e| CVarError::malformed("<ron>", e.to_string()))?
            }
        };

        Ok((contents, count))
    }

    /// Load variables from `path`.
    ///
    /// Returns the number of variables updated. Unknown and filtered names
    /// are skipped.
    pub fn load<S: AsRef<str>>(&self, path: impl AsRef<Path>, filters: &[S]) -> Result<usize> {
        let (filter, verbose) = NameFilter::parse(filters);
        self.load_filtered(path, &filter, verbose.unwrap_or(self.is_verbose()))
    }

    /// Load the variables `filter` accepts from `path`.
    pub fn load_filtered(
        &self,
        path: impl AsRef<Path>,
        filter: &NameFilter,
        verbose: bool,
    ) -> Result<usize> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| CVarError::io(path, e))?;

        let count = self.apply(&contents, path, filter, verbose)?;
        tracing::info!("loaded {} cvars from \"{}\"", count, path.display());
        Ok(count)
    }

    /// Load from text in the current stream format.
    pub fn load_from_str(&self, contents: &str, filter: &NameFilter) -> Result<usize> {
        self.apply(contents, Path::new("<string>"), filter, self.is_verbose())
    }

    fn apply(
        &self,
        contents: &str,
        path: &Path,
        filter: &NameFilter,
        verbose: bool,
    ) -> Result<usize> {
        let pairs = parse_stream(contents, self.format(), path)?;
        let reporter = Reporter::new(self, verbose);

        let mut applied = 0;
        for (name, value) in pairs {
            let Ok(cell) = self.cell(&name) else {
                reporter.line(&name, "unknown, skipped");
                continue;
            };
            if !filter.accepts(&name) {
                reporter.line(&name, "filtered out");
                continue;
            }
            if !cell.persist() || cell.is_function() {
                reporter.line(&name, "not persisted, skipped");
                continue;
            }
            if cell.set_text(&value) {
                reporter.line(&name, "loaded");
                applied += 1;
            } else {
                tracing::warn!("{}", CVarError::InvalidValue { name, text: value });
            }
        }

        Ok(applied)
    }
}

/// Write `contents` to `path`, creating missing parent directories.
pub(crate) fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| CVarError::io(parent, e))?;
        }
    }
    fs::write(path, contents).map_err(|e| CVarError::io(path, e))
}

// Text lines hold one value each.
fn flatten(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a whole stream into `(name, value)` pairs without touching any
/// variable.
pub fn parse_stream(
    contents: &str,
    format: StreamFormat,
    path: &Path,
) -> Result<Vec<(String, String)>> {
    match format {
        StreamFormat::Xml => {
            let root = xml::parse_document(contents)
                .map_err(|e| CVarError::malformed(path, e.to_string()))?;
            if root.name != XML_ROOT {
                return Err(CVarError::malformed(
                    path,
                    format!("could not find a <{XML_ROOT}> node"),
                ));
            }

            let mut pairs = Vec::with_capacity(root.children.len());
            for element in root.children {
                if element.children.is_empty() && element.text.is_empty() {
                    tracing::warn!("{}: no value found in \"{}\"", element.name, path.display());
                    continue;
                }
                let value = element.value_text();
                pairs.push((element.name, value));
            }
            Ok(pairs)
        }
        StreamFormat::Text => contents
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#') && !line.starts_with("//"))
            .map(|(number, line)| match line.split_once('=') {
                Some((name, value)) => Ok((name.trim().to_string(), value.trim().to_string())),
                None => Err(CVarError::malformed(
                    path,
                    format!("line {number}: expected \"name = value\""),
                )),
            })
            .collect(),
        StreamFormat::Ron => {
            let file: CVarsFile =
                ron::from_str(contents).map_err(|e| CVarError::malformed(path, e.to_string()))?;
            Ok(file.cvars.into_iter().collect())
        }
    }
}
