//! Text conversion for the value types a console variable can hold.
//!
//! Every stored type converts to and from a single text form. That form is
//! what the console echoes, what assignments parse and what the persistence
//! codecs write.

use std::collections::BTreeMap;
use std::fmt;

use crate::persist::xml;

/// Trait for types that can be stored in a console variable.
///
/// Implemented for `bool`, the integer and float primitives, `String`,
/// [`Color`], `Vec<T>` and `BTreeMap<K, V>`.
pub trait CVarValue: Clone + Send + Sync + 'static {
    /// Parse a value from its text form.
    fn from_text(text: &str) -> Option<Self>;

    /// Render the value as text.
    fn to_text(&self) -> String;

    /// Whether the text form is a nested element that the XML stream embeds
    /// as markup rather than escaped text.
    const STRUCTURED: bool = false;
}

impl CVarValue for bool {
    fn from_text(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        }
    }

    fn to_text(&self) -> String {
        if *self { "1".to_string() } else { "0".to_string() }
    }
}

macro_rules! impl_cvar_value_via_fromstr {
    ($($t:ty),* $(,)?) => {
        $(
            impl CVarValue for $t {
                fn from_text(text: &str) -> Option<Self> {
                    text.trim().parse().ok()
                }

                fn to_text(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_cvar_value_via_fromstr!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char,
);

impl CVarValue for String {
    fn from_text(text: &str) -> Option<Self> {
        Some(text.to_string())
    }

    fn to_text(&self) -> String {
        self.clone()
    }
}

/// RGBA color with components in `0.0..=1.0`.
///
/// The text form is `[ r, g, b, a ]` with each component scaled to 0-255.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from 0-255 components.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Components scaled to 0-255, truncated.
    pub fn to_rgba8(self) -> [i32; 4] {
        [self.r, self.g, self.b, self.a].map(|c| (c * 255.0) as i32)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        write!(f, "[ {r}, {g}, {b}, {a} ]")
    }
}

impl CVarValue for Color {
    fn from_text(text: &str) -> Option<Self> {
        let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;
        let parts: Vec<i32> = inner
            .split(',')
            .map(|part| part.trim().parse().ok())
            .collect::<Option<_>>()?;

        match parts.as_slice() {
            &[r, g, b, a] => Some(Self::rgba(
                r as f32 / 255.0,
                g as f32 / 255.0,
                b as f32 / 255.0,
                a as f32 / 255.0,
            )),
            _ => None,
        }
    }

    fn to_text(&self) -> String {
        self.to_string()
    }
}

/// `[ v0 v1 v2 ]`, or `[ ]` when empty.
///
/// Parsing splits on whitespace, skips bracket tokens and drops elements that
/// do not parse.
impl<T: CVarValue> CVarValue for Vec<T> {
    fn from_text(text: &str) -> Option<Self> {
        let mut items = Vec::new();
        for token in text.split_whitespace() {
            if token.contains('[') || token.contains(']') {
                continue;
            }
            match T::from_text(token) {
                Some(item) => items.push(item),
                None => tracing::warn!("ignoring \"{}\" while parsing a list value", token),
            }
        }
        Some(items)
    }

    fn to_text(&self) -> String {
        if self.is_empty() {
            return "[ ]".to_string();
        }

        let items: Vec<String> = self.iter().map(CVarValue::to_text).collect();
        format!("[ {} ]", items.join(" "))
    }
}

/// Nested `<map><Object><Key>..</Key><Data>..</Data></Object></map>` block.
impl<K, V> CVarValue for BTreeMap<K, V>
where
    K: CVarValue + Ord,
    V: CVarValue,
{
    const STRUCTURED: bool = true;

    fn from_text(text: &str) -> Option<Self> {
        let root = xml::parse_element(text).ok()?;
        if root.name != "map" {
            return None;
        }

        let mut map = BTreeMap::new();
        for object in &root.children {
            if object.name != "Object" {
                tracing::warn!("got <{}> while expecting <Object> in a map value", object.name);
                continue;
            }

            let key = object.child("Key")?.value_text();
            let data = object.child("Data")?.value_text();
            map.insert(K::from_text(&key)?, V::from_text(&data)?);
        }
        Some(map)
    }

    fn to_text(&self) -> String {
        let mut out = xml::XmlWriter::new(4);
        out.open("map");
        for (key, data) in self {
            out.open("Object");
            out.element("Key", &key.to_text(), K::STRUCTURED);
            out.element("Data", &data.to_text(), V::STRUCTURED);
            out.close("Object");
        }
        out.close("map");
        out.finish()
    }
}
