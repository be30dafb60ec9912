//! Message keys and their display templates
//!
//! Templates use numbered placeholders (`{0}`, `{1}`, ...). Callers may
//! override any template; keys without an override use the English default.

use std::collections::HashMap;

/// Findings the validator can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// A view points at a physical structure that does not exist
    MediaMissing,
    /// `{0}`: the physical structure
    MediaUnassigned,
    /// `{0}`: the logical structure
    StructureWithoutMedia,
    /// `{0}`: the value, `{1}`: location
    InvalidData,
    /// `{0}`: location
    MandatoryElement,
    /// `{0}`: location, `{1}`: count, `{2}`: minimum
    NotOneElement,
    /// `{0}`: location, `{1}`: count, `{2}`: minimum
    NotEnoughElements,
}

impl MessageKey {
    pub const ALL: [MessageKey; 7] = [
        MessageKey::MediaMissing,
        MessageKey::MediaUnassigned,
        MessageKey::StructureWithoutMedia,
        MessageKey::InvalidData,
        MessageKey::MandatoryElement,
        MessageKey::NotOneElement,
        MessageKey::NotEnoughElements,
    ];

    /// Key used in translation tables
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::MediaMissing => "metadataMediaError",
            MessageKey::MediaUnassigned => "metadataMediaUnassigned",
            MessageKey::StructureWithoutMedia => "metadataStructureWithoutMedia",
            MessageKey::InvalidData => "metadataInvalidData",
            MessageKey::MandatoryElement => "metadataMandatoryElement",
            MessageKey::NotOneElement => "metadataNotOneElement",
            MessageKey::NotEnoughElements => "metadataNotEnoughElements",
        }
    }

    pub fn default_template(&self) -> &'static str {
        match self {
            MessageKey::MediaMissing => "media missing",
            MessageKey::MediaUnassigned => "media unassigned: {0}",
            MessageKey::StructureWithoutMedia => "structure without media: {0}",
            MessageKey::InvalidData => "invalid value \"{0}\" in {1}",
            MessageKey::MandatoryElement => "mandatory element missing: {0}",
            MessageKey::NotOneElement => "too many elements in {0} ({1}, min {2})",
            MessageKey::NotEnoughElements => "not enough elements in {0} ({1}, min {2})",
        }
    }
}

/// Translation table for validation messages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translations {
    overrides: HashMap<String, String>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the template for a key such as `metadataMediaError`
    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.overrides.insert(key.into(), template.into());
    }

    pub fn get(&self, key: MessageKey) -> &str {
        self.overrides
            .get(key.as_str())
            .map(String::as_str)
            .unwrap_or_else(|| key.default_template())
    }

    /// Fills the template for `key` with `args`
    pub fn format(&self, key: MessageKey, args: &[&str]) -> String {
        format_message(self.get(key), args)
    }

    /// Formats a message about a single structure
    ///
    /// Templates without a placeholder get the subject appended.
    pub fn about(&self, key: MessageKey, subject: &str) -> String {
        let template = self.get(key);
        if template.contains("{0}") {
            format_message(template, &[subject])
        } else {
            format!("{} {}", template, subject)
        }
    }
}

impl From<HashMap<String, String>> for Translations {
    fn from(overrides: HashMap<String, String>) -> Self {
        Self { overrides }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Translations {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            overrides: iter
                .into_iter()
                .map(|(key, template)| (key.into(), template.into()))
                .collect(),
        }
    }
}

/// Replaces `{n}` with the n-th argument
///
/// Placeholders without a matching argument are kept as written; arguments
/// are inserted verbatim and never expanded again.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            let arg = args.get(index)?;
            Some((arg, close))
        });
        match substituted {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
