//! YAML ruleset documents
//!
//! A ruleset declares the structural types (`divisions`) and the metadata
//! keys (`keys`) of a collection, together with the cardinality rules that
//! tie them together:
//!
//! ```yaml
//! divisions:
//!   - id: monograph
//!     label: Monograph
//!     labels: { de: Monographie }
//!     children: [chapter]
//!     rules:
//!       - { key: TitleDocMain, min: 1, max: 1 }
//! keys:
//!   - id: TitleDocMain
//!     label: Main title
//!     pattern: '\S.*'
//!   - id: Person
//!     keys:
//!       - { id: LastName }
//!       - { id: Role, options: [aut, edt] }
//!     rules:
//!       - { key: LastName, min: 1, max: 1 }
//! ```
//!
//! A key with nested `keys` is complex (it holds metadata groups). Fields not
//! named by a rule are allowed any number of times unless the level says
//! `unspecified: forbidden`.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use super::fields::DivisionView;
use super::view::{LanguagePreferences, RulesetLoader, RulesetView, StructuralElementView};
use super::RulesetError;

/// How fields without a rule are treated on a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Unspecified {
    /// Any number of occurrences
    #[default]
    Unrestricted,
    /// Not allowed at all
    Forbidden,
}

/// Value type of a simple key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Datatype {
    #[default]
    String,
    Integer,
    Boolean,
    /// `YYYY-MM-DD`
    Date,
}

impl Datatype {
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Datatype::String => true,
            Datatype::Integer => value.parse::<i64>().is_ok(),
            Datatype::Boolean => matches!(value, "true" | "false"),
            Datatype::Date => chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        }
    }
}

/// Cardinality of one key on a level
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    pub key: String,

    #[serde(default)]
    pub min: usize,

    /// Absent means unbounded
    #[serde(default)]
    pub max: Option<usize>,
}

impl Rule {
    pub fn max_occurs(&self) -> usize {
        self.max.unwrap_or(usize::MAX)
    }
}

/// A metadata key
#[derive(Debug, Clone, Deserialize)]
pub struct KeyDefinition {
    pub id: String,

    #[serde(default)]
    pub label: Option<String>,

    /// Labels by language tag
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub datatype: Datatype,

    /// Allowed values; empty means any
    #[serde(default)]
    pub options: Vec<String>,

    /// Regular expression the whole value must match
    #[serde(default)]
    pub pattern: Option<String>,

    /// Member keys; non-empty for complex keys
    #[serde(default)]
    pub keys: Vec<KeyDefinition>,

    #[serde(default)]
    pub rules: Vec<Rule>,

    #[serde(default)]
    pub unspecified: Unspecified,

    #[serde(skip)]
    pub(crate) matcher: Option<Regex>,
}

impl KeyDefinition {
    pub fn is_complex(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Checks a value against datatype, options and pattern
    pub fn accepts(&self, value: &str) -> bool {
        self.datatype.accepts(value)
            && (self.options.is_empty() || self.options.iter().any(|option| option == value))
            && self.matcher.as_ref().map_or(true, |re| re.is_match(value))
    }
}

/// A structural type
#[derive(Debug, Clone, Deserialize)]
pub struct DivisionDefinition {
    pub id: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// Types allowed as children
    #[serde(default)]
    pub children: Vec<String>,

    #[serde(default)]
    pub rules: Vec<Rule>,

    #[serde(default)]
    pub unspecified: Unspecified,
}

/// Picks the label for the preferred language, then the default label, then the ID
pub(crate) fn resolve_label(
    id: &str,
    label: Option<&str>,
    labels: &BTreeMap<String, String>,
    languages: &LanguagePreferences,
) -> String {
    languages
        .select(labels)
        .or(label)
        .unwrap_or(id)
        .to_string()
}

/// A loaded and checked ruleset
#[derive(Debug, Clone, Deserialize)]
pub struct Ruleset {
    #[serde(default)]
    pub(crate) divisions: Vec<DivisionDefinition>,

    #[serde(default)]
    pub(crate) keys: Vec<KeyDefinition>,
}

impl Ruleset {
    /// Parses and checks a ruleset from YAML
    pub fn from_yaml(content: &str) -> Result<Self, RulesetError> {
        let mut ruleset: Ruleset = serde_yaml::from_str(content)?;
        ruleset.prepare()?;
        Ok(ruleset)
    }

    /// Reads a ruleset file
    pub fn load(path: &Path) -> Result<Self, RulesetError> {
        let content = fs::read_to_string(path).map_err(|source| RulesetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn divisions(&self) -> &[DivisionDefinition] {
        &self.divisions
    }

    pub fn keys(&self) -> &[KeyDefinition] {
        &self.keys
    }

    pub fn division(&self, id: &str) -> Option<&DivisionDefinition> {
        self.divisions.iter().find(|division| division.id == id)
    }

    fn prepare(&mut self) -> Result<(), RulesetError> {
        let mut seen = HashSet::new();
        for division in &mut self.divisions {
            if !seen.insert(division.id.clone()) {
                return Err(RulesetError::Duplicate {
                    kind: "division",
                    id: division.id.clone(),
                });
            }
            lowercase_tags(&mut division.labels);
        }

        for division in &self.divisions {
            for child in &division.children {
                if !seen.contains(child) {
                    return Err(RulesetError::UnknownChild {
                        division: division.id.clone(),
                        child: child.clone(),
                    });
                }
            }
            check_rules(&division.id, &division.rules, &self.keys)?;
        }

        prepare_keys("ruleset", &mut self.keys)
    }
}

fn lowercase_tags(labels: &mut BTreeMap<String, String>) {
    *labels = std::mem::take(labels)
        .into_iter()
        .map(|(tag, label)| (tag.to_ascii_lowercase(), label))
        .collect();
}

fn check_rules(scope: &str, rules: &[Rule], keys: &[KeyDefinition]) -> Result<(), RulesetError> {
    let mut seen = HashSet::new();
    for rule in rules {
        if !keys.iter().any(|key| key.id == rule.key) {
            return Err(RulesetError::UnknownKey {
                scope: scope.to_string(),
                key: rule.key.clone(),
            });
        }
        if !seen.insert(rule.key.as_str()) {
            return Err(RulesetError::Duplicate {
                kind: "rule",
                id: format!("{}/{}", scope, rule.key),
            });
        }
        if rule.min > rule.max_occurs() {
            return Err(RulesetError::InvalidOccurs {
                scope: scope.to_string(),
                key: rule.key.clone(),
                min: rule.min,
                max: rule.max_occurs(),
            });
        }
    }
    Ok(())
}

fn prepare_keys(scope: &str, keys: &mut [KeyDefinition]) -> Result<(), RulesetError> {
    let mut seen = HashSet::new();
    for key in keys.iter_mut() {
        if !seen.insert(key.id.clone()) {
            return Err(RulesetError::Duplicate {
                kind: "key",
                id: format!("{}/{}", scope, key.id),
            });
        }
        lowercase_tags(&mut key.labels);
        if let Some(pattern) = &key.pattern {
            let matcher = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
                RulesetError::InvalidPattern {
                    key: key.id.clone(),
                    source,
                }
            })?;
            key.matcher = Some(matcher);
        }
        check_rules(&key.id, &key.rules, &key.keys)?;
        prepare_keys(&key.id, &mut key.keys)?;
    }
    Ok(())
}

impl RulesetView for Ruleset {
    fn structural_element_view<'r>(
        &'r self,
        division_type: Option<&str>,
        languages: &LanguagePreferences,
    ) -> Box<dyn StructuralElementView + 'r> {
        let definition = division_type.and_then(|id| self.division(id));
        Box::new(DivisionView::new(self, division_type, definition, languages))
    }
}

/// Loads rulesets from YAML files
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlRulesetLoader;

impl RulesetLoader for YamlRulesetLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn RulesetView>, RulesetError> {
        Ok(Box::new(Ruleset::load(path)?))
    }
}
