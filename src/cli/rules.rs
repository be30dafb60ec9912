//! Rules command: inspect a ruleset

use anyhow::{Context, Result};
use serde::Serialize;

use super::output::{bound, Output};
use crate::ruleset::{LanguagePreferences, MetadataView, Ruleset, RulesetView};
use crate::storage::{uri_to_path, Config};

#[derive(Serialize)]
struct FieldRow {
    id: String,
    label: String,
    min: usize,
    /// `None` when unbounded
    max: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldRow>,
}

impl FieldRow {
    fn from_view(view: &MetadataView<'_>) -> Self {
        let fields = match view {
            MetadataView::Complex(complex) => complex
                .allowed_metadata()
                .iter()
                .map(FieldRow::from_view)
                .collect(),
            MetadataView::Simple(_) => Vec::new(),
        };
        Self {
            id: view.id().to_string(),
            label: view.label().to_string(),
            min: view.min_occurs(),
            max: (view.max_occurs() != usize::MAX).then(|| view.max_occurs()),
            fields,
        }
    }

    fn print(&self, depth: usize) {
        println!(
            "{}{} ({}) [{}..{}]",
            "  ".repeat(depth),
            self.id,
            self.label,
            self.min,
            bound(self.max.unwrap_or(usize::MAX))
        );
        for field in &self.fields {
            field.print(depth + 1);
        }
    }
}

/// Lists the divisions of a ruleset, or the details of one division
pub fn run(
    output: &Output,
    config: &Config,
    ruleset: &str,
    division: Option<&str>,
    languages: Option<&str>,
) -> Result<()> {
    let rules = uri_to_path(ruleset)
        .map_err(anyhow::Error::from)
        .and_then(|path| Ruleset::load(&path).map_err(anyhow::Error::from))
        .with_context(|| format!("Failed to load ruleset {}", ruleset))?;
    let languages = languages
        .map(LanguagePreferences::parse)
        .unwrap_or_else(|| config.languages());

    output.verbose_ctx(
        "rules",
        &format!(
            "{} divisions, {} keys",
            rules.divisions().len(),
            rules.keys().len()
        ),
    );

    match division {
        Some(division) => show_division(output, &rules, division, &languages),
        None => list_divisions(output, &rules, &languages),
    }
    Ok(())
}

fn list_divisions(output: &Output, rules: &Ruleset, languages: &LanguagePreferences) {
    let items: Vec<_> = rules
        .divisions()
        .iter()
        .map(|division| {
            let view = rules.structural_element_view(Some(&division.id), languages);
            (division.id.clone(), view.label().to_string(), division.children.clone())
        })
        .collect();

    if output.is_json() {
        let items: Vec<_> = items
            .iter()
            .map(|(id, label, children)| {
                serde_json::json!({
                    "id": id,
                    "label": label,
                    "children": children,
                })
            })
            .collect();
        output.data(&items);
    } else if items.is_empty() {
        println!("No divisions.");
    } else {
        println!("{:<20} {:<24} CHILDREN", "ID", "LABEL");
        println!("{}", "-".repeat(60));
        for (id, label, children) in items {
            println!("{:<20} {:<24} {}", id, label, children.join(", "));
        }
    }
}

fn show_division(output: &Output, rules: &Ruleset, division: &str, languages: &LanguagePreferences) {
    if rules.division(division).is_none() {
        output.verbose_ctx(
            "rules",
            &format!("'{}' is not declared, showing the unrestricted view", division),
        );
    }

    let view = rules.structural_element_view(Some(division), languages);
    let children = view.allowed_sub_structural_elements();
    let fields: Vec<FieldRow> = view
        .allowed_metadata()
        .iter()
        .map(FieldRow::from_view)
        .collect();

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": view.id(),
            "label": view.label(),
            "children": children,
            "fields": fields,
        }));
        return;
    }

    println!("{} ({})", view.id(), view.label());
    println!();
    println!("Children:");
    if children.is_empty() {
        println!("  (none)");
    }
    for (id, label) in &children {
        println!("  {} ({})", id, label);
    }
    println!();
    println!("Fields:");
    if fields.is_empty() {
        println!("  (none)");
    }
    for field in &fields {
        field.print(1);
    }
}
