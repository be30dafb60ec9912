//! Validate command

use anyhow::{anyhow, Context, Result};

use super::output::Output;
use crate::ruleset::LanguagePreferences;
use crate::storage::Config;
use crate::validation::{MetadataValidator, State};

/// Validates a document and prints the findings
///
/// Returns the overall state so the caller can pick the exit code.
pub fn run(
    output: &Output,
    config: &Config,
    document: &str,
    ruleset: Option<&str>,
    languages: Option<&str>,
) -> Result<State> {
    let ruleset = match ruleset {
        Some(uri) => uri.to_string(),
        None => config
            .default_ruleset()
            .map(|path| path.display().to_string())
            .ok_or_else(|| {
                anyhow!("No ruleset given. Pass --ruleset or set default_ruleset in .workpiece/config.toml")
            })?,
    };
    let languages = languages
        .map(LanguagePreferences::parse)
        .unwrap_or_else(|| config.languages());
    let translations = config.translations();

    output.verbose_ctx("validate", &format!("Document: {}", document));
    output.verbose_ctx("validate", &format!("Ruleset: {}", ruleset));

    let result = MetadataValidator::default()
        .validate(document, &ruleset, &languages, &translations)
        .with_context(|| format!("Validation of {} could not be completed", document))?;

    output.verbose_ctx(
        "validate",
        &format!("{} findings, state {}", result.messages.len(), result.state),
    );

    if output.is_json() {
        output.data(&result);
    } else {
        println!("{}", result.state);
        for message in &result.messages {
            println!("  - {}", message);
        }
    }

    Ok(result.state)
}
