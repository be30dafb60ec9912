//! Project management
//!
//! A project is a directory holding documents and rulesets, marked by a
//! `.workpiece/` directory with its configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::{Config, PROJECT_DIR};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a workpiece project. Run 'workpiece init' first.")]
    NotInProject,
}

const DEFAULT_CONFIG: &str = r#"# Workpiece configuration

# Ruleset used by 'workpiece validate' without --ruleset (relative to the project root)
# default_ruleset = "rulesets/default.yaml"

# Languages for labels, most preferred first
# languages = "de, en;q=0.5"

# Message templates by key, e.g.
# [translations]
# metadataMediaError = "Medien fehlen"
"#;

/// A workpiece project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Initializes a new project at the given path
    ///
    /// Existing files are left untouched, so running it twice is harmless.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let project_dir = root.join(PROJECT_DIR);

        fs::create_dir_all(&project_dir).with_context(|| {
            format!(
                "Failed to create {} directory: {}",
                PROJECT_DIR,
                project_dir.display()
            )
        })?;

        let rulesets_dir = root.join("rulesets");
        fs::create_dir_all(&rulesets_dir).with_context(|| {
            format!(
                "Failed to create rulesets directory: {}",
                rulesets_dir.display()
            )
        })?;

        let config_path = project_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Self::open(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the `.workpiece` directory path
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn rulesets_dir(&self) -> PathBuf {
        self.root.join("rulesets")
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.project_dir().is_dir());
        assert!(project.rulesets_dir().is_dir());
        assert!(project.project_dir().join("config.toml").is_file());
        assert!(project.config().project.default_ruleset.is_none());
    }

    #[test]
    fn init_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        let project_dir = dir.path().join(PROJECT_DIR);
        fs::create_dir_all(&project_dir).unwrap();
        fs::write(project_dir.join("config.toml"), "languages = \"de\"\n").unwrap();

        let project = Project::init(dir.path()).unwrap();
        assert_eq!(project.config().project.languages.as_deref(), Some("de"));
    }

    #[test]
    fn open_outside_project_fails() {
        let dir = TempDir::new().unwrap();
        let err = Project::open(dir.path()).err().unwrap();

        assert!(err.to_string().contains("workpiece init"));
    }
}
