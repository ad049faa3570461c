//! Directory structure and file generation for .docchat initialization.

use super::error::{InitError, InitResult};
use super::templates::{get_template, list_templates};
use crate::config::loader::CONFIG_DIR;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for initializing a .docchat directory.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Target directory where .docchat will be created.
    pub target_dir: PathBuf,

    /// Overwrite existing .docchat directory if it exists.
    pub force: bool,

    /// Only write `config.toml` and keep the built-in prompts.
    pub minimal: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            target_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            force: false,
            minimal: false,
        }
    }
}

/// Generate a .docchat directory structure from the embedded templates.
///
/// ```text
/// .docchat/
/// ├── config.toml
/// └── prompts/                 (unless minimal)
///     ├── condense-question.md
///     └── qa.md
/// ```
///
/// Returns the path of the created directory.
///
/// # Errors
/// - `DirectoryExists` if `.docchat` exists and `force` is not set
/// - `TemplateNotFound` if an embedded template is missing
/// - `DirectoryCreate` / `FileWrite` on file system failures
pub async fn generate_docchat_structure(options: InitOptions) -> InitResult<PathBuf> {
    let dc_dir = options.target_dir.join(CONFIG_DIR);

    if dc_dir.exists() && !options.force {
        return Err(InitError::DirectoryExists(dc_dir));
    }

    fs::create_dir_all(&dc_dir).map_err(|source| InitError::DirectoryCreate {
        path: dc_dir.clone(),
        source,
    })?;

    write_template_file(&dc_dir, "config.toml")?;

    if !options.minimal {
        for prompt_path in list_templates("prompts/") {
            write_template_file(&dc_dir, &prompt_path)?;
        }
    }

    tracing::info!(path = %dc_dir.display(), minimal = options.minimal, "Initialized docchat project");

    Ok(dc_dir)
}

/// Write one embedded template below `dc_dir`, creating parent directories.
fn write_template_file(dc_dir: &Path, template_path: &str) -> InitResult<()> {
    let content = get_template(template_path)
        .ok_or_else(|| InitError::TemplateNotFound(template_path.to_string()))?;

    let target_path = dc_dir.join(template_path);

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|source| InitError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&target_path, content).map_err(|source| InitError::FileWrite {
        path: target_path,
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::load_config;
    use crate::config::models::AppConfig;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_generate_structure_success() {
        let dir = tempdir().unwrap();
        let options = InitOptions {
            target_dir: dir.path().to_path_buf(),
            force: false,
            minimal: false,
        };

        let dc_dir = generate_docchat_structure(options).await.unwrap();
        assert_eq!(dc_dir, dir.path().join(".docchat"));

        assert!(dc_dir.join("config.toml").exists());
        let condense = fs::read_to_string(dc_dir.join("prompts/condense-question.md")).unwrap();
        assert!(condense.contains("name: condense-question"));
        assert!(dc_dir.join("prompts/qa.md").exists());
    }

    #[tokio::test]
    async fn test_generated_structure_loads_as_builtin() {
        let dir = tempdir().unwrap();
        generate_docchat_structure(InitOptions {
            target_dir: dir.path().to_path_buf(),
            force: false,
            minimal: false,
        })
        .await
        .unwrap();

        let config = load_config(dir.path()).await.unwrap();
        assert_eq!(config, AppConfig::builtin().unwrap());
    }

    #[tokio::test]
    async fn test_generate_structure_minimal() {
        let dir = tempdir().unwrap();
        let options = InitOptions {
            target_dir: dir.path().to_path_buf(),
            force: false,
            minimal: true,
        };

        let dc_dir = generate_docchat_structure(options).await.unwrap();

        assert!(dc_dir.join("config.toml").exists());
        assert!(
            !dc_dir.join("prompts").exists(),
            "prompts should not be written in minimal mode"
        );
    }

    #[tokio::test]
    async fn test_generate_structure_exists_without_force() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".docchat")).unwrap();

        let options = InitOptions {
            target_dir: dir.path().to_path_buf(),
            force: false,
            minimal: false,
        };

        let result = generate_docchat_structure(options).await;
        assert!(
            matches!(result, Err(InitError::DirectoryExists(_))),
            "Should return DirectoryExists error"
        );
    }

    #[tokio::test]
    async fn test_generate_structure_exists_with_force() {
        let dir = tempdir().unwrap();
        let dc_dir = dir.path().join(".docchat");
        fs::create_dir_all(&dc_dir).unwrap();
        fs::write(dc_dir.join("config.toml"), "qa_model = \"old\"").unwrap();

        let options = InitOptions {
            target_dir: dir.path().to_path_buf(),
            force: true,
            minimal: false,
        };

        generate_docchat_structure(options).await.unwrap();

        let config = fs::read_to_string(dc_dir.join("config.toml")).unwrap();
        assert!(!config.contains("\"old\""), "config.toml should be overwritten");
    }

    #[test]
    fn test_default_init_options() {
        let options = InitOptions::default();
        assert!(!options.force);
        assert!(!options.minimal);
    }
}
