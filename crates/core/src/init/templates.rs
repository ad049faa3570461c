//! Embedded template files for .docchat initialization.
//!
//! The workspace `templates/` directory is embedded into the binary at
//! compile time. The same files back `docchat init` and the built-in prompts
//! used when a project has no `.docchat/` directory.

use rust_embed::RustEmbed;

/// Embedded template files from the workspace `templates/` directory.
///
/// With the `debug-embed` feature, debug builds embed the files as well
/// instead of reading them from disk at runtime.
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../templates"]
pub struct TemplateAssets;

/// Get template file content by path.
///
/// # Arguments
/// * `path` - Relative path from templates root (e.g., "config.toml", "prompts/qa.md")
///
/// # Returns
/// The file content as a String, or None if the file doesn't exist.
///
/// # Example
/// ```
/// use dc_core::init::templates::get_template;
///
/// let config = get_template("config.toml").expect("config.toml should exist");
/// assert!(config.contains("qa_model ="));
/// ```
pub fn get_template(path: &str) -> Option<String> {
    TemplateAssets::get(path).map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

/// List all template files under a directory prefix, sorted by path.
///
/// # Example
/// ```
/// use dc_core::init::templates::list_templates;
///
/// let prompts = list_templates("prompts/");
/// assert!(prompts.contains(&"prompts/qa.md".to_string()));
/// ```
pub fn list_templates(prefix: &str) -> Vec<String> {
    let mut paths: Vec<String> = TemplateAssets::iter()
        .filter(|path| path.starts_with(prefix))
        .map(|path| path.to_string())
        .collect();
    paths.sort();
    paths
}
