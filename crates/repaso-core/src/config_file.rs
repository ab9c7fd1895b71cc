use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub drive: Option<DriveConfig>,
    pub endpoints: Option<EndpointsConfig>,
    pub defaults: Option<DefaultsConfig>,
}

/// Cloud-drive folder layout for notes and textbooks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Drive folder holding the notes documents (one DOCX per subject).
    pub notes_path: Option<String>,
    /// Drive folder holding the textbook PDFs.
    pub books_path: Option<String>,
}

/// Hosted-model endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointsConfig {
    pub generator_url: Option<String>,
    pub caption_url: Option<String>,
}

/// Defaults applied when the CLI flags are omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub question_count: Option<u32>,
    pub time_limit_secs: Option<u32>,
    pub language: Option<String>,
}

/// Platform config directory path: `<config_dir>/repaso/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("repaso").join("config.toml"))
}

/// Load config by cascading CWD `.repaso.toml` over the platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".repaso.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        drive: Some(DriveConfig {
            notes_path: overlay
                .drive
                .as_ref()
                .and_then(|d| d.notes_path.clone())
                .or_else(|| base.drive.as_ref().and_then(|d| d.notes_path.clone())),
            books_path: overlay
                .drive
                .as_ref()
                .and_then(|d| d.books_path.clone())
                .or_else(|| base.drive.as_ref().and_then(|d| d.books_path.clone())),
        }),
        endpoints: Some(EndpointsConfig {
            generator_url: overlay
                .endpoints
                .as_ref()
                .and_then(|e| e.generator_url.clone())
                .or_else(|| base.endpoints.as_ref().and_then(|e| e.generator_url.clone())),
            caption_url: overlay
                .endpoints
                .as_ref()
                .and_then(|e| e.caption_url.clone())
                .or_else(|| base.endpoints.as_ref().and_then(|e| e.caption_url.clone())),
        }),
        defaults: Some(DefaultsConfig {
            question_count: overlay
                .defaults
                .as_ref()
                .and_then(|d| d.question_count)
                .or_else(|| base.defaults.as_ref().and_then(|d| d.question_count)),
            time_limit_secs: overlay
                .defaults
                .as_ref()
                .and_then(|d| d.time_limit_secs)
                .or_else(|| base.defaults.as_ref().and_then(|d| d.time_limit_secs)),
            language: overlay
                .defaults
                .as_ref()
                .and_then(|d| d.language.clone())
                .or_else(|| base.defaults.as_ref().and_then(|d| d.language.clone())),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_partial_config() {
        let parsed: ConfigFile = toml::from_str(
            r#"
            [endpoints]
            generator_url = "https://example.hf.space/run/predict"
            "#,
        )
        .unwrap();
        assert_eq!(
            parsed.endpoints.as_ref().unwrap().generator_url.as_deref(),
            Some("https://example.hf.space/run/predict")
        );
        assert!(parsed.drive.is_none());
        assert!(parsed.defaults.is_none());
    }

    #[test]
    fn overlay_wins_on_conflict() {
        let base: ConfigFile = toml::from_str(
            r#"
            [defaults]
            question_count = 10
            time_limit_secs = 20
            "#,
        )
        .unwrap();
        let overlay: ConfigFile = toml::from_str(
            r#"
            [defaults]
            question_count = 25
            "#,
        )
        .unwrap();
        let merged = merge(base, overlay);
        let defaults = merged.defaults.unwrap();
        assert_eq!(defaults.question_count, Some(25));
        // Untouched base value survives the merge.
        assert_eq!(defaults.time_limit_secs, Some(20));
    }

    #[test]
    fn unreadable_path_yields_none() {
        assert!(load_from_path(&PathBuf::from("/nonexistent/repaso.toml")).is_none());
    }

    #[test]
    fn loads_from_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[drive]\nnotes_path = \"/COLEGIO/ASIGNATURAS\"").unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(
            cfg.drive.unwrap().notes_path.as_deref(),
            Some("/COLEGIO/ASIGNATURAS")
        );
    }
}
