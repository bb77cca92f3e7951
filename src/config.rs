//! Run configuration. Two optional sources layer on top of CLI flags: a
//! TOML settings file (search order: ./novelpull.toml, then
//! $XDG_CONFIG_HOME/novelpull/config.toml) for ambient defaults, and a JSON
//! batch file (--config) carrying the fiction URLs plus per-run options.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Immutable options for one run, shared by the orchestrator and governor.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root under which `Fictions/` is created. Default: CWD.
    pub output_dir: PathBuf,
    /// Resume mode: fetch only chapters absent from the order log, append to
    /// it. Create mode replaces the log wholesale.
    pub update_mode: bool,
    pub verbose: bool,
    /// Swallow recoverable failures instead of aborting the batch.
    pub ignore_errors: bool,
    /// Inter-chapter delay in seconds (>= 0).
    pub delay_secs: f64,
    /// Run-wide cap on chapters fetched. None means unlimited.
    pub chapter_limit: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            update_mode: false,
            verbose: false,
            ignore_errors: false,
            delay_secs: 0.0,
            chapter_limit: None,
        }
    }
}

/// TOML settings file contents. All fields optional; only present keys
/// override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Settings {
    /// Default output directory when -o is not set.
    pub output_dir: Option<PathBuf>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Delay in seconds between chapter fetches.
    pub delay_secs: Option<f64>,
    /// Run-wide chapter cap.
    pub chapter_limit: Option<u64>,
}

/// Search order: (1) ./novelpull.toml, (2) $XDG_CONFIG_HOME/novelpull/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present
/// file returns Err.
pub fn load_settings() -> Result<Option<Settings>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("novelpull.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("novelpull").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            let s = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
            let settings: Settings = toml::from_str(&s)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
            return Ok(Some(settings));
        }
    }
    Ok(None)
}

/// JSON batch file: the ordered fiction URLs plus run options. Present keys
/// override the corresponding CLI flags.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BatchConfig {
    pub urls: Vec<String>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub update_mode: Option<bool>,
    #[serde(default)]
    pub verbose: Option<bool>,
    #[serde(default)]
    pub ignore_errors: Option<bool>,
    #[serde(default)]
    pub delay_secs: Option<f64>,
    #[serde(default)]
    pub chapter_limit: Option<u64>,
}

/// Load and parse the batch file at `path`.
pub fn load_batch(path: &Path) -> Result<BatchConfig, String> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read batch config {}: {}", path.display(), e))?;
    serde_json::from_str(&s)
        .map_err(|e| format!("Invalid batch config {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_settings() {
        let s: Settings = toml::from_str("").unwrap();
        assert!(s.output_dir.is_none());
        assert!(s.user_agent.is_none());
        assert!(s.timeout_secs.is_none());
        assert!(s.delay_secs.is_none());
        assert!(s.chapter_limit.is_none());
    }

    #[test]
    fn parse_full_settings() {
        let s = r#"
            output_dir = "out"
            user_agent = "Custom/1.0"
            timeout_secs = 60
            delay_secs = 1.5
            chapter_limit = 100
        "#;
        let s: Settings = toml::from_str(s).unwrap();
        assert_eq!(s.output_dir.as_deref(), Some(Path::new("out")));
        assert_eq!(s.user_agent.as_deref(), Some("Custom/1.0"));
        assert_eq!(s.timeout_secs, Some(60));
        assert_eq!(s.delay_secs, Some(1.5));
        assert_eq!(s.chapter_limit, Some(100));
    }

    #[test]
    fn invalid_settings_toml_errors() {
        assert!(toml::from_str::<Settings>("output_dir = [").is_err());
    }

    #[test]
    fn parse_batch_config_full() {
        let json = r#"{
            "urls": ["https://www.royalroad.com/fiction/1/a", "https://www.wattpad.com/story/2-b"],
            "output_dir": "novels",
            "update_mode": true,
            "verbose": false,
            "ignore_errors": true,
            "delay_secs": 2.0,
            "chapter_limit": 50
        }"#;
        let batch: BatchConfig = serde_json::from_str(json).unwrap();
        assert_eq!(batch.urls.len(), 2);
        assert_eq!(batch.output_dir.as_deref(), Some(Path::new("novels")));
        assert_eq!(batch.update_mode, Some(true));
        assert_eq!(batch.verbose, Some(false));
        assert_eq!(batch.ignore_errors, Some(true));
        assert_eq!(batch.delay_secs, Some(2.0));
        assert_eq!(batch.chapter_limit, Some(50));
    }

    #[test]
    fn parse_batch_config_urls_only() {
        let json = r#"{"urls": ["https://www.royalroad.com/fiction/1/a"]}"#;
        let batch: BatchConfig = serde_json::from_str(json).unwrap();
        assert_eq!(batch.urls.len(), 1);
        assert!(batch.output_dir.is_none());
        assert!(batch.update_mode.is_none());
    }

    #[test]
    fn batch_config_requires_urls() {
        let json = r#"{"update_mode": true}"#;
        assert!(serde_json::from_str::<BatchConfig>(json).is_err());
    }

    #[test]
    fn load_batch_missing_file_errors() {
        let result = load_batch(Path::new("/nonexistent_novelpull_batch.json"));
        assert!(result.is_err());
    }

    #[test]
    fn load_batch_round_trip_via_file() {
        let path = std::env::temp_dir().join("novelpull_batch_test.json");
        std::fs::write(&path, r#"{"urls": ["https://www.wattpad.com/story/1-x"]}"#).unwrap();
        let batch = load_batch(&path).unwrap();
        assert_eq!(batch.urls, vec!["https://www.wattpad.com/story/1-x"]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn run_config_defaults() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.output_dir, PathBuf::from("."));
        assert!(!cfg.update_mode);
        assert!(!cfg.verbose);
        assert!(!cfg.ignore_errors);
        assert_eq!(cfg.delay_secs, 0.0);
        assert!(cfg.chapter_limit.is_none());
    }
}
