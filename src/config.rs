use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file structure for benchgate.
///
/// Holds the settings that differ between machines: how to reach the
/// benchmark pipeline and the GitHub API. The gating rules themselves are
/// not configurable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Reusable pipeline invocation
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// GitHub API access
    #[serde(default)]
    pub github: GitHubConfig,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineConfig {
    /// Command that runs one benchmark dispatch (first element is the executable)
    #[serde(default)]
    pub command: Vec<String>,

    /// Kill the pipeline after this many seconds (0 disables the limit)
    #[serde(default)]
    pub timeout_secs: u64,

    /// Directory the command runs in
    pub working_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// GitHub API base URL
    #[serde(default = "default_github_base_url")]
    pub base_url: String,

    /// Repository used when fetching pull request labels (format: owner/repo)
    pub repo: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: default_github_base_url(),
            repo: None,
        }
    }
}

fn default_github_base_url() -> String {
    "https://api.github.com".to_string()
}

const CANDIDATES: [&str; 4] = [
    "benchgate.toml",
    "benchgate.json",
    "benchgate.yaml",
    "benchgate.yml",
];

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./benchgate.toml, ./benchgate.json, ./benchgate.yaml, ./benchgate.yml
    /// 3. `<user config dir>/benchgate/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        for candidate in &CANDIDATES {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        if let Some(path) = user_config_path().filter(|p| p.exists()) {
            return Self::load_from_path(&path);
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("benchgate").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.github.base_url, "https://api.github.com");
        assert!(config.pipeline.command.is_empty());
        assert_eq!(config.pipeline.timeout_secs, 0);
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[pipeline]
command = ["./scripts/run-benchmarks.sh", "--quiet"]
timeout-secs = 3600
working-dir = "/srv/bench"

[github]
base-url = "https://ghe.example.com/api/v3"
repo = "PennyLaneAI/pennylane"

[output]
pretty = true
"#;
        write!(temp_file, "{toml_content}").unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.command.len(), 2);
        assert_eq!(config.pipeline.timeout_secs, 3600);
        assert_eq!(config.pipeline.working_dir, Some(PathBuf::from("/srv/bench")));
        assert_eq!(config.github.base_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.github.repo.as_deref(), Some("PennyLaneAI/pennylane"));
        assert!(config.output.pretty);
    }

    #[test]
    fn test_load_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let json_content = r#"{
  "pipeline": {
    "command": ["bench"]
  }
}"#;
        write!(temp_file, "{json_content}").unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.command, vec!["bench".to_string()]);
        assert_eq!(config.github.base_url, "https://api.github.com");
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        let yaml_content = "github:\n  repo: owner/repo\noutput:\n  pretty: true\n";
        write!(temp_file, "{yaml_content}").unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.github.repo.as_deref(), Some("owner/repo"));
        assert!(config.output.pretty);
        assert!(config.pipeline.command.is_empty());
    }

    #[test]
    fn test_unknown_extension_falls_back_across_formats() {
        let mut temp_file = NamedTempFile::with_suffix(".conf").unwrap();
        write!(temp_file, r#"{{"pipeline": {{"timeout-secs": 5}}}}"#).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.timeout_secs, 5);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/benchgate.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "[pipeline\ncommand = ").unwrap();

        let err = Config::load_from_path(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML config"));
    }
}
