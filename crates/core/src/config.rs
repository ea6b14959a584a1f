use crate::channels::Channel;
use crate::error::{PipelineError, PipelineResult};
use serde::Deserialize;

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `ADSPEND__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_business_file")]
    pub business_file: String,
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// One per-channel marketing export.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub channel: Channel,
    pub file: String,
}

/// Extra column renames appended to the built-in rename table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub marketing_aliases: Vec<ColumnAlias>,
    #[serde(default)]
    pub business_aliases: Vec<ColumnAlias>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnAlias {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default = "default_log_json")]
    pub json: bool,
}

// Default functions
fn default_data_dir() -> String {
    ".".to_string()
}
fn default_output_dir() -> String {
    ".".to_string()
}
fn default_business_file() -> String {
    "business.csv".to_string()
}
fn default_sources() -> Vec<SourceConfig> {
    Channel::ALL
        .iter()
        .map(|channel| SourceConfig {
            channel: *channel,
            file: format!("{}.csv", channel.as_str()),
        })
        .collect()
}
fn default_log_filter() -> String {
    "adspend=info,adspend_reporting=info,adspend_storage=info".to_string()
}
fn default_log_json() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: default_log_json(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            business_file: default_business_file(),
            sources: default_sources(),
            schema: SchemaConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a config file and environment variables.
    /// Environment variables take precedence over the file.
    ///
    /// Without `path`, `adspend.toml` in the working directory is used if
    /// present. An explicit `path` must exist.
    pub fn load(path: Option<&str>) -> PipelineResult<Self> {
        let file = config::File::with_name(path.unwrap_or("adspend")).required(path.is_some());
        config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("ADSPEND")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|built| built.try_deserialize())
            .map_err(|e| PipelineError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sources_cover_every_channel() {
        let config = AppConfig::default();
        let channels: Vec<Channel> = config.sources.iter().map(|s| s.channel).collect();
        assert_eq!(channels, Channel::ALL.to_vec());
        assert_eq!(config.sources[2].file, "TikTok.csv");
        assert_eq!(config.business_file, "business.csv");
    }

    #[test]
    fn test_explicit_config_path_must_exist() {
        let err = AppConfig::load(Some("/nonexistent/adspend-missing.toml")).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
        assert!(err.to_string().contains("adspend-missing"));
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let raw = r#"
            output_dir = "out"

            [[sources]]
            channel = "Google"
            file = "google_export.csv"

            [[schema.marketing_aliases]]
            from = "imps"
            to = "impressions"
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.output_dir, "out");
        assert_eq!(config.data_dir, ".");
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].channel, Channel::Google);
        assert_eq!(config.schema.marketing_aliases[0].to, "impressions");
        assert!(config.log.json);
    }
}
