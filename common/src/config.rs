use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "dwh.cfg";

const REDACTED: &str = "********";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(alias = "CLUSTER")]
    pub cluster: ClusterConfig,
    #[serde(alias = "IAM_ROLE")]
    pub iam_role: IamRoleConfig,
    #[serde(alias = "S3")]
    pub s3: S3Config,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClusterConfig {
    #[serde(alias = "HOST", deserialize_with = "unquoted")]
    pub host: String,
    #[serde(alias = "DB_NAME", deserialize_with = "unquoted")]
    pub db_name: String,
    #[serde(alias = "DB_USER", deserialize_with = "unquoted")]
    pub db_user: String,
    #[serde(alias = "DB_PASSWORD", deserialize_with = "unquoted")]
    pub db_password: String,
    #[serde(alias = "DB_PORT")]
    pub db_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IamRoleConfig {
    #[serde(alias = "ARN", deserialize_with = "unquoted")]
    pub arn: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct S3Config {
    #[serde(alias = "LOG_DATA", deserialize_with = "unquoted")]
    pub log_data: String,
    #[serde(alias = "LOG_JSONPATH", deserialize_with = "unquoted")]
    pub log_jsonpath: String,
    #[serde(alias = "SONG_DATA", deserialize_with = "unquoted")]
    pub song_data: String,
    #[serde(
        alias = "REGION",
        default = "default_s3_region",
        deserialize_with = "unquoted"
    )]
    pub region: String,
}

fn default_s3_region() -> String {
    "us-west-2".to_string()
}

/// Values in `dwh.cfg` are commonly written as `'s3://bucket/prefix'`.
/// Statement builders add their own quoting, so any surrounding pair is
/// dropped here.
fn unquoted<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(strip_quotes(&raw).to_string())
}

fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    for quote in ['\'', '"'] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

impl Settings {
    /// Loads `path` as an INI file, then applies `DWH_<SECTION>__<KEY>`
    /// environment overrides.
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::new(path, FileFormat::Ini))
            .add_source(
                Environment::with_prefix("DWH")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let config = builder.build()?;

        let settings: Settings = config.try_deserialize()?;

        debug!(
            parameters = ?settings.parameters(),
            "Loaded warehouse configuration"
        );

        Ok(settings)
    }

    /// Flat `section.key -> value` view of the loaded parameters, with the
    /// cluster password redacted.
    pub fn parameters(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("cluster.host".to_string(), self.cluster.host.clone());
        map.insert("cluster.db_name".to_string(), self.cluster.db_name.clone());
        map.insert("cluster.db_user".to_string(), self.cluster.db_user.clone());
        map.insert("cluster.db_password".to_string(), REDACTED.to_string());
        map.insert("cluster.db_port".to_string(), self.cluster.db_port.to_string());
        map.insert("iam_role.arn".to_string(), self.iam_role.arn.clone());
        map.insert("s3.log_data".to_string(), self.s3.log_data.clone());
        map.insert("s3.log_jsonpath".to_string(), self.s3.log_jsonpath.clone());
        map.insert("s3.song_data".to_string(), self.s3.song_data.clone());
        map.insert("s3.region".to_string(), self.s3.region.clone());
        map
    }
}
