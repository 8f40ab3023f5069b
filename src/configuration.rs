use std::{path::PathBuf, time::Duration};

use config::ConfigError;
use serde::Deserialize;
use serde_aux::field_attributes::{
    deserialize_bool_from_anything, deserialize_number_from_string,
};

use crate::domain::search_criteria::SearchCriteria;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub browser: BrowserSettings,
    pub search: SearchSettings,
    pub download: DownloadSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    #[serde(deserialize_with = "deserialize_bool_from_anything")]
    pub headless: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_width: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_height: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub poll_interval_millis: u64,
}

impl BrowserSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct SearchSettings {
    pub url: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub page_load_timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub results_timeout_secs: u64,
    pub diagnostics_dir: PathBuf,
}

impl SearchSettings {
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria::new(
            self.first_name.clone(),
            self.last_name.clone(),
            self.entity_type.clone(),
            self.position.clone(),
        )
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn results_timeout(&self) -> Duration {
        Duration::from_secs(self.results_timeout_secs)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct DownloadSettings {
    pub output_dir: PathBuf,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub popup_timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub request_timeout_secs: u64,
    /// Send the browser's cookies along with the PDF request. Off by default,
    /// which keeps the download independent of the browser session.
    #[serde(default, deserialize_with = "deserialize_bool_from_anything")]
    pub replay_browser_cookies: bool,
}

impl DownloadSettings {
    pub fn popup_timeout(&self) -> Duration {
        Duration::from_secs(self.popup_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| ConfigError::Foreign(Box::new(e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename)).required(false),
        )
        // E.g. `APP_SEARCH__LAST_NAME=Doe` sets `Settings.search.last_name`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
