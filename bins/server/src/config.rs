use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use tracker_api_server::{ApiSettings, JokeSettings, LoginSettings, RecommendSettings};

use crate::error::ServerError;

#[derive(Parser)]
#[command(name = "tracker-server", about = "In-memory event tracker HTTP service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Запустить сервер
    Serve(ServeArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    /// Путь к TOML конфиг файлу. Без него — значения по умолчанию
    #[arg(long, env = "CONFIG_PATH")]
    pub config: Option<String>,

    /// Порт API, перекрывает `api_port` из конфига
    #[arg(long, env = "TRACKER_PORT")]
    pub port: Option<u16>,
}

// ---- TOML Config ----

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_api_host")]
    pub api_host: String,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Лимит записей в event log. Нет значения — без лимита.
    #[serde(default)]
    pub max_events: Option<usize>,
    #[serde(default)]
    pub joke: JokeSettings,
    #[serde(default)]
    pub login: LoginSettings,
    #[serde(default)]
    pub recommend: RecommendSettings,
}

fn default_api_host() -> String {
    "0.0.0.0".into()
}
fn default_api_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: default_api_host(),
            api_port: default_api_port(),
            max_events: None,
            joke: JokeSettings::default(),
            login: LoginSettings::default(),
            recommend: RecommendSettings::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> Result<Self, ServerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config { context: "read", detail: format!("'{path}': {e}") })?;
        Self::parse(&content)
            .map_err(|detail| ServerError::Config { context: "parse", detail: format!("'{path}': {detail}") })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Конфиг из `--config` (если задан) с учётом `--port`.
    pub fn resolve(args: &ServeArgs) -> Result<Self, ServerError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(port) = args.port {
            config.api_port = port;
        }
        Ok(config)
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            joke: self.joke.clone(),
            login: self.login.clone(),
            recommend: self.recommend.clone(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}
