use crate::llm::LlmSettings;
use clap::{Args, Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `MUSIC_CHAT_SERVER__PORT=8000`.
pub const ENV_PREFIX: &str = "MUSIC_CHAT";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the chat server
    Serve(ServeArgs),
    /// Chat with a running server from the terminal
    Chat(ChatArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,
}

#[derive(Args, Debug, Clone)]
pub struct ChatArgs {
    /// Base URL of the chat server
    #[arg(long, env = "MUSIC_CHAT_SERVER_URL", default_value = "http://127.0.0.1:5000")]
    pub server: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub catalog: CatalogConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Directory holding `index.html` and the widget assets.
    pub static_dir: PathBuf,
}

#[derive(Deserialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// CSV music database.
    pub db_path: PathBuf,
    /// Where the built vector index is cached.
    pub index_path: PathBuf,
    /// Songs retrieved per question.
    pub top_k: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    pub model: String,
}

impl AppConfig {
    /// Load with defaults, then the config file, then environment, then CLI
    /// flags, later sources winning.
    pub fn load(args: &ServeArgs) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.static_dir", "static")?
            .set_default("llm.base_url", "https://generativelanguage.googleapis.com")?
            .set_default("llm.model", "gemini-1.5-flash")?
            .set_default("catalog.db_path", "music_db.csv")?
            .set_default("catalog.index_path", "faiss_index.json")?
            .set_default("catalog.top_k", 3)?
            .set_default("embedding.model", "multilingual-e5-small")?;

        // Explicit file must exist; ./config.yaml is picked up when present.
        match &args.config {
            Some(path) => builder = builder.add_source(File::from(path.as_path()).required(true)),
            None if Path::new("config.yaml").exists() => {
                builder = builder.add_source(File::with_name("config.yaml").required(false));
            }
            None => {}
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Unprefixed LLM variables, as most provider docs spell them.
        for (var, key) in [
            ("LLM_BASE_URL", "llm.base_url"),
            ("LLM_API_KEY", "llm.api_key"),
            ("LLM_MODEL", "llm.model"),
        ] {
            if let Ok(val) = env::var(var) {
                if !val.trim().is_empty() {
                    builder = builder.set_override(key, val)?;
                }
            }
        }

        if let Some(port) = args.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        if cfg.catalog.top_k == 0 {
            return Err(config::ConfigError::Message(
                "catalog.top_k must be at least 1".to_string(),
            ));
        }
        Ok(cfg)
    }

    /// Parse `serve` flags from an argument list and load.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        #[derive(Parser)]
        struct ServeCli {
            #[command(flatten)]
            serve: ServeArgs,
        }

        let cli = ServeCli::try_parse_from(args)
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::load(&cli.serve)
    }

    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings::new(
            self.llm.base_url.clone(),
            self.llm.api_key.clone(),
            self.llm.model.clone(),
        )
    }
}
