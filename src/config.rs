use std::env;
use std::str::FromStr;
use std::time::Duration;

use log::{debug, error, info};

use crate::error::{BotError, Result};

const DEFAULT_LLM_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_TEXT_MODEL: &str = "llama-3.1-70b-versatile";
const DEFAULT_VISION_MODEL: &str = "llama-3.2-11b-vision-preview";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_HISTORY_WINDOW: usize = 10;
const DEFAULT_AMBIENT_CHANCE: u32 = 10;
const DEFAULT_S3_REGION: &str = "us-east-1";
const DEFAULT_S3_PREFIX: &str = "darazbot/";

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
あなたは「だらずさん」です。
賢い猫。少しだらしない。趣味はさんぽとねんね。
全て鳥取弁で語尾が「にゃん」。";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub llm: LlmConfig,
    pub conversation: ConversationConfig,
    pub s3: Option<S3Config>,
}

/// Model backend settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub api_url: String,
    pub text_model: String,
    pub vision_model: String,
    pub timeout: Duration,
}

/// Conversation behaviour settings.
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    pub system_prompt: String,
    /// Number of most recent stored messages sent with each text request.
    pub history_window: usize,
    /// Unaddressed messages get a reply with probability `1 / ambient_chance`.
    /// Zero disables ambient replies.
    pub ambient_chance: u32,
    /// Cap on persisted history; `None` keeps everything.
    pub store_limit: Option<usize>,
    /// Record unaddressed messages into history even when not replying.
    pub listen_ambient: bool,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            history_window: DEFAULT_HISTORY_WINDOW,
            ambient_chance: DEFAULT_AMBIENT_CHANCE,
            store_limit: None,
            listen_ambient: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub prefix: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        let discord_token = required("DISCORD_TOKEN")?;

        let llm = LlmConfig {
            api_key: required("LLM_API_KEY")?,
            api_url: optional("LLM_API_URL").unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
            text_model: optional("LLM_TEXT_MODEL")
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            vision_model: optional("LLM_VISION_MODEL")
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            timeout: Duration::from_secs(
                parsed("LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        };

        let conversation = ConversationConfig {
            system_prompt: optional("SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            history_window: parsed("HISTORY_WINDOW")?.unwrap_or(DEFAULT_HISTORY_WINDOW),
            ambient_chance: parsed("AMBIENT_CHANCE")?.unwrap_or(DEFAULT_AMBIENT_CHANCE),
            store_limit: parsed("HISTORY_STORE_LIMIT")?,
            listen_ambient: parsed("LISTEN_AMBIENT")?.unwrap_or(false),
        };

        let s3 = optional("S3_BUCKET").map(|bucket| S3Config {
            bucket,
            region: optional("S3_REGION").unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
            endpoint: optional("S3_ENDPOINT"),
            prefix: optional("S3_PREFIX").unwrap_or_else(|| DEFAULT_S3_PREFIX.to_string()),
        });

        info!("Configuration loaded successfully");
        debug!("Discord token length: {} characters", discord_token.len());
        debug!("LLM API key length: {} characters", llm.api_key.len());
        debug!("LLM endpoint: {}", llm.api_url);
        debug!(
            "Models: text={}, vision={}",
            llm.text_model, llm.vision_model
        );
        debug!(
            "History window: {}, ambient chance: 1/{}",
            conversation.history_window, conversation.ambient_chance
        );
        debug!(
            "System prompt length: {} characters",
            conversation.system_prompt.len()
        );

        Ok(Self {
            discord_token,
            llm,
            conversation,
            s3,
        })
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|e| {
        error!("Failed to load {name} from environment: {e}");
        BotError::from(e)
    })
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parsed<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional(name)
        .map(|raw| parse_value(name, &raw))
        .transpose()
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| {
        error!("Invalid value for {name}: {e}");
        BotError::Config(format!("{name}={raw}: {e}"))
    })
}
