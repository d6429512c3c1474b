//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or the path in `HEALTHGUARD_CONFIG` / `-f`), then applies the
//! `HEALTHGUARD_LOG_LEVEL` override. The inference credential is read from
//! `HF_API_KEY` and is never sourced from TOML.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::error::AppError;
use crate::logger;
use crate::triage::TurnTimeouts;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Console channel configuration.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    pub enabled: bool,
}

/// HTTP (axum) channel configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub enabled: bool,
    /// Socket address to bind the HTTP channel to.
    pub bind: String,
}

#[derive(Debug, Clone)]
pub struct CommsConfig {
    pub pty: PtyConfig,
    pub http: HttpConfig,
}

/// `[inference.huggingface]`
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    /// Full model endpoint URL.
    pub api_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Total attempts per prediction, first call included.
    pub retry_attempts: u32,
    /// Initial backoff delay between attempts.
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Which backend is active (`"huggingface"` or `"dummy"`).
    /// Maps to `default` in `[inference]`.
    pub provider: String,
    pub huggingface: HuggingFaceConfig,
}

/// `[medicine.openfda]`
#[derive(Debug, Clone)]
pub struct OpenFdaConfig {
    pub api_url: String,
    /// Result cap sent with every query.
    pub limit: u32,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct MedicineConfig {
    /// Which backend is active (`"openfda"` or `"dummy"`).
    pub provider: String,
    pub openfda: OpenFdaConfig,
}

/// Per-turn budgets for the two external calls, retries included.
#[derive(Debug, Clone)]
pub struct TurnConfig {
    pub inference_timeout_seconds: u64,
    pub lookup_timeout_seconds: u64,
}

impl TurnConfig {
    pub fn timeouts(&self) -> TurnTimeouts {
        TurnTimeouts {
            inference: Duration::from_secs(self.inference_timeout_seconds),
            lookup: Duration::from_secs(self.lookup_timeout_seconds),
        }
    }
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_name: String,
    pub log_level: String,
    /// Append logs here instead of stderr (already expanded, no `~`).
    pub log_file: Option<PathBuf>,
    pub comms: CommsConfig,
    pub inference: InferenceConfig,
    pub medicine: MedicineConfig,
    pub turn: TurnConfig,
    /// API key from `HF_API_KEY`, `None` disables live inference.
    pub inference_api_key: Option<String>,
}

impl Config {
    pub fn comms_pty_should_load(&self) -> bool {
        self.comms.pty.enabled
    }

    pub fn comms_http_should_load(&self) -> bool {
        self.comms.http.enabled
    }
}

/// Raw TOML shape, `serde` target before resolution.
#[derive(Deserialize)]
struct RawConfig {
    bot: RawBot,
    #[serde(default)]
    comms: RawComms,
    #[serde(default)]
    inference: RawInference,
    #[serde(default)]
    medicine: RawMedicine,
    #[serde(default)]
    turn: RawTurn,
}

#[derive(Deserialize)]
struct RawBot {
    bot_name: String,
    log_level: String,
    #[serde(default)]
    log_file: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawComms {
    #[serde(default)]
    pty: RawPty,
    #[serde(default)]
    http: RawHttp,
}

#[derive(Deserialize)]
struct RawPty {
    #[serde(default = "default_true")]
    enabled: bool,
}

impl Default for RawPty {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Deserialize)]
struct RawHttp {
    #[serde(default = "default_false")]
    enabled: bool,
    #[serde(default = "default_http_bind")]
    bind: String,
}

impl Default for RawHttp {
    fn default() -> Self {
        Self { enabled: false, bind: default_http_bind() }
    }
}

#[derive(Deserialize)]
struct RawInference {
    #[serde(rename = "default", default = "default_inference_provider")]
    provider: String,
    #[serde(default)]
    huggingface: RawHuggingFace,
}

impl Default for RawInference {
    fn default() -> Self {
        Self { provider: default_inference_provider(), huggingface: RawHuggingFace::default() }
    }
}

#[derive(Deserialize)]
struct RawHuggingFace {
    #[serde(default = "default_hf_api_url")]
    api_url: String,
    #[serde(default = "default_hf_timeout_seconds")]
    timeout_seconds: u64,
    #[serde(default = "default_hf_retry_attempts")]
    retry_attempts: u32,
    #[serde(default = "default_hf_retry_delay_ms")]
    retry_delay_ms: u64,
}

impl Default for RawHuggingFace {
    fn default() -> Self {
        Self {
            api_url: default_hf_api_url(),
            timeout_seconds: default_hf_timeout_seconds(),
            retry_attempts: default_hf_retry_attempts(),
            retry_delay_ms: default_hf_retry_delay_ms(),
        }
    }
}

#[derive(Deserialize)]
struct RawMedicine {
    #[serde(rename = "default", default = "default_medicine_provider")]
    provider: String,
    #[serde(default)]
    openfda: RawOpenFda,
}

impl Default for RawMedicine {
    fn default() -> Self {
        Self { provider: default_medicine_provider(), openfda: RawOpenFda::default() }
    }
}

#[derive(Deserialize)]
struct RawOpenFda {
    #[serde(default = "default_fda_api_url")]
    api_url: String,
    #[serde(default = "default_fda_limit")]
    limit: u32,
    #[serde(default = "default_fda_timeout_seconds")]
    timeout_seconds: u64,
    #[serde(default = "default_fda_retry_attempts")]
    retry_attempts: u32,
    #[serde(default = "default_fda_retry_delay_ms")]
    retry_delay_ms: u64,
}

impl Default for RawOpenFda {
    fn default() -> Self {
        Self {
            api_url: default_fda_api_url(),
            limit: default_fda_limit(),
            timeout_seconds: default_fda_timeout_seconds(),
            retry_attempts: default_fda_retry_attempts(),
            retry_delay_ms: default_fda_retry_delay_ms(),
        }
    }
}

#[derive(Deserialize)]
struct RawTurn {
    #[serde(default = "default_inference_budget")]
    inference_timeout_seconds: u64,
    #[serde(default = "default_lookup_budget")]
    lookup_timeout_seconds: u64,
}

impl Default for RawTurn {
    fn default() -> Self {
        Self {
            inference_timeout_seconds: default_inference_budget(),
            lookup_timeout_seconds: default_lookup_budget(),
        }
    }
}

fn default_inference_provider() -> String { "huggingface".to_string() }
fn default_hf_api_url() -> String { "https://api-inference.huggingface.co/models/bert-base-uncased".to_string() }
fn default_hf_timeout_seconds() -> u64 { 10 }
fn default_hf_retry_attempts() -> u32 { 3 }
fn default_hf_retry_delay_ms() -> u64 { 2000 }

fn default_medicine_provider() -> String { "openfda".to_string() }
fn default_fda_api_url() -> String { "https://api.fda.gov/drug/label.json".to_string() }
fn default_fda_limit() -> u32 { 5 }
fn default_fda_timeout_seconds() -> u64 { 8 }
fn default_fda_retry_attempts() -> u32 { 2 }
fn default_fda_retry_delay_ms() -> u64 { 1000 }

fn default_inference_budget() -> u64 { 30 }
fn default_lookup_budget() -> u64 { 20 }

fn default_http_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

/// Load config from `path` (or `HEALTHGUARD_CONFIG`, or the default
/// location), then apply env-var overrides.
pub fn load(path: Option<&str>) -> Result<Config, AppError> {
    let env_path = env::var("HEALTHGUARD_CONFIG").ok();
    let path = path.or(env_path.as_deref()).unwrap_or(DEFAULT_CONFIG_PATH);
    let log_level_override = env::var("HEALTHGUARD_LOG_LEVEL").ok();
    load_from(Path::new(path), log_level_override.as_deref(), env::var("HF_API_KEY").ok())
}

/// Internal loader, accepts an explicit path, overrides and credential.
/// Tests pass these directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    log_level_override: Option<&str>,
    inference_api_key: Option<String>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let b = parsed.bot;
    let log_level = log_level_override.unwrap_or(&b.log_level).to_string();
    logger::parse_level(&log_level).map_err(|e| AppError::Config(format!("bot.log_level: {e}")))?;

    if parsed.medicine.openfda.limit == 0 {
        return Err(AppError::Config("medicine.openfda.limit must be at least 1".into()));
    }
    if parsed.turn.inference_timeout_seconds == 0 || parsed.turn.lookup_timeout_seconds == 0 {
        return Err(AppError::Config("turn timeouts must be at least 1 second".into()));
    }

    Ok(Config {
        bot_name: b.bot_name,
        log_level,
        log_file: b.log_file.as_deref().map(expand_home),
        comms: CommsConfig {
            pty: PtyConfig { enabled: parsed.comms.pty.enabled },
            http: HttpConfig { enabled: parsed.comms.http.enabled, bind: parsed.comms.http.bind },
        },
        inference: InferenceConfig {
            provider: parsed.inference.provider,
            huggingface: HuggingFaceConfig {
                api_url: parsed.inference.huggingface.api_url,
                timeout_seconds: parsed.inference.huggingface.timeout_seconds,
                retry_attempts: parsed.inference.huggingface.retry_attempts,
                retry_delay_ms: parsed.inference.huggingface.retry_delay_ms,
            },
        },
        medicine: MedicineConfig {
            provider: parsed.medicine.provider,
            openfda: OpenFdaConfig {
                api_url: parsed.medicine.openfda.api_url,
                limit: parsed.medicine.openfda.limit,
                timeout_seconds: parsed.medicine.openfda.timeout_seconds,
                retry_attempts: parsed.medicine.openfda.retry_attempts,
                retry_delay_ms: parsed.medicine.openfda.retry_delay_ms,
            },
        },
        turn: TurnConfig {
            inference_timeout_seconds: parsed.turn.inference_timeout_seconds,
            lookup_timeout_seconds: parsed.turn.lookup_timeout_seconds,
        },
        inference_api_key: inference_api_key.filter(|k| !k.trim().is_empty()),
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some("") => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        Some(rest) if rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(&rest[1..]),
            None => PathBuf::from(path),
        },
        _ => PathBuf::from(path),
    }
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Offline `Config` for unit tests, dummy backends, no API key.
#[cfg(test)]
impl Config {
    pub fn test_default() -> Self {
        Self {
            bot_name: "test".into(),
            log_level: "info".into(),
            log_file: None,
            comms: CommsConfig {
                pty: PtyConfig { enabled: false },
                http: HttpConfig { enabled: false, bind: default_http_bind() },
            },
            inference: InferenceConfig {
                provider: "dummy".into(),
                huggingface: HuggingFaceConfig {
                    api_url: "http://localhost:0/models/test".into(),
                    timeout_seconds: 1,
                    retry_attempts: 1,
                    retry_delay_ms: 0,
                },
            },
            medicine: MedicineConfig {
                provider: "dummy".into(),
                openfda: OpenFdaConfig {
                    api_url: "http://localhost:0/drug/label.json".into(),
                    limit: 5,
                    timeout_seconds: 1,
                    retry_attempts: 1,
                    retry_delay_ms: 0,
                },
            },
            turn: TurnConfig { inference_timeout_seconds: 2, lookup_timeout_seconds: 2 },
            inference_api_key: None,
        }
    }
}
