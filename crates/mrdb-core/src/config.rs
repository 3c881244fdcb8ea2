use crate::analyzed::AspectMethod;
use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from the variables already in the process,
/// without reading `.env`.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration through an injectable env-var lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_unit_f64 = |var: &str, default: &str, max: f64| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw.parse::<f64>().map_err(|e| invalid(var, e.to_string()))?;
        if !(0.0..=max).contains(&value) {
            return Err(invalid(var, format!("must be between 0 and {max}, got {value}")));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("MRDB_ENV", "development"));
    let log_level = or_default("MRDB_LOG_LEVEL", "info");

    let tei_url = require("MRDB_TEI_URL")?;
    let qdrant_url = require("MRDB_QDRANT_URL")?;
    let qdrant_collection = or_default("MRDB_QDRANT_COLLECTION", "market_data_main");
    let vector_dim = parse_usize("MRDB_VECTOR_DIM", "1024")?;
    if vector_dim == 0 {
        return Err(invalid("MRDB_VECTOR_DIM", "must be greater than 0".to_string()));
    }

    let llm_url = optional("MRDB_LLM_URL");
    let llm_model = or_default("MRDB_LLM_MODEL", "gemini-2.0-flash");
    let llm_api_key = optional("MRDB_LLM_API_KEY");
    let llm_temperature = parse_unit_f64("MRDB_LLM_TEMPERATURE", "0.1", 2.0)?;

    let retriever_k = parse_usize("MRDB_RETRIEVER_K", "10")?;
    if retriever_k == 0 {
        return Err(invalid("MRDB_RETRIEVER_K", "must be greater than 0".to_string()));
    }
    let relevance_threshold = parse_unit_f64("MRDB_RELEVANCE_THRESHOLD", "0.7", 1.0)?;

    let aspect_method = or_default("MRDB_ASPECT_METHOD", "rule_based")
        .parse::<AspectMethod>()
        .map_err(|e| invalid("MRDB_ASPECT_METHOD", e.to_string()))?;

    let keywords_path = PathBuf::from(or_default("MRDB_KEYWORDS_PATH", "./config/keywords.yaml"));
    let http_timeout_secs = parse_u64("MRDB_HTTP_TIMEOUT_SECS", "30")?;

    Ok(AppConfig {
        env,
        log_level,
        tei_url,
        qdrant_url,
        qdrant_collection,
        vector_dim,
        llm_url,
        llm_model,
        llm_api_key,
        llm_temperature,
        retriever_k,
        relevance_threshold,
        aspect_method,
        keywords_path,
        http_timeout_secs,
    })
}

/// Unrecognized values fall back to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
