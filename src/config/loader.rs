//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ArchiverConfig;
use crate::domain::errors::ArchiverError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ArchiverConfig
/// 4. Applies environment variable overrides (ARCHIVER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns `InvalidConfiguration` if the file cannot be read or parsed, a
/// referenced environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use article_archiver::config::loader::load_config;
///
/// let config = load_config("archiver.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ArchiverConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ArchiverError::InvalidConfiguration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ArchiverError::InvalidConfiguration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: ArchiverConfig = toml::from_str(&contents)?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ArchiverError::InvalidConfiguration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Loads configuration from `path` when given, otherwise from defaults
///
/// Environment overrides and validation apply in both cases.
pub fn load_config_or_default(path: Option<&str>) -> Result<ArchiverConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            let mut config = ArchiverConfig::default();
            apply_env_overrides(&mut config)?;
            config.validate().map_err(|e| {
                ArchiverError::InvalidConfiguration(format!(
                    "Configuration validation failed: {e}"
                ))
            })?;
            Ok(config)
        }
    }
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ArchiverError::Other(format!("invalid placeholder pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ArchiverError::InvalidConfiguration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Parses an override value, naming the variable on failure
fn parse_override<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        ArchiverError::InvalidConfiguration(format!("Invalid value '{value}' for {name}"))
    })
}

/// Applies environment variable overrides using the ARCHIVER_* prefix
///
/// Variables follow the pattern `ARCHIVER_<SECTION>_<KEY>`, for example
/// `ARCHIVER_EXPORT_PROFILE` or `ARCHIVER_FETCHER_CONCURRENCY`. Unlike file
/// values, a malformed override is an error rather than silently ignored.
fn apply_env_overrides(config: &mut ArchiverConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("ARCHIVER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Fetcher overrides
    if let Some(val) = var("ARCHIVER_FETCHER_TIMEOUT_SECONDS") {
        config.fetcher.timeout_seconds = parse_override("ARCHIVER_FETCHER_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = var("ARCHIVER_FETCHER_CONCURRENCY") {
        config.fetcher.concurrency = parse_override("ARCHIVER_FETCHER_CONCURRENCY", &val)?;
    }
    if let Some(val) = var("ARCHIVER_FETCHER_USER_AGENT") {
        config.fetcher.user_agent = val;
    }
    if let Some(val) = var("ARCHIVER_FETCHER_RETRY_MAX_RETRIES") {
        config.fetcher.retry.max_retries =
            parse_override("ARCHIVER_FETCHER_RETRY_MAX_RETRIES", &val)?;
    }

    // Packer overrides
    if let Some(val) = var("ARCHIVER_PACKER_EMBED_MODE") {
        config.packer.embed_mode = parse_override("ARCHIVER_PACKER_EMBED_MODE", &val)?;
    }
    if let Some(val) = var("ARCHIVER_PACKER_MAX_ASSET_BYTES") {
        config.packer.max_asset_bytes = parse_override("ARCHIVER_PACKER_MAX_ASSET_BYTES", &val)?;
    }
    if let Some(val) = var("ARCHIVER_PACKER_BASE_URL") {
        config.packer.base_url = Some(val);
    }

    // Export overrides
    if let Some(val) = var("ARCHIVER_EXPORT_PROFILE") {
        config.export.profile = parse_override("ARCHIVER_EXPORT_PROFILE", &val)?;
    }
    if let Some(val) = var("ARCHIVER_EXPORT_BATCH_SIZE") {
        config.export.batch_size = Some(parse_override("ARCHIVER_EXPORT_BATCH_SIZE", &val)?);
    }
    if let Some(val) = var("ARCHIVER_EXPORT_PACK_CONCURRENCY") {
        config.export.pack_concurrency =
            parse_override("ARCHIVER_EXPORT_PACK_CONCURRENCY", &val)?;
    }
    if let Some(val) = var("ARCHIVER_EXPORT_COMPRESSION") {
        config.export.compression = parse_override("ARCHIVER_EXPORT_COMPRESSION", &val)?;
    }
    if let Some(val) = var("ARCHIVER_EXPORT_UTC_OFFSET_MINUTES") {
        config.export.utc_offset_minutes =
            parse_override("ARCHIVER_EXPORT_UTC_OFFSET_MINUTES", &val)?;
    }
    if let Some(val) = var("ARCHIVER_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = val;
    }
    if let Some(val) = var("ARCHIVER_EXPORT_OVERWRITE") {
        config.export.overwrite = parse_override("ARCHIVER_EXPORT_OVERWRITE", &val)?;
    }

    // Logging overrides
    if let Some(val) = var("ARCHIVER_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("ARCHIVER_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("ARCHIVER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
