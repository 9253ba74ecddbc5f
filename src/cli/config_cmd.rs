//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, CaptureConfig, UserConfig};
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;
use crate::domain::session::mask_secret;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let mut config = store.load().await?;
    write_key(&mut config, key, value)?;
    store.save(&config).await?;

    let shown = if key == "user.token" {
        mask_secret(value)
    } else {
        value.to_string()
    };
    presenter.success(&format!("{} = {}", key, shown));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    let value = read_key(&config, key);
    presenter.output(value.as_deref().unwrap_or(NOT_SET));
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        let value = read_key(&config, key);
        presenter.key_value(key, value.as_deref().unwrap_or(NOT_SET));
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

/// Display value of a key; the token is masked
fn read_key(config: &AppConfig, key: &str) -> Option<String> {
    let capture = config.capture.as_ref();
    let user = config.user.as_ref();
    match key {
        "backend_url" => config.backend_url.clone(),
        "max_duration" => config.max_duration.clone(),
        "poll_max_attempts" => config.poll_max_attempts.map(|n| n.to_string()),
        "poll_interval" => config.poll_interval.clone(),
        "upload_retries" => config.upload_retries.map(|n| n.to_string()),
        "upload_backoff" => config.upload_backoff.clone(),
        "allow_skip" => config.allow_skip.map(|b| b.to_string()),
        "notify" => config.notify.map(|b| b.to_string()),
        "capture.video_device" => capture.and_then(|c| c.video_device.clone()),
        "capture.audio_source" => capture.and_then(|c| c.audio_source.clone()),
        "user.id" => user.and_then(|u| u.id.clone()),
        "user.name" => user.and_then(|u| u.name.clone()),
        "user.email" => user.and_then(|u| u.email.clone()),
        "user.role" => user.and_then(|u| u.role.clone()),
        "user.linkedin" => user.and_then(|u| u.linkedin.clone()),
        "user.token" => user.and_then(|u| u.token.as_deref().map(mask_secret)),
        _ => None,
    }
}

/// Validate and store a value
fn write_key(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    match key {
        "backend_url" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(invalid("URL must start with http:// or https://".to_string()));
            }
            config.backend_url = Some(value.to_string());
        }
        "max_duration" | "poll_interval" | "upload_backoff" => {
            let duration = value
                .parse::<Duration>()
                .map_err(|e| invalid(e.to_string()))?;
            if duration.as_millis() == 0 {
                return Err(invalid("Duration must be greater than zero".to_string()));
            }
            let slot = match key {
                "max_duration" => &mut config.max_duration,
                "poll_interval" => &mut config.poll_interval,
                _ => &mut config.upload_backoff,
            };
            *slot = Some(value.to_string());
        }
        "poll_max_attempts" | "upload_retries" => {
            let count = parse_count(value).map_err(invalid)?;
            if key == "poll_max_attempts" {
                config.poll_max_attempts = Some(count);
            } else {
                config.upload_retries = Some(count);
            }
        }
        "allow_skip" | "notify" => {
            let flag = parse_bool(value)
                .map_err(|_| invalid("Value must be 'true' or 'false'".to_string()))?;
            if key == "allow_skip" {
                config.allow_skip = Some(flag);
            } else {
                config.notify = Some(flag);
            }
        }
        "capture.video_device" | "capture.audio_source" => {
            let capture = config.capture.get_or_insert_with(CaptureConfig::default);
            if key == "capture.video_device" {
                capture.video_device = Some(value.to_string());
            } else {
                capture.audio_source = Some(value.to_string());
            }
        }
        _ => {
            let user = config.user.get_or_insert_with(UserConfig::default);
            let slot = match key {
                "user.id" => &mut user.id,
                "user.name" => &mut user.name,
                "user.email" => &mut user.email,
                "user.role" => &mut user.role,
                "user.linkedin" => &mut user.linkedin,
                "user.token" => &mut user.token,
                _ => return Err(invalid("Unknown key".to_string())),
            };
            *slot = Some(value.to_string());
        }
    }
    Ok(())
}

fn parse_count(value: &str) -> Result<u32, String> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err("Value must be a positive integer".to_string()),
    }
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}
