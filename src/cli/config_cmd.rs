//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{BridgeConfig, InputConfig, MAX_WAKE_LOCK_MINUTES};
use crate::domain::error::ConfigError;

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

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let mut config = store.load().await?;
    apply_config_value(&mut config, key, value)?;
    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let config = store.load().await?;
    presenter.output(config_value(&config, key).as_deref().unwrap_or(NOT_SET));
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, config_value(&config, key).as_deref().unwrap_or(NOT_SET));
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

/// Read a key from the config file contents
fn config_value(config: &BridgeConfig, key: &str) -> Option<String> {
    let input = config.input.as_ref();
    match key {
        "output_dir" => config.output_dir.clone(),
        "event_name" => config.event_name.clone(),
        "background" => config.background.map(|b| b.to_string()),
        "wake_lock_minutes" => config.wake_lock_minutes.map(|m| m.to_string()),
        "notify" => config.notify.map(|b| b.to_string()),
        "input.format" => input.and_then(|i| i.format.clone()),
        "input.device" => input.and_then(|i| i.device.clone()),
        _ => None,
    }
}

/// Validate `value` for `key` and store it in `config`
fn apply_config_value(config: &mut BridgeConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: &str| ConfigError::ValidationError {
        key: key.to_string(),
        message: message.to_string(),
    };

    match key {
        "output_dir" => {
            if value.trim().is_empty() {
                return Err(invalid("Value must not be empty"));
            }
            config.output_dir = Some(value.to_string());
        }
        "event_name" => {
            if value.trim().is_empty() {
                return Err(invalid("Value must not be empty"));
            }
            config.event_name = Some(value.to_string());
        }
        "background" => {
            config.background =
                Some(parse_bool(value).map_err(|_| invalid("Value must be 'true' or 'false'"))?);
        }
        "notify" => {
            config.notify =
                Some(parse_bool(value).map_err(|_| invalid("Value must be 'true' or 'false'"))?);
        }
        "wake_lock_minutes" => {
            let minutes: u64 = value
                .parse()
                .map_err(|_| invalid("Value must be a whole number of minutes"))?;
            if minutes == 0 {
                return Err(invalid("Value must be at least 1"));
            }
            if minutes > MAX_WAKE_LOCK_MINUTES {
                return Err(invalid(&format!(
                    "Value must be at most {}",
                    MAX_WAKE_LOCK_MINUTES
                )));
            }
            config.wake_lock_minutes = Some(minutes);
        }
        "input.format" => {
            config.input.get_or_insert_with(InputConfig::default).format = Some(value.to_string());
        }
        "input.device" => {
            config.input.get_or_insert_with(InputConfig::default).device = Some(value.to_string());
        }
        _ => return Err(invalid("Unknown key")),
    }
    Ok(())
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}
