//! Interactive `skyview configure` prompts.

use std::path::Path;

use anyhow::Context;
use inquire::{
    Confirm, CustomType, CustomUserError, Password, PasswordDisplayMode, Select,
    validator::Validation,
};
use skyview_core::{Config, DayBoundary};

pub fn run(mut config: Config, path: &Path) -> anyhow::Result<()> {
    let mut key_prompt = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked);
    if config.api_key.is_some() {
        key_prompt = key_prompt.with_help_message("leave empty to keep the current key");
    }
    let key = key_prompt.prompt().context("Failed to read API key")?;
    if !key.trim().is_empty() {
        config.set_api_key(key.trim().to_string());
    }

    config.location.enabled = Confirm::new("Allow lookups at your position?")
        .with_default(config.location.enabled)
        .prompt()
        .context("Failed to read location preference")?;

    if config.location.enabled {
        let latitude = prompt_degrees("Latitude:", config.location.latitude, 90.0)?;
        let longitude = prompt_degrees("Longitude:", config.location.longitude, 180.0)?;
        config.set_position(latitude, longitude);
    }

    let current = DayBoundary::all()
        .iter()
        .position(|b| *b == config.day_boundary)
        .unwrap_or(0);
    config.day_boundary = Select::new("Split forecast days by:", DayBoundary::all().to_vec())
        .with_starting_cursor(current)
        .with_help_message("local: this machine's time zone; utc: UTC")
        .prompt()
        .context("Failed to read day boundary")?;

    config.save_to(path)?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

fn prompt_degrees(message: &str, current: Option<f64>, limit: f64) -> anyhow::Result<f64> {
    let mut prompt = CustomType::<f64>::new(message)
        .with_error_message("Please enter a number in decimal degrees")
        .with_validator(move |value: &f64| -> Result<Validation, CustomUserError> {
            if value.abs() <= limit {
                Ok(Validation::Valid)
            } else {
                Ok(Validation::Invalid(
                    format!("Must be between -{limit} and {limit}").into(),
                ))
            }
        });
    if let Some(value) = current {
        prompt = prompt.with_default(value);
    }
    prompt
        .prompt()
        .with_context(|| format!("Failed to read {}", message.trim_end_matches(':')))
}
