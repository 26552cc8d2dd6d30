//! Menu-driven browsing: search, use the device position, pick a day or an hour.

use std::fmt;

use anyhow::Context;
use inquire::{InquireError, Select, Text};
use skyview_core::{DayKey, Display, WeatherApp};

use crate::{cli, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Search,
    MyLocation,
    PickDay,
    PickHour,
    Quit,
}

impl Action {
    const ALL: [Action; 5] = [
        Action::Search,
        Action::MyLocation,
        Action::PickDay,
        Action::PickHour,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Search => "Search for a place",
            Action::MyLocation => "Use my location",
            Action::PickDay => "Pick a day",
            Action::PickHour => "Pick an hour",
            Action::Quit => "Quit",
        })
    }
}

/// One selectable entry, shown by its label.
struct Choice<T> {
    value: T,
    label: String,
}

impl<T> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

pub async fn run(app: &WeatherApp, place: Option<&str>) -> anyhow::Result<()> {
    cli::lookup(app, place).await?;

    loop {
        let screen = app.with_state(|s| render::render(&s.display(), app.day_offset()));
        println!("\n{screen}");

        let action = match Select::new("What next?", Action::ALL.to_vec()).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read menu choice"),
        };

        match action {
            Action::Search => {
                let text = match Text::new("Place:").prompt() {
                    Ok(text) => text,
                    Err(InquireError::OperationCanceled) => continue,
                    Err(err) => return Err(err).context("Failed to read place"),
                };
                if text.trim().is_empty() {
                    println!("Please enter a place name.");
                } else {
                    app.search(&text).await;
                }
            }
            Action::MyLocation => {
                app.load_device_location().await;
            }
            Action::PickDay => pick_day(app)?,
            Action::PickHour => pick_hour(app)?,
            Action::Quit => break,
        }
    }

    Ok(())
}

fn pick_day(app: &WeatherApp) -> anyhow::Result<()> {
    let offset = app.day_offset();
    let choices: Vec<Choice<DayKey>> = app.with_state(|s| {
        s.buckets()
            .map(|b| {
                b.buckets()
                    .iter()
                    .filter_map(|bucket| {
                        bucket.samples.first().map(|sample| Choice {
                            value: bucket.day,
                            label: render::day_label(sample, offset),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    });

    if choices.is_empty() {
        println!("No forecast loaded.");
        return Ok(());
    }

    if let Some(choice) = prompt_choice("Day:", choices)? {
        app.select_day(choice)?;
    }
    Ok(())
}

fn pick_hour(app: &WeatherApp) -> anyhow::Result<()> {
    let offset = app.day_offset();
    let choices: Vec<Choice<usize>> = app.with_state(|s| match s.display() {
        Display::Data(view) => view
            .hourly()
            .iter()
            .enumerate()
            .map(|(index, sample)| Choice {
                value: index,
                label: render::hour_label(sample, offset),
            })
            .collect(),
        _ => Vec::new(),
    });

    if choices.is_empty() {
        println!("No day selected.");
        return Ok(());
    }

    if let Some(index) = prompt_choice("Hour:", choices)? {
        app.select_hour(index)?;
    }
    Ok(())
}

/// `None` when the user backs out with Esc.
fn prompt_choice<T>(message: &str, choices: Vec<Choice<T>>) -> anyhow::Result<Option<T>> {
    match Select::new(message, choices).prompt() {
        Ok(choice) => Ok(Some(choice.value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(err) => Err(err).context("Failed to read choice"),
    }
}
