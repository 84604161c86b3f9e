//! Config command: manage persisted settings

use anyhow::Result;
use minc_core::settings::{SettingKey, Settings};

use crate::cli::ConfigCommands;
use crate::commands::Context;
use crate::output;

pub fn run(cmd: ConfigCommands, ctx: Context) -> Result<()> {
    let mut settings = ctx.into_settings();

    for line in apply(cmd, &mut settings)? {
        println!("{}", line);
    }
    Ok(())
}

/// Apply a config subcommand, returning the lines to print
fn apply(cmd: ConfigCommands, settings: &mut Settings) -> Result<Vec<String>> {
    match cmd {
        ConfigCommands::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            settings.set(key, &value)?;
            Ok(vec![format!("Set {} = {}", key, value)])
        }
        ConfigCommands::Get { key } => {
            let key: SettingKey = key.parse()?;
            Ok(match settings.get(key) {
                Some(value) => vec![format!("{}: {}", key, value)],
                None => {
                    output::info(&format!("{} is not set", key));
                    Vec::new()
                }
            })
        }
        ConfigCommands::Unset { key } => {
            let key: SettingKey = key.parse()?;
            if settings.unset(key.as_str())? {
                Ok(vec![format!("Unset {}", key)])
            } else {
                output::info(&format!("{} was not set", key));
                Ok(Vec::new())
            }
        }
        ConfigCommands::View => {
            let entries = settings.entries();
            if entries.is_empty() {
                output::info(&format!(
                    "No settings in {}, built-in defaults apply",
                    settings.path().display()
                ));
            }
            Ok(entries
                .into_iter()
                .map(|(key, value)| format!("{}: {}", key, value))
                .collect())
        }
    }
}
