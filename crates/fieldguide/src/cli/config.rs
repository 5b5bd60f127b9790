//! The `fieldguide config` command for configuration management.

use std::path::Path;

use clap::{Args, Subcommand};
use fieldguide_core::Config;

/// Keys without a default value, so absent from the serialized defaults.
const OPTIONAL_KEYS: &[&str] = &["camera.still_source", "capture.output_dir"];

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Set one value, keeping the rest of the file (and its comments) intact
    Set {
        /// Dotted key, e.g. `camera.max_zoom`
        key: String,

        /// New value; parsed as TOML, otherwise taken as a string
        value: String,
    },
}

/// Execute the config command. `path` overrides the default config location.
pub fn execute(args: ConfigArgs, path: Option<&Path>) -> anyhow::Result<()> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(Config::default_path);

    match args.command {
        ConfigCommand::Show => {
            let config = if path.exists() {
                Config::load_from(&path)?
            } else {
                Config::default()
            };
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            write_config(&path, &Config::default().to_toml()?)?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }

        ConfigCommand::Set { key, value } => {
            let content = if path.exists() {
                std::fs::read_to_string(&path)?
            } else {
                String::new()
            };
            let updated = apply_setting(&content, &key, &value)?;
            write_config(&path, &updated)?;
            tracing::info!("Set {} in {}", key, path.display());
            println!("{key} = {}", value.trim());
        }
    }

    Ok(())
}

/// Set `key` to `value` in the TOML `content` and return the new document.
///
/// The key must name a known setting and the result must still be a valid
/// configuration.
pub fn apply_setting(content: &str, key: &str, value: &str) -> anyhow::Result<String> {
    let Some((section, field)) = key.split_once('.') else {
        anyhow::bail!("Expected a key of the form <section>.<key>, got '{key}'");
    };

    let defaults: toml_edit::DocumentMut = Config::default().to_toml()?.parse()?;
    let default_item = defaults.get(section).and_then(|table| table.get(field));
    let string_typed = match default_item {
        Some(item) => item.is_str(),
        None if OPTIONAL_KEYS.contains(&key) => true,
        None => anyhow::bail!("Unknown setting '{key}'"),
    };

    let value = value.trim();
    let new_value = match value.parse::<toml_edit::Value>() {
        Ok(parsed) if !string_typed || parsed.is_str() => parsed,
        _ => toml_edit::Value::from(value),
    };

    let mut doc: toml_edit::DocumentMut = content.parse()?;
    if !doc.contains_key(section) {
        doc[section] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc[section][field] = toml_edit::Item::Value(new_value);

    let updated = doc.to_string();
    Config::from_toml(&updated)?;
    Ok(updated)
}

fn write_config(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_set_number_into_empty_file() {
        let updated = apply_setting("", "camera.max_zoom", "4").unwrap();
        let config = Config::from_toml(&updated).unwrap();
        assert_eq!(config.camera.max_zoom, 4.0);
    }

    #[test]
    fn test_set_keeps_comments() {
        let content = "# my settings\n[capture]\n# keep this\ntimestamped = false\n";
        let updated = apply_setting(content, "capture.timestamped", "true").unwrap();
        assert!(updated.contains("# my settings"));
        assert!(updated.contains("# keep this"));
        assert!(Config::from_toml(&updated).unwrap().capture.timestamped);
    }

    #[test]
    fn test_bare_word_becomes_string() {
        let updated = apply_setting("", "model.name", "birds-v2").unwrap();
        assert_eq!(Config::from_toml(&updated).unwrap().model.name, "birds-v2");
    }

    #[test]
    fn test_numeric_looking_string_stays_string() {
        let updated = apply_setting("", "model.name", "2024").unwrap();
        assert_eq!(Config::from_toml(&updated).unwrap().model.name, "2024");
    }

    #[test]
    fn test_optional_path_key() {
        let updated = apply_setting("", "camera.still_source", "~/Pictures/owl.jpg").unwrap();
        let config = Config::from_toml(&updated).unwrap();
        assert_eq!(
            config.camera.still_source,
            Some(PathBuf::from("~/Pictures/owl.jpg"))
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(apply_setting("", "camera.flash", "true").is_err());
        assert!(apply_setting("", "zoom", "2").is_err());
    }

    #[test]
    fn test_invalid_value_rejected() {
        let err = apply_setting("", "camera.min_zoom", "0.5").unwrap_err();
        assert!(err.to_string().contains("min_zoom"));
    }
}
