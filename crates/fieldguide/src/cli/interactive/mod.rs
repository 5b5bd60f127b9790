//! Interactive mode for a bare `fieldguide` invocation on a TTY.
//!
//! A menu over the same functions the subcommands use.

pub mod theme;

use console::Style;
use dialoguer::{Input, Select};
use fieldguide_core::{Config, PermissionState, PermissionStore, ResultPresenter};

use super::capture;
use super::classify;
use super::models;
use super::permission::ensure_camera_permission;
use super::pick;
use super::present::TerminalPresenter;

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const MENU_ITEMS: &[&str] = &[
    "Take a photo",
    "Choose from gallery",
    "Camera permission",
    "Models",
    "Settings",
    "Exit",
];

/// Entry point for interactive mode.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    theme::print_banner();
    warn_if_no_model(config);

    let theme = theme::fieldguide_theme();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        // One failed photo should not end the session.
        let result = match selection {
            Some(0) => take_photo(config).await,
            Some(1) => choose_photo(config).await,
            Some(2) => manage_permission(),
            Some(3) => show_models(config),
            Some(4) => show_config(config),
            _ => break,
        };
        if let Err(e) = result {
            let err = Style::new().for_stderr().red();
            eprintln!("  {} {e:#}", err.apply_to("✗"));
            eprintln!();
        }
    }

    Ok(())
}

async fn take_photo(config: &Config) -> anyhow::Result<()> {
    let mut presenter = TerminalPresenter::stdout();

    if ensure_camera_permission(&Config::data_dir())? != PermissionState::Granted {
        presenter.notice("Camera permission not granted.")?;
        return Ok(());
    }

    let Some(zoom) = handle_interrupt(
        Input::<f32>::with_theme(&theme::fieldguide_theme())
            .with_prompt(format!(
                "Zoom ratio ({:.0}x-{:.0}x)",
                config.camera.min_zoom, config.camera.max_zoom
            ))
            .default(config.camera.min_zoom)
            .interact_text(),
    )?
    else {
        return Ok(());
    };

    let Some(photo) = capture::take_photo(config, zoom, &mut presenter).await? else {
        return Ok(());
    };
    classify::classify(config, photo, &mut presenter, true).await
}

async fn choose_photo(config: &Config) -> anyhow::Result<()> {
    let Some(handle) = pick::choose_from_gallery(config, &config.gallery_dir())? else {
        return Ok(());
    };
    let photo = fieldguide_core::ImageSourceRouter::from_external_pick(&handle);
    let mut presenter = TerminalPresenter::stdout();
    classify::classify(config, photo, &mut presenter, true).await
}

fn manage_permission() -> anyhow::Result<()> {
    let theme = theme::fieldguide_theme();
    let dim = Style::new().for_stderr().dim();
    let mut store = PermissionStore::open(&Config::data_dir())?;

    let record = store.record();
    let status = if record.granted {
        "granted"
    } else if record.never_ask_again {
        "denied, will not ask again"
    } else {
        "not granted"
    };
    eprintln!();
    eprintln!("  Camera permission: {}", dim.apply_to(status));
    eprintln!();

    let selection = Select::with_theme(&theme)
        .with_prompt("Camera permission")
        .items(&["Reset (ask again next time)", "Back"])
        .default(1)
        .interact_opt()?;

    if selection == Some(0) {
        store.reset()?;
        eprintln!("  {}", dim.apply_to("Permission reset."));
        eprintln!();
    }
    Ok(())
}

fn show_models(config: &Config) -> anyhow::Result<()> {
    let dim = Style::new().for_stderr().dim();
    let label = Style::new().for_stderr().bold();

    eprintln!();
    eprintln!(
        "    {:<14} {}",
        label.apply_to("Directory:"),
        config.model_dir().display()
    );
    let models = models::installed(config);
    if models.is_empty() {
        eprintln!("    {}", dim.apply_to("No models installed."));
        eprintln!(
            "    {}",
            dim.apply_to("Install one with: fieldguide models install <MODEL> <LABELS>")
        );
    }
    for status in &models {
        let marker = if status.name == config.model.name { "▸" } else { " " };
        let state = if status.is_ready() { "ready" } else { "incomplete" };
        eprintln!("  {} {:<30} {}", marker, status.name, dim.apply_to(state));
    }
    eprintln!();
    Ok(())
}

/// Summary of the current settings, with the full TOML on request.
fn show_config(config: &Config) -> anyhow::Result<()> {
    let theme = theme::fieldguide_theme();
    let dim = Style::new().for_stderr().dim();
    let cyan = Style::new().for_stderr().cyan();
    let label = Style::new().for_stderr().bold();

    loop {
        eprintln!();
        eprintln!("  {}", cyan.apply_to("Current configuration:"));
        eprintln!();

        let config_path = Config::default_path();
        let path_note = if config_path.exists() {
            "(exists)"
        } else {
            "(using defaults)"
        };
        let still_source = config
            .still_source()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "synthetic frame".to_string());
        let output_dir = config
            .capture
            .output_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "app media directory".to_string());

        let rows = [
            (
                "Config file:",
                format!("{} {}", config_path.display(), dim.apply_to(path_note)),
            ),
            ("Model:", config.model.name.clone()),
            ("Model dir:", config.model_dir().display().to_string()),
            (
                "Zoom range:",
                format!("{}x - {}x", config.camera.min_zoom, config.camera.max_zoom),
            ),
            ("Camera source:", still_source),
            ("Photos saved to:", output_dir),
            ("Gallery:", config.gallery_dir().display().to_string()),
            ("Log level:", config.logging.level.clone()),
        ];
        for (name, value) in rows {
            eprintln!("    {:<20} {}", label.apply_to(name), value);
        }
        eprintln!();

        let items = &["View full config (TOML)", "Show config file path", "Back"];
        let selection = Select::with_theme(&theme)
            .with_prompt("Settings")
            .items(items)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => match config.to_toml() {
                Ok(toml) => {
                    eprintln!();
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!("{toml}");
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!(
                        "  {}",
                        dim.apply_to("Change a value with: fieldguide config set <section.key> <value>")
                    );
                    eprintln!();
                }
                Err(e) => {
                    let err = Style::new().for_stderr().red();
                    eprintln!("  {} Failed to serialize config: {e}", err.apply_to("✗"));
                    eprintln!();
                }
            },
            Some(1) => {
                eprintln!();
                eprintln!("  {}", config_path.display());
                eprintln!();
            }
            _ => break,
        }
    }

    Ok(())
}

fn warn_if_no_model(config: &Config) {
    let status = models::active_status(config);
    if !status.is_ready() {
        let warn = Style::new().for_stderr().yellow();
        eprintln!(
            "  {} Model '{}' is not installed. Photos can be taken, but not identified.",
            warn.apply_to("!"),
            status.name
        );
        eprintln!();
    }
}
