//! The `fieldguide pick` command: choose an existing photo, then identify it.

use std::path::{Path, PathBuf};

use clap::Args;
use console::Style;
use dialoguer::Select;
use fieldguide_core::{Config, ContentHandle, Gallery, ImageSourceRouter};

use super::classify::{self, OutputArgs};
use super::interactive::theme::fieldguide_theme;

/// Arguments for the `pick` command.
#[derive(Args, Debug, Clone, Default)]
pub struct PickArgs {
    /// Photo path or file:// URI. Without it, a gallery picker is shown.
    #[arg(value_name = "PHOTO")]
    pub handle: Option<String>,

    /// Directory the picker browses (overrides `gallery.dir`)
    #[arg(long, value_name = "DIR")]
    pub gallery: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Execute the pick command.
pub async fn execute(args: PickArgs, config: &Config) -> anyhow::Result<()> {
    let mut presenter = classify::presenter(&args.output, config)?;

    let handle = match args.handle {
        Some(handle) => handle_from_arg(&handle),
        None => {
            let dir = args.gallery.unwrap_or_else(|| config.gallery_dir());
            match choose_from_gallery(config, &dir)? {
                Some(handle) => handle,
                // Picker dismissed: nothing to classify.
                None => return Ok(()),
            }
        }
    };

    let photo = ImageSourceRouter::from_external_pick(&handle);
    tracing::debug!("Picked {} ({:?})", photo, photo.origin());
    classify::classify(config, photo, presenter.as_mut(), true).await
}

/// Turn a command-line argument into a content handle, expanding `~` for plain
/// paths. URIs are passed through untouched.
pub fn handle_from_arg(arg: &str) -> ContentHandle {
    if arg.contains("://") {
        ContentHandle::new(arg)
    } else {
        ContentHandle::new(shellexpand::tilde(arg).into_owned())
    }
}

/// Let the user pick one image from `dir`. `None` when the picker is dismissed.
pub fn choose_from_gallery(config: &Config, dir: &Path) -> anyhow::Result<Option<ContentHandle>> {
    if !console::Term::stderr().is_term() {
        anyhow::bail!(
            "No photo given and no terminal for the picker. Pass a path: fieldguide pick <PHOTO>"
        );
    }

    let entries = Gallery::new(config.gallery.clone()).list(dir);
    if entries.is_empty() {
        let warn = Style::new().for_stderr().yellow();
        eprintln!(
            "  {} No images found in {}",
            warn.apply_to("!"),
            dir.display()
        );
        return Ok(None);
    }

    let items: Vec<String> = entries
        .iter()
        .map(|entry| {
            let name = entry
                .path
                .strip_prefix(dir)
                .unwrap_or(&entry.path)
                .display()
                .to_string();
            format!("{name}  ({})", format_size(entry.size))
        })
        .collect();

    let selection = Select::with_theme(&fieldguide_theme())
        .with_prompt(format!("Choose a photo from {}", dir.display()))
        .items(&items)
        .default(0)
        .max_length(15)
        .interact_opt()?;

    Ok(selection.map(|i| entries[i].handle()))
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{} KB", bytes / KB)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_passes_through() {
        let handle = handle_from_arg("file:///tmp/great%20tit.jpg");
        assert_eq!(handle.as_str(), "file:///tmp/great%20tit.jpg");
        assert_eq!(handle.resolve(), PathBuf::from("/tmp/great tit.jpg"));
    }

    #[test]
    fn test_plain_path_kept() {
        let handle = handle_from_arg("/tmp/owl.png");
        assert_eq!(handle.resolve(), PathBuf::from("/tmp/owl.png"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(4096), "4 KB");
        assert_eq!(format_size(3 * 1024 * 1024 / 2), "1.5 MB");
    }
}
