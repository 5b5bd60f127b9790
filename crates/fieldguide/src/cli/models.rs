//! The `fieldguide models` command for managing classifier models.
//!
//! A model is a directory under `general.model_dir` holding `model.onnx` and
//! its label file. `model.name` selects which one is used.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use fieldguide_core::inference::onnx::MODEL_FILENAME;
use fieldguide_core::inference::LabelSet;
use fieldguide_core::Config;

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Install a classifier from an ONNX file and its label list
    Install {
        /// Path to the ONNX model
        model: PathBuf,

        /// Path to the label list (one label per line, or an id,name CSV)
        labels: PathBuf,

        /// Name to install under (defaults to `model.name`)
        #[arg(long)]
        name: Option<String>,

        /// Overwrite an existing model with the same name
        #[arg(long)]
        force: bool,
    },

    /// List installed models
    List,

    /// Show model directory path
    Path,
}

/// What is on disk for one model directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStatus {
    pub name: String,
    pub has_model: bool,
    /// Number of labels, or `None` when the label file is missing or invalid
    pub labels: Option<usize>,
}

impl ModelStatus {
    /// Inspect `dir` using the label filename from `config`.
    pub fn inspect(dir: &Path, config: &Config) -> Self {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let labels = LabelSet::load(&dir.join(&config.model.labels_file))
            .ok()
            .map(|set| set.len());
        Self {
            name,
            has_model: dir.join(MODEL_FILENAME).exists(),
            labels,
        }
    }

    /// Both the model and a non-empty label list are present.
    pub fn is_ready(&self) -> bool {
        self.has_model && self.labels.is_some_and(|n| n > 0)
    }

    fn describe(&self) -> String {
        match (self.has_model, self.labels) {
            (true, Some(n)) => format!("ready ({n} labels)"),
            (true, None) => "missing labels".to_string(),
            (false, _) => "missing model.onnx".to_string(),
        }
    }
}

/// Status of the model `model.name` points at.
pub fn active_status(config: &Config) -> ModelStatus {
    ModelStatus::inspect(&config.model_path(), config)
}

/// Status of every model directory, sorted by name.
pub fn installed(config: &Config) -> Vec<ModelStatus> {
    let Ok(entries) = std::fs::read_dir(config.model_dir()) else {
        return Vec::new();
    };
    let mut models: Vec<ModelStatus> = entries
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .map(|e| ModelStatus::inspect(&e.path(), config))
        .collect();
    models.sort_by(|a, b| a.name.cmp(&b.name));
    models
}

/// Copy `model` and `labels` into `<model_dir>/<name>/`.
///
/// The label file is parsed first so a broken list never gets installed.
pub fn install(
    config: &Config,
    model: &Path,
    labels: &Path,
    name: &str,
    force: bool,
) -> anyhow::Result<PathBuf> {
    if !model.is_file() {
        anyhow::bail!("Model file not found: {}", model.display());
    }
    let label_set = LabelSet::load(labels)?;
    if label_set.is_empty() {
        anyhow::bail!("Label file {} contains no labels", labels.display());
    }
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        anyhow::bail!("Invalid model name: {name:?}");
    }

    let target = config.model_dir().join(name);
    if target.join(MODEL_FILENAME).exists() && !force {
        anyhow::bail!(
            "Model '{}' already exists at: {}\nUse --force to overwrite.",
            name,
            target.display()
        );
    }

    std::fs::create_dir_all(&target)?;
    std::fs::copy(model, target.join(MODEL_FILENAME))?;
    std::fs::copy(labels, target.join(&config.model.labels_file))?;

    tracing::info!(
        "Installed model '{}' ({} labels) to {}",
        name,
        label_set.len(),
        target.display()
    );
    Ok(target)
}

/// Execute the models command.
pub fn execute(args: ModelsArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        ModelsCommand::Install {
            model,
            labels,
            name,
            force,
        } => {
            let name = name.unwrap_or_else(|| config.model.name.clone());
            let target = install(config, &model, &labels, &name, force)?;
            println!("Model installed at: {}", target.display());
            if name != config.model.name {
                println!("Activate it with: fieldguide config set model.name {name}");
            }
        }

        ModelsCommand::List => {
            let models = installed(config);
            if models.is_empty() {
                println!("No models installed.");
                println!("Run `fieldguide models install <MODEL> <LABELS>` to add one.");
                return Ok(());
            }

            println!("Installed models:");
            println!("  Directory: {}\n", config.model_dir().display());
            for status in &models {
                let active_marker = if status.name == config.model.name {
                    "  (active)"
                } else {
                    ""
                };
                println!(
                    "    - {:30} {:22}{}",
                    status.name,
                    status.describe(),
                    active_marker
                );
            }
        }

        ModelsCommand::Path => {
            println!("{}", config.model_dir().display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.general.model_dir = dir.join("models");
        config
    }

    fn write(path: &Path, content: &str) -> PathBuf {
        std::fs::write(path, content).unwrap();
        path.to_path_buf()
    }

    #[test]
    fn test_install_copies_model_and_labels() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let model = write(&dir.path().join("birds.onnx"), "not really onnx");
        let labels = write(&dir.path().join("birds.txt"), "sparrow\nrobin\nowl\n");

        let target = install(&config, &model, &labels, "birds", false).unwrap();
        assert!(target.join(MODEL_FILENAME).exists());
        assert!(target.join("labels.txt").exists());

        let models = installed(&config);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "birds");
        assert_eq!(models[0].labels, Some(3));
        assert!(models[0].is_ready());
    }

    #[test]
    fn test_install_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let model = write(&dir.path().join("m.onnx"), "x");
        let labels = write(&dir.path().join("l.txt"), "owl\n");

        install(&config, &model, &labels, "birds", false).unwrap();
        assert!(install(&config, &model, &labels, "birds", false).is_err());
        assert!(install(&config, &model, &labels, "birds", true).is_ok());
    }

    #[test]
    fn test_install_rejects_empty_labels() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let model = write(&dir.path().join("m.onnx"), "x");
        let labels = write(&dir.path().join("l.txt"), "# nothing here\n\n");

        assert!(install(&config, &model, &labels, "birds", false).is_err());
        assert!(installed(&config).is_empty());
    }

    #[test]
    fn test_install_rejects_path_names() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let model = write(&dir.path().join("m.onnx"), "x");
        let labels = write(&dir.path().join("l.txt"), "owl\n");

        assert!(install(&config, &model, &labels, "../escape", false).is_err());
    }

    #[test]
    fn test_active_status_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let status = active_status(&config_in(dir.path()));
        assert_eq!(status.name, "aiy-birds-v1");
        assert!(!status.has_model);
        assert!(!status.is_ready());
    }
}
