//! Shared tail of `capture` and `pick`: run the classifier and present the
//! outcome.

use std::time::Duration;

use clap::Args;
use fieldguide_core::{
    ClassificationPipeline, Config, ImageReference, InferenceService, OutputFormat, OutputWriter,
    ResultPresenter,
};

use super::present::TerminalPresenter;

/// Output options shared by the commands that classify a photo.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Print the result as JSON (format from `output.format`)
    #[arg(long)]
    pub json: bool,

    /// Machine-readable output format: json or jsonl
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl OutputArgs {
    /// The machine format requested, or `None` for human-readable output.
    pub fn machine_format(&self, config: &Config) -> anyhow::Result<Option<OutputFormat>> {
        let name = match (&self.format, self.json) {
            (Some(format), _) => format.as_str(),
            (None, true) => config.output.format.as_str(),
            (None, false) => return Ok(None),
        };
        OutputFormat::parse(name)
            .map(Some)
            .ok_or_else(|| anyhow::anyhow!("Unknown output format '{name}' (expected json or jsonl)"))
    }
}

/// Build the presenter the output flags ask for.
pub fn presenter(args: &OutputArgs, config: &Config) -> anyhow::Result<Box<dyn ResultPresenter>> {
    Ok(match args.machine_format(config)? {
        Some(format) => Box::new(OutputWriter::new(
            std::io::stdout(),
            format,
            args.pretty || config.output.pretty,
        )),
        None => Box::new(TerminalPresenter::stdout()),
    })
}

/// Classify `photo` and hand the outcome to `presenter`.
///
/// `spinner` is only honoured when stderr is a terminal.
pub async fn classify(
    config: &Config,
    photo: ImageReference,
    presenter: &mut dyn ResultPresenter,
    spinner: bool,
) -> anyhow::Result<()> {
    let pipeline = ClassificationPipeline::new(InferenceService::new(config));

    let progress = (spinner && console::Term::stderr().is_term()).then(|| create_spinner(&photo));
    let outcome = pipeline.run(photo).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let outcome = outcome?;
    tracing::debug!(result = outcome.message(), "Classification finished");
    presenter.present(&outcome)?;
    Ok(())
}

fn create_spinner(photo: &ImageReference) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("Analyzing {photo}..."));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
