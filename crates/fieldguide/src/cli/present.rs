//! Styled terminal presenter.

use console::Style;
use fieldguide_core::{ConfidenceTier, Outcome, ResultPresenter};
use std::io::{self, Write};

/// Human-readable presenter: the message on stdout, details dimmed.
pub struct TerminalPresenter<W: Write> {
    out: W,
}

impl TerminalPresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

fn tier_style(tier: ConfidenceTier) -> Style {
    match tier {
        ConfidenceTier::Unclear => Style::new().yellow(),
        ConfidenceTier::Low => Style::new().yellow().bold(),
        ConfidenceTier::Medium => Style::new().cyan().bold(),
        ConfidenceTier::High | ConfidenceTier::VeryHigh => Style::new().green().bold(),
    }
}

impl<W: Write> ResultPresenter for TerminalPresenter<W> {
    fn present(&mut self, outcome: &Outcome) -> io::Result<()> {
        let dim = Style::new().dim();

        match outcome {
            Outcome::Classified(c) => {
                let style = tier_style(c.tier);
                let mark = if c.tier == ConfidenceTier::Unclear {
                    "?"
                } else {
                    "✓"
                };
                writeln!(self.out)?;
                writeln!(
                    self.out,
                    "  {} {}",
                    style.apply_to(mark),
                    style.apply_to(&c.message)
                )?;
                if c.tier != ConfidenceTier::Unclear {
                    writeln!(
                        self.out,
                        "    {}",
                        dim.apply_to(format!("{} · score {:.2} · {}", c.label, c.score, c.tier))
                    )?;
                }
                if !c.alternatives.is_empty() {
                    let others: Vec<String> = c
                        .alternatives
                        .iter()
                        .map(|p| format!("{} ({:.2})", p.label, p.score))
                        .collect();
                    writeln!(
                        self.out,
                        "    {}",
                        dim.apply_to(format!("also considered: {}", others.join(", ")))
                    )?;
                }
                writeln!(self.out, "    {}", dim.apply_to(c.image.path().display()))?;
            }
            Outcome::Unreadable { image, message } => {
                let red = Style::new().red();
                writeln!(self.out)?;
                writeln!(self.out, "  {} {}", red.apply_to("✗"), red.apply_to(message))?;
                writeln!(self.out, "    {}", dim.apply_to(image.path().display()))?;
            }
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    fn notice(&mut self, message: &str) -> io::Result<()> {
        let warn = Style::new().for_stderr().yellow();
        eprintln!("  {} {}", warn.apply_to("!"), warn.apply_to(message));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldguide_core::{Classification, ImageSourceRouter, Prediction};

    fn render(outcome: &Outcome) -> String {
        let mut presenter = TerminalPresenter::new(Vec::new());
        presenter.present(outcome).unwrap();
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[test]
    fn test_confident_result_names_label_and_alternatives() {
        let text = render(&Outcome::Classified(Classification {
            image: ImageSourceRouter::from_capture("/tmp/buff.jpg"),
            label: "owl".to_string(),
            score: 0.95,
            tier: ConfidenceTier::VeryHigh,
            message: "This looks like a owl (very high confidence).".to_string(),
            alternatives: vec![Prediction::new("heron", 0.03)],
        }));
        assert!(text.contains("This looks like a owl (very high confidence)."));
        assert!(text.contains("score 0.95"));
        assert!(text.contains("heron (0.03)"));
        assert!(text.contains("/tmp/buff.jpg"));
    }

    #[test]
    fn test_unclear_result_hides_label_line() {
        let text = render(&Outcome::Classified(Classification {
            image: ImageSourceRouter::from_capture("/tmp/buff.jpg"),
            label: "owl".to_string(),
            score: 0.2,
            tier: ConfidenceTier::Unclear,
            message: fieldguide_core::confidence::UNCLEAR_MESSAGE.to_string(),
            alternatives: Vec::new(),
        }));
        assert!(!text.contains("owl"));
    }

    #[test]
    fn test_unreadable() {
        let text = render(&Outcome::Unreadable {
            image: ImageSourceRouter::from_capture("/tmp/broken.jpg"),
            message: "Could not analyze image. Try another photo.".to_string(),
        });
        assert!(text.contains("Could not analyze image"));
        assert!(text.contains("/tmp/broken.jpg"));
    }
}
