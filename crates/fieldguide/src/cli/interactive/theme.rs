//! Dialoguer theme and banner for interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// `ColorfulTheme` with green prompts and a `▸` cursor.
pub fn fieldguide_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().green(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().green(),
        active_item_style: Style::new().for_stderr().green(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().cyan(),
        ..ColorfulTheme::default()
    }
}

/// Print the version banner to stderr, leaving stdout for results.
pub fn print_banner() {
    let version_line = format!("Fieldguide v{}", fieldguide_core::VERSION);
    let tagline = "Point, shoot, and find out which bird it is";

    let inner_width = tagline.chars().count() + 4;

    let top = format!("  ┌{:─<width$}┐", "", width = inner_width);
    let mid1 = format!("  │{:^width$}│", version_line, width = inner_width);
    let mid2 = format!("  │{:^width$}│", tagline, width = inner_width);
    let bot = format!("  └{:─<width$}┘", "", width = inner_width);

    let green = Style::new().for_stderr().green();

    eprintln!();
    for line in [&top, &mid1, &mid2, &bot] {
        eprintln!("{}", green.apply_to(line));
    }
    eprintln!();
}
