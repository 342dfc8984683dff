use std::io::Write;

use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the result of a health probe.
pub fn print_health(
    w: &mut dyn Write,
    base_url: &str,
    healthy: bool,
    color: ColorMode,
) -> std::io::Result<()> {
    let label = if healthy { "up" } else { "down" };
    if color.enabled() {
        if healthy {
            writeln!(w, "{} {}", base_url.dimmed(), label.green().bold())
        } else {
            writeln!(w, "{} {}", base_url.dimmed(), label.red().bold())
        }
    } else {
        writeln!(w, "{} {}", base_url, label)
    }
}
