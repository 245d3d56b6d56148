use std::io::IsTerminal;
use std::time::Duration;

use anstyle::{AnsiColor, Style};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn output_style(plain_flag: bool) -> OutputStyle {
    if plain_flag || !std::io::stdout().is_terminal() {
        OutputStyle::Plain
    } else {
        OutputStyle::Rich
    }
}

pub(crate) fn print_status(style: OutputStyle, status: &str, message: &str) {
    println!("{}", render_status_line(style, status, message));
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => format!("[{status}] {message}"),
        OutputStyle::Rich => format!(
            "{} {message}",
            colorize(status_style(status), &format!("[{status}]"))
        ),
    }
}

fn status_style(status: &str) -> Style {
    match status {
        "ok" | "done" => AnsiColor::Green.on_default().bold(),
        "warn" => AnsiColor::Yellow.on_default().bold(),
        "fail" => AnsiColor::Red.on_default().bold(),
        _ => AnsiColor::Cyan.on_default().bold(),
    }
}

fn colorize(style: Style, text: &str) -> String {
    format!("{style}{text}{style:#}")
}

/// Byte-progress bar for installer downloads. `None` in plain mode; the
/// caller sets the length once the response advertises one.
pub(crate) fn download_progress(style: OutputStyle) -> Option<ProgressBar> {
    if style != OutputStyle::Rich {
        return None;
    }
    let bar = ProgressBar::new(0);
    if let Ok(template) = ProgressStyle::with_template(
        "{spinner:.cyan.bold} {msg:<10} [{bar:24.cyan/blue}] {bytes}/{total_bytes}",
    ) {
        bar.set_style(template.progress_chars("=> "));
    }
    bar.set_message("download");
    bar.enable_steady_tick(Duration::from_millis(90));
    Some(bar)
}
