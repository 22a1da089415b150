use std::io::{IsTerminal, Write};

use anstyle::{AnsiColor, Effects, Style};
use clap::ValueEnum;

use crate::runner::{NewVersionNotice, RunMode, UpgradeReport};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct TerminalRenderer {
    style: OutputStyle,
}

impl TerminalRenderer {
    pub(crate) fn from_style(style: OutputStyle) -> Self {
        Self { style }
    }

    pub(crate) fn current(choice: ColorChoice) -> Self {
        Self::from_style(current_output_style(choice))
    }

    /// Notices share stderr with `go get`, keeping stdout for the summary.
    pub(crate) fn print_notice(self, notice: &NewVersionNotice) {
        let _ = self.write_notice(&mut std::io::stderr().lock(), notice);
    }

    pub(crate) fn write_notice(
        self,
        out: &mut impl Write,
        notice: &NewVersionNotice,
    ) -> std::io::Result<()> {
        writeln!(out, "{}", render_notice_line(self.style, notice))
    }

    pub(crate) fn print_summary(self, report: &UpgradeReport) {
        println!("{}", render_summary_line(self.style, report));
    }
}

pub(crate) fn current_output_style(choice: ColorChoice) -> OutputStyle {
    resolve_output_style(
        choice,
        std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty()),
        std::io::stdout().is_terminal() && std::io::stderr().is_terminal(),
    )
}

pub(crate) fn resolve_output_style(
    choice: ColorChoice,
    no_color: bool,
    is_terminal: bool,
) -> OutputStyle {
    match choice {
        ColorChoice::Always => OutputStyle::Rich,
        ColorChoice::Never => OutputStyle::Plain,
        ColorChoice::Auto if is_terminal && !no_color => OutputStyle::Rich,
        ColorChoice::Auto => OutputStyle::Plain,
    }
}

pub(crate) fn render_notice_line(style: OutputStyle, notice: &NewVersionNotice) -> String {
    let mut line = render_status_line(style, "notice", &notice.to_string());
    if style == OutputStyle::Rich {
        line.push_str(&format!(
            " {}",
            colorize(detail_style(), &format!("(latest {})", notice.latest))
        ));
    }
    line
}

pub(crate) fn render_summary_line(style: OutputStyle, report: &UpgradeReport) -> String {
    let count = report.processed.len();
    let noun = if count == 1 { "module" } else { "modules" };
    let message = match report.mode {
        RunMode::Upgrade => format!(
            "upgraded {count} {noun}; go version unchanged ({})",
            report.go_version
        ),
        RunMode::CheckOnly => format!(
            "checked {count} {noun}; {} with newer versions",
            report.notices.len()
        ),
    };
    render_status_line(style, "done", &message)
}

fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => {
            let label = colorize(status_style(status), &format!("{status:>6}"));
            format!("{label} {message}")
        }
    }
}

fn status_style(status: &str) -> Style {
    let color = match status {
        "notice" => AnsiColor::BrightYellow,
        "done" => AnsiColor::BrightGreen,
        _ => AnsiColor::BrightBlue,
    };
    Style::new()
        .fg_color(Some(color.into()))
        .effects(Effects::BOLD)
}

fn detail_style() -> Style {
    Style::new().effects(Effects::DIMMED)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
