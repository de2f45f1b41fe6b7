use std::process::ExitCode;

use clap::Parser;

use kv_export::ExportSummary;
use kv_export::cli::{self, AppError, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(summary) => {
            println!("{}", format_summary(&summary));
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprint!("{}", format_error(&err));
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<ExportSummary, AppError> {
    let config = cli::load_config(cli)?;
    cli::logging::init(&config.logging)?;
    cli::execute(&config)
}

fn format_summary(summary: &ExportSummary) -> String {
    let mut line = format!(
        "Exported {} keys to {} ({} bytes)",
        summary.exported,
        summary.output.display(),
        summary.bytes_written
    );
    if summary.skipped > 0 {
        line.push_str(&format!(", skipped {} removed during export", summary.skipped));
    }
    line
}

/// Format an error for the terminal, with a hint when one applies.
fn format_error(err: &AppError) -> String {
    use std::io::IsTerminal;

    let use_colors = std::io::stderr().is_terminal();

    let (red, yellow, reset) = if use_colors {
        ("\x1b[0;31m", "\x1b[0;33m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    let mut output = format!("{}Error:{} {}\n", red, reset, err);
    if let Some(hint) = err.hint() {
        output.push_str(&format!("{}Hint:{} {}\n", yellow, reset, hint));
    }

    output
}
