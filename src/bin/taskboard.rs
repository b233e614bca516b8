use anstyle::{AnsiColor, Color, Style};
use taskboard::board::{run_board, BoardError};
use taskboard::logging::init_logging;
use taskboard::{parse_command, print_usage, Command};

fn main() {
    init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = match parse_command(args) {
        Ok(cmd) => cmd,
        Err(err) => {
            report_error("Invalid command arguments", &err.to_string());
            print_usage();
            std::process::exit(2);
        }
    };

    let board_args = match cmd {
        Command::Help => {
            print_usage();
            return;
        }
        Command::Run(args) => args,
    };

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => {
            report_error("Unable to resolve working directory", &err.to_string());
            std::process::exit(1);
        }
    };

    match run_board(&board_args, &cwd) {
        Ok(outcome) if outcome.success() => {}
        Ok(outcome) => {
            tracing::info!(failed = outcome.failed, total = outcome.total, "task board finished with failures");
            std::process::exit(1);
        }
        Err(err @ BoardError::NoTasks) => {
            report_error("Nothing to run", &err.to_string());
            print_usage();
            std::process::exit(2);
        }
        Err(err) => {
            report_error("Task board failed", &err.to_string());
            std::process::exit(1);
        }
    }
}

fn report_error(title: &str, body: &str) {
    let style = Style::new()
        .fg_color(Some(Color::Ansi(AnsiColor::Red)))
        .bold();
    anstream::eprintln!("{}[error]{} {title}", style.render(), style.render_reset());
    anstream::eprintln!("  {body}");
}
