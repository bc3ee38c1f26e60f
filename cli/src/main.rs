use deno_terminal::colors;
use std::error::Error;

mod commands;
mod error_fmt;
mod flag;
mod script_file;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", colors::red_bold("error"), e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli_args = flag::parse_args(std::env::args().collect())?;

    match cli_args.command {
        flag::Command::Run { file_path } => commands::run::execute(
            &file_path,
            &cli_args.plugin_dir,
            cli_args.safe_path.as_deref(),
        ),
        flag::Command::Eval { code } => {
            commands::eval::execute(&code, &cli_args.plugin_dir, cli_args.safe_path.as_deref())
        }
        flag::Command::Help => {
            flag::print_usage();
            Ok(())
        }
    }
}
