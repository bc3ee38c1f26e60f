use clap_lex::RawArgs;
use std::error::Error;

#[derive(Debug, PartialEq)]
pub struct CliArgs {
    pub command: Command,
    pub plugin_dir: String,
    pub safe_path: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Run { file_path: String },
    Eval { code: String },
    Help,
}

const DEFAULT_PLUGIN_DIR: &str = "plugins";

pub fn parse_args(args: Vec<String>) -> Result<CliArgs, Box<dyn Error>> {
    let raw = RawArgs::new(args);
    let mut cursor = raw.cursor();
    raw.next(&mut cursor); // skip program name

    let mut plugin_dir = DEFAULT_PLUGIN_DIR.to_string();
    let mut safe_path: Option<String> = None;
    let mut command: Option<Command> = None;

    while let Some(arg) = raw.next(&mut cursor) {
        if let Ok(value) = arg.to_value() {
            match value {
                "--plugins" => {
                    plugin_dir = next_value(&raw, &mut cursor, "--plugins")?;
                }
                "--safe-path" => {
                    safe_path = Some(next_value(&raw, &mut cursor, "--safe-path")?);
                }
                "run" if command.is_none() => {
                    command = Some(Command::Run {
                        file_path: next_value(&raw, &mut cursor, "run")?,
                    });
                }
                "eval" if command.is_none() => {
                    command = Some(Command::Eval {
                        code: next_value(&raw, &mut cursor, "eval")?,
                    });
                }
                "help" | "--help" | "-h" if command.is_none() => {
                    command = Some(Command::Help);
                }
                // A bare path is shorthand for `run <file>`
                _ if !value.starts_with('-') && command.is_none() => {
                    command = Some(Command::Run {
                        file_path: value.to_string(),
                    });
                }
                _ => {}
            }
        }
    }

    Ok(CliArgs {
        command: command.unwrap_or(Command::Help),
        plugin_dir,
        safe_path,
    })
}

fn next_value(
    raw: &RawArgs,
    cursor: &mut clap_lex::ArgCursor,
    flag: &str,
) -> Result<String, Box<dyn Error>> {
    if let Some(arg) = raw.next(cursor) {
        if let Ok(value) = arg.to_value() {
            return Ok(value.to_string());
        }
    }
    Err(format!("A value is required for {flag}").into())
}

pub fn print_usage() {
    println!(
        "sandjs runs JavaScript scripts against a sandboxed scripting instance.\n\n\
        USAGE:\n  \
          sandjs run <file>     Run a script file and print its JSON result\n  \
          sandjs eval <code>    Run a script from the command line\n\n\
        OPTIONS:\n  \
          --plugins <dir>       Plugin search directory (default: plugins)\n  \
          --safe-path <dir>     Directory scripts may access; without it scripts have no disk access"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code: unwrap is acceptable
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        let mut full = vec!["sandjs".to_string()];
        full.extend(args.iter().map(ToString::to_string));
        parse_args(full).unwrap()
    }

    #[test]
    fn parses_run_command() {
        let args = parse(&["run", "script/test.js"]);
        assert_eq!(
            args.command,
            Command::Run {
                file_path: "script/test.js".to_string()
            }
        );
        assert_eq!(args.plugin_dir, "plugins");
        assert_eq!(args.safe_path, None);
    }

    #[test]
    fn parses_eval_command() {
        let args = parse(&["eval", "jexport('x', 1)"]);
        assert_eq!(
            args.command,
            Command::Eval {
                code: "jexport('x', 1)".to_string()
            }
        );
    }

    #[test]
    fn bare_path_is_run_shorthand() {
        let args = parse(&["demo.js"]);
        assert_eq!(
            args.command,
            Command::Run {
                file_path: "demo.js".to_string()
            }
        );
    }

    #[test]
    fn parses_options_before_command() {
        let args = parse(&["--plugins", "/jars", "--safe-path", "./", "run", "test.js"]);
        assert_eq!(args.plugin_dir, "/jars");
        assert_eq!(args.safe_path, Some("./".to_string()));
        assert_eq!(
            args.command,
            Command::Run {
                file_path: "test.js".to_string()
            }
        );
    }

    #[test]
    fn no_arguments_means_help() {
        let args = parse(&[]);
        assert_eq!(args.command, Command::Help);
    }

    #[test]
    fn missing_flag_value_is_an_error() {
        let result = parse_args(vec!["sandjs".to_string(), "--plugins".to_string()]);
        assert!(result.is_err());
    }
}
