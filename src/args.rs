use crate::error::{ArgsError, Result};
use gridsheet_engine::engine::AGGREGATES;
use std::path::PathBuf;

pub(crate) fn print_usage() {
    eprintln!("Usage: gridsheet [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <FORMULA>   Evaluate a formula against the sheet and print it");
    eprintln!("  -s, --set <CELL>=<INPUT>  Set a cell before evaluating (can be repeated)");
    eprintln!("  --sample                  Fill A1:E5 with random integers");
    eprintln!("  -f, --functions <FILE>    Load custom Rhai functions (can be repeated)");
    eprintln!("  --no-default-functions    Skip the default.rhai config file");
    eprintln!("  --headers <N>             Print the first N column labels");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Without --command or --headers the non-empty cells are printed.");
    eprintln!("Set GRIDSHEET_LOG (e.g. GRIDSHEET_LOG=debug) to control logging.");
    eprintln!();
    eprintln!("Aggregate functions:");
    for builtin in AGGREGATES {
        eprintln!("  {:<9} {}", builtin.name, builtin.description);
    }
}

#[derive(Debug, Default, PartialEq)]
pub(crate) struct Options {
    pub command: Option<String>,
    pub assignments: Vec<(String, String)>,
    pub sample: bool,
    pub functions_files: Vec<PathBuf>,
    pub no_default_functions: bool,
    pub headers: Option<usize>,
    pub help: bool,
}

fn value<'a>(args: &'a [String], i: &mut usize, flag: &'static str) -> Result<&'a str> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or(ArgsError::MissingValue(flag))
}

/// Parse arguments (without the program name).
pub(crate) fn parse_args(args: &[String]) -> Result<Options> {
    let mut opts = Options::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => opts.help = true,
            "-c" | "--command" => {
                opts.command = Some(value(args, &mut i, "--command")?.to_string());
            }
            "-s" | "--set" => {
                let raw = value(args, &mut i, "--set")?;
                let (cell, input) = raw
                    .split_once('=')
                    .ok_or_else(|| ArgsError::BadAssignment(raw.to_string()))?;
                opts.assignments
                    .push((cell.trim().to_string(), input.to_string()));
            }
            "--sample" => opts.sample = true,
            "-f" | "--functions" => {
                opts.functions_files
                    .push(PathBuf::from(value(args, &mut i, "--functions")?));
            }
            "--no-default-functions" => opts.no_default_functions = true,
            "--headers" => {
                let raw = value(args, &mut i, "--headers")?;
                let count = raw
                    .parse()
                    .map_err(|_| ArgsError::BadCount(raw.to_string()))?;
                opts.headers = Some(count);
            }
            arg if arg.starts_with('-') && arg.len() > 1 => {
                return Err(ArgsError::UnknownOption(arg.to_string()));
            }
            arg => return Err(ArgsError::UnexpectedArgument(arg.to_string())),
        }
        i += 1;
    }

    Ok(opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        parse_args(&args)
    }

    #[test]
    fn test_parse_full_command_line() {
        let opts = parse(&[
            "--sample",
            "-s",
            "A1=10",
            "--set",
            "B2==A1 * 2",
            "-f",
            "mine.rhai",
            "--no-default-functions",
            "-c",
            "SUM(A1:B2)",
        ])
        .unwrap();
        assert!(opts.sample);
        assert!(opts.no_default_functions);
        assert_eq!(
            opts.assignments,
            vec![
                ("A1".to_string(), "10".to_string()),
                ("B2".to_string(), "=A1 * 2".to_string()),
            ]
        );
        assert_eq!(opts.functions_files, vec![PathBuf::from("mine.rhai")]);
        assert_eq!(opts.command.as_deref(), Some("SUM(A1:B2)"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse(&["-c"]), Err(ArgsError::MissingValue("--command")));
        assert_eq!(
            parse(&["--set", "A1"]),
            Err(ArgsError::BadAssignment("A1".to_string()))
        );
        assert_eq!(
            parse(&["--headers", "lots"]),
            Err(ArgsError::BadCount("lots".to_string()))
        );
        assert_eq!(
            parse(&["--bogus"]),
            Err(ArgsError::UnknownOption("--bogus".to_string()))
        );
        assert_eq!(
            parse(&["sheet.grd"]),
            Err(ArgsError::UnexpectedArgument("sheet.grd".to_string()))
        );
    }

    #[test]
    fn test_negative_formula_is_a_value() {
        let opts = parse(&["-c", "-5 + 2", "--headers", "3"]).unwrap();
        assert_eq!(opts.command.as_deref(), Some("-5 + 2"));
        assert_eq!(opts.headers, Some(3));
    }
}
