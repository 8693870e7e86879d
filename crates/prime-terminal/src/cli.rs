use analysis_core::Period;
use anyhow::{bail, Context};
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage:
  prime-terminal analyze <TICKER>            Score one ticker
  prime-terminal compare <T1> <T2> ...       Side-by-side comparison (no tickers: PRIME_FAVORITES)

Options:
  --period P       1mo, 3mo, 6mo, 1y, 2y, 5y or max (default: 1y)
  --json           Print the report as JSON
  --plain          No decoration glyphs in text output
  --fixtures DIR   Read DIR/<TICKER>.json instead of Yahoo Finance";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Analyze { ticker: String },
    Compare { tickers: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub command: Command,
    pub period: Period,
    pub json: bool,
    pub decorated: bool,
    pub fixtures: Option<PathBuf>,
}

/// Value following `flag`, if the flag is present
fn flag_value<'a>(args: &'a [String], flag: &str) -> anyhow::Result<Option<&'a str>> {
    match args.iter().position(|a| a == flag) {
        Some(i) => match args.get(i + 1) {
            Some(v) if !v.starts_with("--") => Ok(Some(v.as_str())),
            _ => bail!("{} needs a value", flag),
        },
        None => Ok(None),
    }
}

/// Parse arguments after the program name
pub fn parse_args(args: &[String]) -> anyhow::Result<CliArgs> {
    let json = args.iter().any(|a| a == "--json");
    let decorated = !args.iter().any(|a| a == "--plain");

    let period = match flag_value(args, "--period")? {
        Some(p) => p.parse::<Period>().with_context(|| format!("bad --period '{}'", p))?,
        None => Period::default(),
    };
    let fixtures = flag_value(args, "--fixtures")?.map(PathBuf::from);

    // positional arguments: everything that is neither a flag nor a flag's value
    let mut positional = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--period" || arg == "--fixtures" {
            skip_next = true;
        } else if arg.starts_with("--") {
            if !matches!(arg.as_str(), "--json" | "--plain") {
                bail!("unknown option {}", arg);
            }
        } else {
            positional.push(arg.clone());
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("analyze") => {
            let ticker = positional.next().context("analyze needs a ticker")?;
            if let Some(extra) = positional.next() {
                bail!("unexpected argument {}", extra);
            }
            Command::Analyze { ticker }
        }
        Some("compare") => Command::Compare {
            tickers: positional.collect(),
        },
        Some(other) => bail!("unknown command {}", other),
        None => bail!("missing command"),
    };

    Ok(CliArgs {
        command,
        period,
        json,
        decorated,
        fixtures,
    })
}
