//! mill command-line entry point.
//!
//! Builds the command registry, loads `mill.toml` when present, then either
//! runs the given script files / `-c` command lines or drops into an
//! interactive loop on stdin.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};

use mill_dispatch::{register_core, CommandRegistry};
use mill_doc::Document;
use mill_passes::register_builtins;
use mill_types::config::MillConfig;

fn main() -> Result<()> {
    let mut commands: Vec<String> = Vec::new();
    let mut scripts: Vec<String> = Vec::new();
    let mut quiet = false;
    let mut echo = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" => match args.next() {
                Some(command) => commands.push(command),
                None => bail!("-c requires a command string"),
            },
            "-q" => quiet = true,
            "-e" => echo = true,
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            _ if arg.starts_with('-') => bail!("unknown option: {arg} (try --help)"),
            _ => scripts.push(arg),
        }
    }

    let default_level = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = MillConfig::load_or_default(Path::new(".")).context("loading mill.toml")?;
    let reg = build_registry(echo || config.echo);
    let mut doc = Document::new();

    if !scripts.is_empty() || !commands.is_empty() {
        for path in &scripts {
            run_reported(&reg, &mut doc, &config, &["script".to_string(), path.clone()])?;
        }
        for line in &commands {
            if let Err(err) = reg.execute_line(&mut doc, line) {
                if config.abort_on_error {
                    bail!("{err}");
                }
                log::error!("{err}");
            }
        }
        return Ok(());
    }

    interactive(&reg, &mut doc, &config)
}

/// Build the registry with every command registered in the defined order.
fn build_registry(echo: bool) -> CommandRegistry {
    let mut reg = CommandRegistry::new();
    register_core(&mut reg);
    register_builtins(&mut reg);
    reg.set_echo(echo);
    reg
}

/// Dispatch one argument vector, honoring the abort-on-error setting.
fn run_reported(
    reg: &CommandRegistry,
    doc: &mut Document,
    config: &MillConfig,
    args: &[String],
) -> Result<()> {
    if let Err(err) = reg.dispatch(doc, args) {
        if config.abort_on_error {
            bail!("{err}");
        }
        log::error!("{err}");
    }
    Ok(())
}

/// Read-evaluate loop on stdin; errors are reported and the loop continues.
fn interactive(reg: &CommandRegistry, doc: &mut Document, config: &MillConfig) -> Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{}", config.prompt);
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        if let Err(err) = reg.execute_line(doc, &line) {
            log::error!("{err}");
        }
    }
}

fn print_usage() {
    println!("Usage: mill [options] [script_file...]");
    println!();
    println!("    -c <commands>   execute the given command line, then exit");
    println!("    -e              start with command echoing enabled");
    println!("    -q              quiet: only warnings and errors are logged");
    println!("    -h, --help      print this help");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_core_and_builtin_commands() {
        let reg = build_registry(false);
        assert!(reg.lookup("help").is_some());
        assert!(reg.lookup("clean").is_some());
        assert!(reg.lookup("read_text").is_some());
        assert!(!reg.echo());
    }

    #[test]
    fn echo_flag_carries_into_registry() {
        let reg = build_registry(true);
        assert!(reg.echo());
    }

    #[test]
    fn errors_are_swallowed_when_abort_is_off() {
        let reg = build_registry(false);
        let mut doc = Document::new();
        let config = MillConfig {
            abort_on_error: false,
            ..MillConfig::default()
        };
        run_reported(&reg, &mut doc, &config, &["no_such".to_string()]).unwrap();
    }

    #[test]
    fn errors_abort_by_default() {
        let reg = build_registry(false);
        let mut doc = Document::new();
        let config = MillConfig::default();
        assert!(run_reported(&reg, &mut doc, &config, &["no_such".to_string()]).is_err());
    }
}
