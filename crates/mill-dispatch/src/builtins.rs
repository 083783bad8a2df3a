//! Built-in commands of the dispatch layer: `help` and `echo`.

use mill_doc::Document;
use mill_types::error::Result;

use crate::registry::{Command, CommandRegistry};
use crate::report::syntax_error;

/// Register the dispatch layer's own commands.
pub fn register_core(reg: &mut CommandRegistry) {
    reg.register(Box::new(HelpCmd));
    reg.register(Box::new(EchoCmd));
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

struct HelpCmd;

impl Command for HelpCmd {
    fn name(&self) -> &str {
        "help"
    }
    fn short_help(&self) -> &str {
        "display help messages"
    }
    fn help(&self) -> String {
        "\n    help  .............  list all commands\n    \
         help <command>  ...  print help message for given command\n"
            .to_string()
    }
    fn execute(&self, args: &[String], _doc: &mut Document, reg: &CommandRegistry) -> Result<()> {
        match args.len() {
            1 => {
                println!();
                for (name, short_help) in reg.list_commands() {
                    println!("    {name:<20} {short_help}");
                }
                println!();
                println!("Type 'help <command>' for more information on a command.");
            }
            2 => match reg.lookup(&args[1]) {
                Some(entry) => println!("{}", entry.help_text()),
                None => println!("No such command: {}", args[1]),
            },
            _ => println!("{}", self.help()),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

struct EchoCmd;

impl Command for EchoCmd {
    fn name(&self) -> &str {
        "echo"
    }
    fn short_help(&self) -> &str {
        "turning echoing back of commands on and off"
    }
    fn help(&self) -> String {
        "\n    echo on\n\nPrint all commands to log before executing them.\n\n\
         \n    echo off\n\nDo not print all commands to log before executing them. (default)\n"
            .to_string()
    }
    fn execute(&self, args: &[String], _doc: &mut Document, reg: &CommandRegistry) -> Result<()> {
        if args.len() > 2 {
            return Err(syntax_error(args, 2, "Unexpected argument."));
        }
        if args.len() == 2 {
            match args[1].as_str() {
                "on" => reg.set_echo(true),
                "off" => reg.set_echo(false),
                _ => return Err(syntax_error(args, 1, "Unexpected argument.")),
            }
        }
        log::info!("echo {}", if reg.echo() { "on" } else { "off" });
        Ok(())
    }
}
