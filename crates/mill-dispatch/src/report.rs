//! Syntax-error reporting with a column-accurate caret pointer.

use mill_types::error::{MillError, Result};

/// Build the command-syntax error for `args[argidx]`.
///
/// Reconstructs the full command line from `args` and points a caret at the
/// character offset of the offending argument. This is the single error path
/// for every option/argument validation step across the interpreter and both
/// I/O adapters. `argidx` may equal `args.len()` to point past the last
/// argument (e.g. a missing filename).
pub fn syntax_error(args: &[String], argidx: usize, message: &str) -> MillError {
    let mut command_text = String::new();
    let mut error_pos = 0;
    for (i, arg) in args.iter().enumerate() {
        if i < argidx {
            error_pos += arg.len() + 1;
        }
        if !command_text.is_empty() {
            command_text.push(' ');
        }
        command_text.push_str(arg);
    }
    MillError::Syntax(format!(
        "{message}\n> {command_text}\n> {spaces}^",
        spaces = " ".repeat(error_pos)
    ))
}

/// Validate that a generic command consumed all of its arguments.
///
/// A leftover option-like token is an unknown option; any other leftover
/// token is an extra argument.
pub fn check_extra_args(args: &[String], argidx: usize) -> Result<()> {
    if let Some(arg) = args.get(argidx) {
        if arg.starts_with('-') {
            return Err(syntax_error(
                args,
                argidx,
                "Unknown option or option in arguments.",
            ));
        }
        return Err(syntax_error(args, argidx, "Extra argument."));
    }
    Ok(())
}
