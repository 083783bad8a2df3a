//! The `script` command: execute commands from a file.

use std::fs::File;
use std::io::BufReader;

use mill_dispatch::{check_extra_args, syntax_error, Command, CommandRegistry, ScriptSource};
use mill_doc::Document;
use mill_types::error::{MillError, Result};

pub struct ScriptCmd;

impl Command for ScriptCmd {
    fn name(&self) -> &str {
        "script"
    }
    fn short_help(&self) -> &str {
        "execute commands from a script file"
    }
    fn help(&self) -> String {
        "\n    script <filename>\n\nThis command executes the mill commands in the \
         specified file. Frontends\ninvoked from the script may read here-documents \
         (`<<MARK`) out of it.\n"
            .to_string()
    }
    fn execute(&self, args: &[String], doc: &mut Document, reg: &CommandRegistry) -> Result<()> {
        if args.len() < 2 {
            return Err(syntax_error(args, args.len(), "Missing script file."));
        }
        if args[1].starts_with('-') {
            return Err(syntax_error(
                args,
                1,
                "Unknown option or option in arguments.",
            ));
        }
        check_extra_args(args, 2)?;

        let filename = &args[1];
        let file = File::open(filename).map_err(|source| MillError::OpenInput {
            filename: filename.clone(),
            source,
        })?;
        log::info!("Executing script file `{filename}'");

        // Install the script as the current source so here-documents inside
        // it resolve; restore the previous source even when a line fails.
        let saved = reg.swap_script_source(Some(ScriptSource::new(
            filename.clone(),
            Box::new(BufReader::new(file)),
        )));
        let result = run_script_lines(reg, doc);
        reg.swap_script_source(saved);
        result
    }
}

fn run_script_lines(reg: &CommandRegistry, doc: &mut Document) -> Result<()> {
    while let Some(line) = reg.next_script_line()? {
        reg.execute_line(doc, &line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register_builtins;
    use std::io::Write;

    fn setup() -> (CommandRegistry, Document) {
        let mut reg = CommandRegistry::new();
        mill_dispatch::register_core(&mut reg);
        register_builtins(&mut reg);
        (reg, Document::new())
    }

    fn write_script(dir: &tempfile::TempDir, name: &str, text: &str) -> String {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn script_executes_lines_in_order() {
        let (reg, mut doc) = setup();
        doc.add_module("junk").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(&dir, "run.mill", "# a comment\nclean\nls\n");

        reg.execute_line(&mut doc, &format!("script {path}")).unwrap();
        assert!(!doc.modules.contains_key("junk"));
    }

    #[test]
    fn script_here_document_feeds_frontend() {
        let (reg, mut doc) = setup();
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(
            &dir,
            "run.mill",
            "read_text <<EOT\n.module from_script\nhello\nEOT\nstat\n",
        );

        reg.execute_line(&mut doc, &format!("script {path}")).unwrap();

        assert_eq!(doc.modules["from_script"].lines, vec!["hello"]);
        assert_eq!(reg.last_here_document(), ".module from_script\nhello\n");
    }

    #[test]
    fn nested_scripts_restore_the_outer_source() {
        let (reg, mut doc) = setup();
        let dir = tempfile::tempdir().unwrap();
        let inner = write_script(
            &dir,
            "inner.mill",
            "read_text <<IN\n.module inner_mod\ni\nIN\n",
        );
        let outer = write_script(
            &dir,
            "outer.mill",
            &format!("script {inner}\nread_text <<OUT\n.module outer_mod\no\nOUT\n"),
        );

        reg.execute_line(&mut doc, &format!("script {outer}")).unwrap();

        assert!(doc.modules.contains_key("inner_mod"));
        assert!(doc.modules.contains_key("outer_mod"));
    }

    #[test]
    fn failing_line_aborts_script_and_restores_source() {
        let (reg, mut doc) = setup();
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(&dir, "run.mill", "no_such_command\nls\n");

        let err = reg
            .execute_line(&mut doc, &format!("script {path}"))
            .unwrap_err();
        assert!(matches!(err, MillError::UnknownCommand(_)));
        // The script source was uninstalled again.
        assert!(reg.next_script_line().unwrap().is_none());
    }

    #[test]
    fn missing_script_file_reports_os_error() {
        let (reg, mut doc) = setup();
        let err = reg
            .execute_line(&mut doc, "script /no/such/script.mill")
            .unwrap_err();
        assert!(matches!(err, MillError::OpenInput { .. }));
    }

    #[test]
    fn script_without_filename_is_syntax_error() {
        let (reg, mut doc) = setup();
        let err = reg.execute_line(&mut doc, "script").unwrap_err();
        assert!(matches!(err, MillError::Syntax(_)));
    }
}
