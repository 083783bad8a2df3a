//! Document passes: ls, stat, rename, delete, select, clean.

use mill_dispatch::{check_extra_args, syntax_error, Command, CommandRegistry};
use mill_doc::{Document, Selection};
use mill_types::error::{MillError, Result};

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

pub struct LsCmd;

impl Command for LsCmd {
    fn name(&self) -> &str {
        "ls"
    }
    fn short_help(&self) -> &str {
        "list modules in the active selection"
    }
    fn execute(&self, args: &[String], doc: &mut Document, _reg: &CommandRegistry) -> Result<()> {
        check_extra_args(args, 1)?;
        let names = doc.selected_names();
        println!();
        println!("{} modules:", names.len());
        for name in &names {
            println!("  {name}");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// stat
// ---------------------------------------------------------------------------

pub struct StatCmd;

impl Command for StatCmd {
    fn name(&self) -> &str {
        "stat"
    }
    fn short_help(&self) -> &str {
        "print per-module line counts"
    }
    fn execute(&self, args: &[String], doc: &mut Document, _reg: &CommandRegistry) -> Result<()> {
        check_extra_args(args, 1)?;
        let sel = doc.selection().clone();
        let mut modules = 0usize;
        let mut total = 0usize;
        println!();
        for (name, module) in &doc.modules {
            if !sel.selects(name) {
                continue;
            }
            println!("  {:6} lines in {name}", module.lines.len());
            modules += 1;
            total += module.lines.len();
        }
        println!("  {total} lines in {modules} modules");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// rename
// ---------------------------------------------------------------------------

pub struct RenameCmd;

impl Command for RenameCmd {
    fn name(&self) -> &str {
        "rename"
    }
    fn short_help(&self) -> &str {
        "rename a module"
    }
    fn help(&self) -> String {
        "\n    rename <old_name> <new_name>\n\nRename the given module.\n".to_string()
    }
    fn execute(&self, args: &[String], doc: &mut Document, _reg: &CommandRegistry) -> Result<()> {
        for idx in 1..args.len().min(3) {
            if args[idx].starts_with('-') {
                return Err(syntax_error(
                    args,
                    idx,
                    "Unknown option or option in arguments.",
                ));
            }
        }
        if args.len() < 3 {
            return Err(syntax_error(args, args.len(), "Missing argument."));
        }
        check_extra_args(args, 3)?;

        let old = &args[1];
        let new = &args[2];
        if doc.modules.contains_key(new) {
            return Err(MillError::Command(format!("module already exists: {new}")));
        }
        let Some(mut module) = doc.modules.remove(old) else {
            return Err(MillError::Command(format!("no such module: {old}")));
        };
        module.name = new.clone();
        doc.modules.insert(new.clone(), module);
        if doc.active_target.as_deref() == Some(old.as_str()) {
            doc.active_target = Some(new.clone());
        }
        log::debug!("Renamed module {old} to {new}");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

pub struct DeleteCmd;

impl Command for DeleteCmd {
    fn name(&self) -> &str {
        "delete"
    }
    fn short_help(&self) -> &str {
        "delete the named or selected modules"
    }
    fn help(&self) -> String {
        "\n    delete [module...]\n\nDelete the named modules, or every module in the \
         active selection when no\nnames are given.\n"
            .to_string()
    }
    fn execute(&self, args: &[String], doc: &mut Document, _reg: &CommandRegistry) -> Result<()> {
        let mut names: Vec<String> = Vec::new();
        for idx in 1..args.len() {
            if args[idx].starts_with('-') {
                return Err(syntax_error(
                    args,
                    idx,
                    "Unknown option or option in arguments.",
                ));
            }
            names.push(args[idx].clone());
        }

        if names.is_empty() {
            names = doc.selected_names();
        } else {
            for name in &names {
                if !doc.modules.contains_key(name) {
                    return Err(MillError::Command(format!("no such module: {name}")));
                }
            }
        }

        for name in &names {
            doc.modules.remove(name);
        }
        log::info!("Deleted {} modules", names.len());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// select
// ---------------------------------------------------------------------------

pub struct SelectCmd;

impl Command for SelectCmd {
    fn name(&self) -> &str {
        "select"
    }
    fn short_help(&self) -> &str {
        "change the active selection"
    }
    fn help(&self) -> String {
        "\n    select <module...>\n\nRestrict the active selection to the named modules.\n\
         \n    select -clear\n\nRestore the full selection.\n\
         \n    select\n\nPrint the modules in the active selection.\n"
            .to_string()
    }
    fn execute(&self, args: &[String], doc: &mut Document, _reg: &CommandRegistry) -> Result<()> {
        if args.len() == 1 {
            for name in doc.selected_names() {
                println!("  {name}");
            }
            return Ok(());
        }

        if args[1] == "-clear" {
            check_extra_args(args, 2)?;
            if let Some(top) = doc.selection_stack.last_mut() {
                *top = Selection::Full;
            }
            return Ok(());
        }

        let mut names: Vec<String> = Vec::new();
        for idx in 1..args.len() {
            if args[idx].starts_with('-') {
                return Err(syntax_error(
                    args,
                    idx,
                    "Unknown option or option in arguments.",
                ));
            }
            if !doc.modules.contains_key(&args[idx]) {
                return Err(MillError::Command(format!("no such module: {}", args[idx])));
            }
            names.push(args[idx].clone());
        }

        let selection = Selection::of(names);
        match doc.selection_stack.last_mut() {
            Some(top) => *top = selection,
            None => doc.selection_stack.push(selection),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// clean
// ---------------------------------------------------------------------------

pub struct CleanCmd;

impl Command for CleanCmd {
    fn name(&self) -> &str {
        "clean"
    }
    fn short_help(&self) -> &str {
        "remove empty modules from the selection"
    }
    fn help(&self) -> String {
        "\n    clean [-purge]\n\nRemove selected modules that have no lines. With -purge, \
         also remove\nmodules whose lines are all blank.\n"
            .to_string()
    }
    fn execute(&self, args: &[String], doc: &mut Document, _reg: &CommandRegistry) -> Result<()> {
        let mut purge = false;
        let mut argidx = 1;
        while argidx < args.len() {
            match args[argidx].as_str() {
                "-purge" => {
                    purge = true;
                    argidx += 1;
                }
                _ => break,
            }
        }
        check_extra_args(args, argidx)?;

        let mut removed = 0usize;
        for name in doc.selected_names() {
            let Some(module) = doc.modules.get(&name) else {
                continue;
            };
            let removable = module.lines.is_empty()
                || (purge && module.lines.iter().all(|l| l.trim().is_empty()));
            if removable {
                doc.modules.remove(&name);
                removed += 1;
            }
        }
        if removed > 0 {
            log::info!("Removed {removed} empty modules");
        }
        Ok(())
    }
}
