//! The dispatch seam between the batch driver and the toolkit's sub-commands.
//!
//! The driver only needs [`CommandRegistry`]: one parsed command line in, a
//! pass/fail verdict out. [`Registry`] is the concrete table used by the
//! `gmbatch` binary; it ships the two batch-intrinsic built-ins (`set` and
//! `help`) and lets the embedding toolkit register its image sub-commands
//! (convert, identify, and friends) through the same trait.

use anyhow::Result;

use crate::options::{self, BatchOptions, Outcome};

/// Executes one parsed command line.
///
/// `argv[0]` is the client name, `argv[1]` the sub-command. The callee must
/// not retain the slice past the call; the driver reuses its storage for the
/// next line. `Ok(true)` means the command passed, `Ok(false)` that it failed
/// in a way it already reported; `Err` is reported by the driver and counts
/// as a failed command.
pub trait CommandRegistry {
    fn dispatch(&mut self, options: &mut BatchOptions, argv: &[String]) -> Result<bool>;
}

/// One named sub-command in a [`Registry`].
pub trait SubCommand {
    fn name(&self) -> &'static str;

    /// `args` excludes the client name and the command name itself.
    fn run(&mut self, options: &mut BatchOptions, args: &[String]) -> Result<bool>;
}

/// Name-indexed table of sub-commands.
pub struct Registry {
    commands: Vec<Box<dyn SubCommand>>,
}

impl Registry {
    /// An empty table with no commands at all.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn register(&mut self, command: Box<dyn SubCommand>) {
        self.commands.push(command);
    }
}

impl Default for Registry {
    /// The built-ins every batch session understands: `set` and `help`.
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(SetCommand));
        registry.register(Box::new(HelpCommand));
        registry
    }
}

impl CommandRegistry for Registry {
    fn dispatch(&mut self, options: &mut BatchOptions, argv: &[String]) -> Result<bool> {
        let Some(name) = argv.get(1) else {
            return Ok(false);
        };
        for command in &mut self.commands {
            if command.name() == name.as_str() {
                return command.run(options, &argv[2..]);
            }
        }
        eprintln!("{}: unrecognized command '{name}'", argv[0]);
        Ok(false)
    }
}

/// `set -flag value ...` — adjust the live session options.
///
/// The whole flag batch is validated before anything is committed, so an
/// invalid flag leaves the session exactly as it was.
struct SetCommand;

impl SubCommand for SetCommand {
    fn name(&self) -> &'static str {
        "set"
    }

    fn run(&mut self, options: &mut BatchOptions, args: &[String]) -> Result<bool> {
        match options::apply_atomic(args, options) {
            Ok(Outcome::Positional(i)) if i == args.len() => Ok(true),
            Ok(Outcome::Positional(i)) => {
                eprintln!("set: unexpected argument '{}'", args[i]);
                Ok(false)
            }
            Ok(Outcome::Help) => {
                println!("{}", options::USAGE);
                Ok(true)
            }
            Err(e) => {
                eprintln!("set: {e}");
                Ok(false)
            }
        }
    }
}

/// `help` — print the usage text.
struct HelpCommand;

impl SubCommand for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn run(&mut self, _options: &mut BatchOptions, _args: &[String]) -> Result<bool> {
        println!("{}", options::USAGE);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn set_updates_live_options() {
        let mut registry = Registry::default();
        let mut options = BatchOptions::default();
        let ok = registry
            .dispatch(&mut options, &argv(&["gm", "set", "-echo", "on"]))
            .unwrap();
        assert!(ok);
        assert!(options.echo);
    }

    #[test]
    fn set_with_a_bad_flag_changes_nothing() {
        let mut registry = Registry::default();
        let mut options = BatchOptions::default();
        let ok = registry
            .dispatch(
                &mut options,
                &argv(&["gm", "set", "-echo", "on", "-feedback", "bogus"]),
            )
            .unwrap();
        assert!(!ok);
        assert!(!options.echo);
        assert!(!options.feedback);
    }

    #[test]
    fn set_rejects_stray_positionals() {
        let mut registry = Registry::default();
        let mut options = BatchOptions::default();
        let ok = registry
            .dispatch(&mut options, &argv(&["gm", "set", "-echo", "on", "stray"]))
            .unwrap();
        assert!(!ok);
        assert!(!options.echo);
    }

    #[test]
    fn unknown_command_fails_without_error() {
        let mut registry = Registry::default();
        let mut options = BatchOptions::default();
        let ok = registry
            .dispatch(&mut options, &argv(&["gm", "transmogrify", "in.png"]))
            .unwrap();
        assert!(!ok);
    }

    #[test]
    fn registered_commands_are_found_by_name() {
        struct Probe;
        impl SubCommand for Probe {
            fn name(&self) -> &'static str {
                "probe"
            }
            fn run(&mut self, _: &mut BatchOptions, args: &[String]) -> Result<bool> {
                Ok(args.is_empty())
            }
        }

        let mut registry = Registry::new();
        registry.register(Box::new(Probe));
        let mut options = BatchOptions::default();
        assert!(
            registry
                .dispatch(&mut options, &argv(&["gm", "probe"]))
                .unwrap()
        );
        assert!(
            !registry
                .dispatch(&mut options, &argv(&["gm", "probe", "extra"]))
                .unwrap()
        );
    }
}
