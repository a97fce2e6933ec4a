use std::env;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::process::ExitCode;

use anyhow::Context;
use gmbatch::command::Registry;
use gmbatch::input::{CommandInput, EditorInput, ReaderInput};
use gmbatch::options::{self, BatchOptions, DEFAULT_PROMPT, Outcome, USAGE};
use gmbatch::BatchDriver;

const CLIENT: &str = "gmbatch";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut options = BatchOptions::default();
    let first = match options::apply(&args, &mut options) {
        Ok(Outcome::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Ok(Outcome::Positional(i)) => i,
        Err(e) => {
            eprintln!("{CLIENT}: {e}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };
    let positional = &args[first..];
    if positional.len() > 1 {
        eprintln!("{CLIENT}: too many arguments");
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    }

    // No input file means an interactive-style session: prompt by default,
    // whether or not standard input is a terminal.
    if positional.is_empty() && options.prompt.is_none() {
        options.prompt = Some(DEFAULT_PROMPT.to_owned());
    }

    let mut registry = Registry::default();
    let mut driver = BatchDriver::new(CLIENT, options, &mut registry);

    let passed = match positional.first().map(String::as_str) {
        Some(path) if path != "-" => {
            let file = match File::open(path).with_context(|| format!("cannot open '{path}'")) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("{CLIENT}: {e:#}");
                    return ExitCode::FAILURE;
                }
            };
            run(&mut driver, &mut ReaderInput::new(BufReader::new(file)))
        }
        Some(_) => run(&mut driver, &mut ReaderInput::new(io::stdin().lock())),
        None => {
            if io::stdin().is_terminal() {
                match EditorInput::new() {
                    Ok(mut input) => run(&mut driver, &mut input),
                    Err(e) => {
                        eprintln!("{CLIENT}: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                run(&mut driver, &mut ReaderInput::new(io::stdin().lock()))
            }
        }
    };

    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run(driver: &mut BatchDriver<'_>, input: &mut dyn CommandInput) -> bool {
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();
    driver.run(input, &mut out, &mut err)
}
