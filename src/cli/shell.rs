//! Reads command lines from a line editor (interactive) or stdin (script mode)
//! and feeds them to the shell context.

use std::{
    env,
    io::{self, BufRead},
    sync::Arc,
    time::Duration,
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    history::DefaultHistory,
    Cmd, Context as ReadlineContext, Editor, Helper, Highlighter, Hinter, KeyEvent, Validator,
};
use xpense_config::Config;

use crate::cli::context::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output;
use crate::scheduler::DailyTrigger;

/// Set to run commands from stdin without line editing.
pub const SCRIPT_ENV: &str = "EXPENSE_CORE_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Script => drive(&mut context, &mut StdinLines::new()),
        CliMode::Interactive => {
            let mut editor = EditorLines::new(context.command_names())?;
            output::info("Expense Watch shell. Type `help` for commands.");
            let trigger =
                DailyTrigger::start(Arc::clone(&context.tracker), check_interval(&context.config))?;
            let outcome = drive(&mut context, &mut editor);
            trigger.stop();
            outcome
        }
    }
}

fn check_interval(config: &Config) -> Duration {
    Duration::from_secs(u64::from(config.check_interval_hours) * 60 * 60)
}

/// Supplies command lines; `None` ends the session.
trait LineSource {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>, CliError>;
}

struct StdinLines {
    lines: io::Lines<io::StdinLock<'static>>,
}

impl StdinLines {
    fn new() -> Self {
        Self {
            lines: io::stdin().lock().lines(),
        }
    }
}

impl LineSource for StdinLines {
    fn next_line(&mut self, _prompt: &str) -> Result<Option<String>, CliError> {
        Ok(self.lines.next().transpose()?)
    }
}

struct EditorLines {
    editor: Editor<CommandCompleter, DefaultHistory>,
}

impl EditorLines {
    fn new(names: Vec<&'static str>) -> Result<Self, CliError> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(CommandCompleter::new(names)));
        editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
        Ok(Self { editor })
    }
}

impl LineSource for EditorLines {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>, CliError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.trim()).ok();
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                output::info("Exiting shell.");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn drive(context: &mut ShellContext, source: &mut dyn LineSource) -> Result<(), CliError> {
    while context.running {
        let Some(line) = source.next_line(&context.prompt())? else {
            break;
        };
        match handle_line(context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(LoopControl::Continue);
    }
    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(format!("Could not read `{line}`: {err}"));
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    context.last_command = Some(line.to_string());

    let control = context.dispatch(&raw.to_lowercase(), raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

/// Tab / `?` completion of command names in the first word of the line.
#[derive(Helper, Hinter, Highlighter, Validator)]
struct CommandCompleter {
    names: Vec<&'static str>,
}

impl CommandCompleter {
    fn new(mut names: Vec<&'static str>) -> Self {
        names.sort_unstable();
        names.dedup();
        Self { names }
    }

    fn candidates(&self, before_cursor: &str) -> (usize, Vec<&'static str>) {
        let word = before_cursor.trim_start();
        let start = before_cursor.len() - word.len();
        if word.contains(char::is_whitespace) {
            return (before_cursor.len(), Vec::new());
        }
        let word = word.to_ascii_lowercase();
        let matches = self
            .names
            .iter()
            .copied()
            .filter(|name| name.starts_with(&word))
            .collect();
        (start, matches)
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, names) = self.candidates(&line[..pos]);
        let pairs = names
            .into_iter()
            .map(|name| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}
