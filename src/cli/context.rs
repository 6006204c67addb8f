//! Shell state, command dispatch and error reporting.

use std::{io, sync::Arc};

use rustyline::error::ReadlineError;
use thiserror::Error;
use xpense_config::{Config, ConfigError, ConfigManager};
use xpense_core::CoreError;

use crate::{
    cli::{commands, output, registry::CommandRegistry},
    sinks::ConsoleAlertSink,
    utils::paths,
    AppError, ExpenseTracker,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error("Input error: {0}")]
    Input(String),
    #[error("{0}")]
    Command(String),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::App(AppError::Config(err))
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Input(err.to_string())
    }
}

impl From<ReadlineError> for CliError {
    fn from(err: ReadlineError) -> Self {
        CliError::Input(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::App(AppError::Core(err))
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::App(AppError::Config(err))
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub tracker: Arc<ExpenseTracker>,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    /// Loads configuration and opens the data directory. `EXPENSE_CORE_HOME`
    /// redirects both.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        output::use_plain_output(mode == CliMode::Script);
        let config_manager = ConfigManager::with_base_dir(&paths::config_base())?;
        let config = config_manager.load()?;
        let sink = match mode {
            CliMode::Script => ConsoleAlertSink::plain(),
            CliMode::Interactive => ConsoleAlertSink::new(),
        };
        let tracker = ExpenseTracker::open(&config, paths::data_override(), sink)?;
        Ok(Self::with_tracker(mode, Arc::new(tracker), config_manager, config))
    }

    pub fn with_tracker(
        mode: CliMode,
        tracker: Arc<ExpenseTracker>,
        config_manager: ConfigManager,
        config: Config,
    ) -> Self {
        Self {
            mode,
            registry: CommandRegistry::new(commands::all_definitions()),
            tracker,
            config_manager,
            config,
            last_command: None,
            running: true,
        }
    }

    pub fn prompt(&self) -> String {
        "expense> ".into()
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    /// Saves the in-memory configuration.
    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        if let Some(best) = self.registry.suggest(input) {
            output::info(format!("Suggestion: `{best}`?"));
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::App(err) if err.is_rejection() => {
                output::error(err);
                Ok(())
            }
            other => {
                output::error(&other);
                // storage and config faults are not recoverable in script mode
                if self.mode == CliMode::Script {
                    return Err(other.into());
                }
                Ok(())
            }
        }
    }
}
