use std::str::FromStr;

use thiserror::Error;

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Tap a preset button.
    Preset(u32),
    /// Replace the custom amount field; empty clears it.
    Amount(String),
    /// Choose a payment method.
    Method(String),
    Pay,
    Back,
    Cancel,
    /// Hide the error banner.
    Dismiss,
    /// Change the log filter.
    Log(String),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{command}' needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("invalid preset id '{0}'")]
    InvalidPreset(String),
}

pub const HELP: &str = "\
commands:
  preset <id>      select a suggested tip
  amount [value]   type a custom tip (no value clears the field)
  method <name>    choose the payment method
  pay              send the tip
  back             leave the success screen
  cancel           close the tipping screen
  dismiss          hide the error banner
  log <level>      change the log filter (e.g. debug, warn)
  help             show this list
  quit             exit";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "preset" | "p" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "preset",
                        what: "an id",
                    });
                }
                rest.parse()
                    .map(Command::Preset)
                    .map_err(|_| CommandError::InvalidPreset(rest.to_string()))
            }
            "amount" | "a" => Ok(Command::Amount(rest.to_string())),
            "method" | "m" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "method",
                        what: "a payment method name",
                    });
                }
                Ok(Command::Method(rest.to_string()))
            }
            "pay" => Ok(Command::Pay),
            "back" => Ok(Command::Back),
            "cancel" => Ok(Command::Cancel),
            "dismiss" => Ok(Command::Dismiss),
            "log" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "log",
                        what: "a level",
                    });
                }
                Ok(Command::Log(rest.to_string()))
            }
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(word.to_string())),
        }
    }
}
