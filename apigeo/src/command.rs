//! Lines typed at the terminal.

use anyhow::{anyhow, Context};
use apigeo_search::TerritoryType;
use std::str::FromStr;

/// What a line of input asks for.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// The whole line is the new search text.
    Input(String),
    /// `:select <n>`, 1-based position in the result list.
    Select(usize),
    /// `:type <name>`
    SetTerritoryType(TerritoryType),
    /// `:quit`
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let command = match line.strip_prefix(':') {
            Some(command) => command.trim(),
            None => return Ok(Command::Input(line.to_string())),
        };
        let (name, argument) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(name, argument)| (name, argument.trim()));

        match name {
            "quit" | "q" => Ok(Command::Quit),
            "type" | "t" => Ok(Command::SetTerritoryType(argument.parse()?)),
            "select" | "s" => {
                let position: usize = argument
                    .parse()
                    .context(format!("Not a result position: {:?}", argument))?;
                position
                    .checked_sub(1)
                    .map(Command::Select)
                    .ok_or_else(|| anyhow!("Result positions start at 1"))
            }
            other => Err(anyhow!("Unknown command :{}", other)),
        }
    }
}
