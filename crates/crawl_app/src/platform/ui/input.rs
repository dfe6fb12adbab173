use crawl_core::Msg;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  keywords <text>   set keywords (comma or newline separated)
  pages <n>         pages to crawl per keyword
  save on|off       ask the server to persist results
  start             submit the task
  cancel            ask the server to stop the current task
  play <row>        open a result row by its number
  help              show this list
  quit              exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Msg(Msg),
    Help,
    Quit,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown command `{0}`, type `help` for the list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

pub fn parse_command(line: &str) -> Result<Command, InputError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "" => Command::Blank,
        "keywords" => Command::Msg(Msg::KeywordsChanged(rest.to_string())),
        "pages" => Command::Msg(Msg::MaxPagesChanged(rest.to_string())),
        "save" => match rest.to_ascii_lowercase().as_str() {
            "on" => Command::Msg(Msg::PersistToggled(true)),
            "off" => Command::Msg(Msg::PersistToggled(false)),
            _ => return Err(InputError::Usage("save on|off")),
        },
        "start" => Command::Msg(Msg::SubmitClicked),
        "cancel" => Command::Msg(Msg::CancelClicked),
        "play" => {
            // Rows are shown 1-based.
            let row = rest
                .parse::<usize>()
                .ok()
                .and_then(|row| row.checked_sub(1))
                .ok_or(InputError::Usage("play <row>"))?;
            Command::Msg(Msg::PlayRequested { row })
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err(InputError::Unknown(word.to_string())),
    };
    Ok(command)
}
