//! Session commands typed at the prompt.

use std::path::PathBuf;

use wordlens_core::{Msg, SortOrder};

pub const HELP: &str = "\
commands:
  page N | next | prev        move between result pages
  query [TEXT]                search terms (empty clears the search)
  sort count_desc|count_asc|alpha
  min N                       hide terms shorter than N characters
  inspect TERM | close        open or close the occurrence panel
  mark N                      toggle the mark on occurrence N of the open panel
  add WORD                    add a word to the dictionary
  words                       list dictionary words
  remove WORD, then yes|no    remove a word from the dictionary
  open FILE                   analyse another document
  help | quit";

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Dispatch(Msg),
    Open(PathBuf),
    Help,
    Quit,
}

/// Parses one line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Input>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let msg = match command {
        "help" | "?" => return Ok(Some(Input::Help)),
        "quit" | "exit" => return Ok(Some(Input::Quit)),
        "open" => return Ok(Some(Input::Open(PathBuf::from(required(rest, "open FILE")?)))),
        "page" => Msg::PageRequested(number(rest, "page N")?),
        "next" => Msg::NextPage,
        "prev" => Msg::PrevPage,
        "query" => Msg::QueryChanged(rest.to_string()),
        "sort" => Msg::SortChanged(rest.parse::<SortOrder>()?),
        "min" => Msg::MinLengthChanged(number(rest, "min N")?),
        "inspect" => Msg::TermInspected(required(rest, "inspect TERM")?.to_string()),
        "close" => Msg::InspectionClosed,
        "mark" => {
            let position = number(rest, "mark N")?;
            if position == 0 {
                return Err("occurrences are numbered from 1".to_string());
            }
            Msg::MarkToggleRequested {
                index: position - 1,
            }
        }
        "add" => Msg::AddWordRequested(required(rest, "add WORD")?.to_string()),
        "words" => Msg::WordsRequested,
        "remove" => Msg::RemoveWordRequested(required(rest, "remove WORD")?.to_string()),
        "yes" | "y" => Msg::RemoveWordConfirmed,
        "no" | "n" => Msg::RemoveWordCancelled,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(Input::Dispatch(msg)))
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(rest)
    }
}

fn number(rest: &str, usage: &str) -> Result<usize, String> {
    required(rest, usage)?
        .parse()
        .map_err(|_| format!("usage: {usage}"))
}
