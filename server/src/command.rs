//! Command line tokenizer and parser
//!
//! Turns one raw protocol line into a [`Command`]. Tokens are separated by
//! runs of whitespace and the verb is matched case-insensitively. Every parse
//! failure maps to `INVALID_FORMAT` on the wire.

use crate::board::NoteFilter;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("POST requires: <x> <y> <color> <message>")]
    PostArguments,
    #[error("Coordinates must be valid integers")]
    InvalidCoordinate,
    #[error("{0} requires: <x> <y>")]
    CoordinateArguments(&'static str),
    #[error("{0} takes no parameters")]
    UnexpectedArguments(&'static str),
    #[error("Unknown GET filter: {0}")]
    UnknownFilter(String),
    #[error("Duplicate GET filter: {0}")]
    DuplicateFilter(&'static str),
    #[error("Missing value for GET filter: {0}")]
    MissingFilterValue(&'static str),
}

/// One parsed protocol command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Post {
        x: i64,
        y: i64,
        color: String,
        message: String,
    },
    Get(NoteFilter),
    GetPins,
    Pin {
        x: i64,
        y: i64,
    },
    Unpin {
        x: i64,
        y: i64,
    },
    Shake,
    Clear,
    Disconnect,
}

impl Command {
    /// Parses a raw line
    ///
    /// Returns `Ok(None)` for blank lines, which get no response at all.
    pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((verb, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let verb = verb.to_uppercase();
        let command = match verb.as_str() {
            "POST" => parse_post(args)?,
            "GET" => parse_get(args)?,
            "PIN" => {
                let (x, y) = parse_coordinates("PIN", args)?;
                Command::Pin { x, y }
            }
            "UNPIN" => {
                let (x, y) = parse_coordinates("UNPIN", args)?;
                Command::Unpin { x, y }
            }
            "SHAKE" => no_arguments("SHAKE", args, Command::Shake)?,
            "CLEAR" => no_arguments("CLEAR", args, Command::Clear)?,
            "DISCONNECT" => no_arguments("DISCONNECT", args, Command::Disconnect)?,
            _ => return Err(ParseError::UnknownCommand(verb)),
        };

        Ok(Some(command))
    }
}

fn parse_int(token: &str) -> Result<i64, ParseError> {
    token
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidCoordinate)
}

fn parse_post(args: &[&str]) -> Result<Command, ParseError> {
    if args.len() < 4 {
        return Err(ParseError::PostArguments);
    }

    Ok(Command::Post {
        x: parse_int(args[0])?,
        y: parse_int(args[1])?,
        color: args[2].to_lowercase(),
        message: args[3..].join(" "),
    })
}

fn parse_coordinates(verb: &'static str, args: &[&str]) -> Result<(i64, i64), ParseError> {
    match args {
        [x, y] => Ok((parse_int(x)?, parse_int(y)?)),
        _ => Err(ParseError::CoordinateArguments(verb)),
    }
}

fn no_arguments(
    verb: &'static str,
    args: &[&str],
    command: Command,
) -> Result<Command, ParseError> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(ParseError::UnexpectedArguments(verb))
    }
}

/// Splits `key=value` with a case-insensitive key match
fn filter_value<'a>(token: &'a str, key: &str) -> Option<&'a str> {
    let (name, value) = token.split_once('=')?;
    name.eq_ignore_ascii_case(key).then_some(value)
}

fn parse_get(args: &[&str]) -> Result<Command, ParseError> {
    if let [keyword] = args {
        if keyword.eq_ignore_ascii_case("PINS") {
            return Ok(Command::GetPins);
        }
    }

    let mut filter = NoteFilter::default();
    let mut index = 0;

    while index < args.len() {
        let token = args[index];
        index += 1;

        if let Some(value) = filter_value(token, "color") {
            if filter.color.is_some() {
                return Err(ParseError::DuplicateFilter("color"));
            }
            if value.is_empty() {
                return Err(ParseError::MissingFilterValue("color"));
            }
            filter.color = Some(value.to_string());
        } else if let Some(value) = filter_value(token, "contains") {
            if filter.contains.is_some() {
                return Err(ParseError::DuplicateFilter("contains"));
            }
            // x may be glued to the key (`contains=10 10`) or stand alone (`contains= 10 10`)
            let x = if value.is_empty() {
                let x = args
                    .get(index)
                    .ok_or(ParseError::MissingFilterValue("contains"))?;
                index += 1;
                *x
            } else {
                value
            };
            let y = args
                .get(index)
                .ok_or(ParseError::MissingFilterValue("contains"))?;
            index += 1;
            filter.contains = Some((parse_int(x)?, parse_int(y)?));
        } else if let Some(value) = filter_value(token, "refersTo") {
            if filter.refers_to.is_some() {
                return Err(ParseError::DuplicateFilter("refersTo"));
            }
            // refersTo swallows the rest of the line
            let mut words: Vec<&str> = Vec::with_capacity(args.len() - index + 1);
            if !value.is_empty() {
                words.push(value);
            }
            words.extend_from_slice(&args[index..]);
            index = args.len();

            if words.is_empty() {
                return Err(ParseError::MissingFilterValue("refersTo"));
            }
            filter.refers_to = Some(words.join(" "));
        } else {
            return Err(ParseError::UnknownFilter(token.to_string()));
        }
    }

    Ok(Command::Get(filter))
}
