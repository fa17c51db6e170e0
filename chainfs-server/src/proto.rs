//! Line protocol: one command per request line, one `SUCCESS:`/`ERROR:` line
//! (or a listing) per response. This module is the only place error kinds
//! become user-visible text.

use chainfs::FsError;

#[derive(Debug, PartialEq)]
pub enum Command<'a> {
    Create(&'a str),
    List,
    Read(&'a str),
    Write(&'a str, &'a str),
    Delete(&'a str),
    Quit,
}

#[derive(Debug, PartialEq)]
pub enum ParseError {
    Empty,
    MissingFilename,
    UnknownCommand,
}

impl ParseError {
    pub fn response(&self) -> &'static str {
        match self {
            ParseError::Empty | ParseError::UnknownCommand => "ERROR: Unknown command.",
            ParseError::MissingFilename => "ERROR: missing filename",
        }
    }
}

/// Splits a request line into its command. The command word is
/// case-insensitive; for `WRITE` everything after the filename's first
/// trailing space is payload, verbatim.
pub fn parse(line: &str) -> Result<Command<'_>, ParseError> {
    let line = line.trim();
    let (word, rest) = match line.find(char::is_whitespace) {
        Some(at) => (&line[..at], line[at..].trim_start()),
        None => (line, ""),
    };

    match word.to_ascii_uppercase().as_str() {
        "" => Err(ParseError::Empty),
        "LIST" => Ok(Command::List),
        "QUIT" => Ok(Command::Quit),
        "CREATE" | "READ" | "WRITE" | "DELETE" if rest.is_empty() => {
            Err(ParseError::MissingFilename)
        }
        "CREATE" => Ok(Command::Create(rest)),
        "READ" => Ok(Command::Read(rest)),
        "DELETE" => Ok(Command::Delete(rest)),
        "WRITE" => {
            let (name, data) = match rest.find(' ') {
                Some(at) => (&rest[..at], &rest[at + 1..]),
                None => (rest, ""),
            };
            Ok(Command::Write(name, data))
        }
        _ => Err(ParseError::UnknownCommand),
    }
}

/// Response line for a failed engine call.
pub fn error_response(err: &FsError) -> String {
    format!("ERROR: {}", err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command_word() {
        assert_eq!(parse("CREATE a.txt"), Ok(Command::Create("a.txt")));
        assert_eq!(parse("LIST"), Ok(Command::List));
        assert_eq!(parse("READ a.txt"), Ok(Command::Read("a.txt")));
        assert_eq!(parse("DELETE a.txt"), Ok(Command::Delete("a.txt")));
        assert_eq!(parse("QUIT"), Ok(Command::Quit));
    }

    #[test]
    fn command_word_is_case_insensitive() {
        assert_eq!(parse("create a.txt"), Ok(Command::Create("a.txt")));
        assert_eq!(parse("Write a.txt hi"), Ok(Command::Write("a.txt", "hi")));
    }

    #[test]
    fn write_payload_is_everything_after_the_name() {
        assert_eq!(
            parse("WRITE a.txt hello world  "),
            Ok(Command::Write("a.txt", "hello world"))
        );
        assert_eq!(parse("WRITE a.txt"), Ok(Command::Write("a.txt", "")));
    }

    #[test]
    fn missing_filename_is_its_own_error() {
        assert_eq!(parse("CREATE"), Err(ParseError::MissingFilename));
        assert_eq!(parse("READ  "), Err(ParseError::MissingFilename));
    }

    #[test]
    fn unknown_and_empty_lines_are_rejected() {
        assert_eq!(parse("FORMAT a.txt"), Err(ParseError::UnknownCommand));
        assert_eq!(parse("   "), Err(ParseError::Empty));
    }

    #[test]
    fn error_kinds_map_to_response_lines() {
        assert_eq!(
            error_response(&FsError::FileNotFound("a.txt".to_string())),
            "ERROR: file a.txt does not exist"
        );
        assert_eq!(
            error_response(&FsError::InsufficientSpace),
            "ERROR: not enough free space"
        );
    }
}
