//! Line-oriented prompts with typed parsing.
//!
//! Parse failures re-prompt instead of aborting; a blank line means "none"
//! for optional inputs. A closed stdin surfaces as `UnexpectedEof` so the
//! retry loops terminate. Readers are generic over `BufRead` so the
//! parsing behavior is testable without a terminal.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

/// Re-prompt until the input is non-empty.
pub fn nonempty(msg: &str) -> io::Result<String> {
    nonempty_from(&mut io::stdin().lock(), msg)
}

/// Re-prompt until the input parses as `T`.
pub fn parse<T: FromStr>(msg: &str) -> io::Result<T> {
    parse_from(&mut io::stdin().lock(), msg)
}

/// Re-prompt until the input is blank (`None`) or parses as `T`.
pub fn parse_opt<T: FromStr>(msg: &str) -> io::Result<Option<T>> {
    parse_opt_from(&mut io::stdin().lock(), msg)
}

fn line_from(input: &mut impl BufRead, msg: &str) -> io::Result<String> {
    print!("{msg} ");
    io::stdout().flush()?;
    let mut buf = String::new();
    let read = input.read_line(&mut buf)?;
    if read == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }
    Ok(buf.trim().to_string())
}

fn nonempty_from(input: &mut impl BufRead, msg: &str) -> io::Result<String> {
    loop {
        let answer = line_from(input, msg)?;
        if !answer.is_empty() {
            return Ok(answer);
        }
        println!("A value is required.");
    }
}

fn parse_from<T: FromStr>(input: &mut impl BufRead, msg: &str) -> io::Result<T> {
    loop {
        let answer = line_from(input, msg)?;
        match answer.parse() {
            Ok(value) => return Ok(value),
            Err(_) => println!("Could not understand {answer:?}, try again."),
        }
    }
}

fn parse_opt_from<T: FromStr>(input: &mut impl BufRead, msg: &str) -> io::Result<Option<T>> {
    loop {
        let answer = line_from(input, msg)?;
        if answer.is_empty() {
            return Ok(None);
        }
        match answer.parse() {
            Ok(value) => return Ok(Some(value)),
            Err(_) => println!("Could not understand {answer:?}, try again (blank for none)."),
        }
    }
}
