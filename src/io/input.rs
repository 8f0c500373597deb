//! Prompted line readers over generic `BufRead`/`Write` pairs.
//!
//! Each reader loops until it gets a valid value: parse failures and
//! out-of-bounds values print a descriptive message (naming the violated
//! bound) and re-prompt. An empty line yields the default when one is given.
//! EOF surfaces as [`CalcError::Eof`] so the REPL can exit cleanly.

use std::io::{BufRead, BufReader, Stdin, Stdout, Write, stdin, stdout};

use crate::error::{CalcError, CalcResult};

pub struct Console<R, W> {
    reader: R,
    writer: W,
}

impl Console<BufReader<Stdin>, Stdout> {
    /// Console over the process's real stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(stdin()), stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Direct access to the output side, for the REPL's explanatory prose.
    pub fn writer(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Print the prompt (no trailing newline) and read one trimmed line.
    fn prompt_line(&mut self, prompt: &str) -> CalcResult<String> {
        write!(self.writer, "{prompt}")?;
        self.writer.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(CalcError::Eof);
        }
        Ok(line.trim().to_string())
    }

    /// Read an integer, re-prompting until one within bounds is entered.
    pub fn read_int(
        &mut self,
        prompt: &str,
        default: Option<i64>,
        least: Option<i64>,
        most: Option<i64>,
    ) -> CalcResult<i64> {
        loop {
            let line = self.prompt_line(prompt)?;
            if line.is_empty() {
                if let Some(value) = default {
                    return Ok(value);
                }
            }
            let value = match line.parse::<i64>() {
                Ok(value) => value,
                Err(_) => {
                    writeln!(self.writer, "Invalid input. Please enter an integer.")?;
                    continue;
                }
            };
            if let Some(least) = least
                && value < least
            {
                writeln!(
                    self.writer,
                    "The value you entered, {value}, is below the minimum acceptable value of {least}. Please try again."
                )?;
                continue;
            }
            if let Some(most) = most
                && value > most
            {
                writeln!(
                    self.writer,
                    "The value you entered, {value}, is above the maximum acceptable value of {most}. Please try again."
                )?;
                continue;
            }
            return Ok(value);
        }
    }

    /// Read a float, re-prompting until one within bounds is entered.
    pub fn read_float(
        &mut self,
        prompt: &str,
        default: Option<f64>,
        least: Option<f64>,
        most: Option<f64>,
    ) -> CalcResult<f64> {
        loop {
            let line = self.prompt_line(prompt)?;
            if line.is_empty() {
                if let Some(value) = default {
                    return Ok(value);
                }
            }
            let value = match line.parse::<f64>() {
                Ok(value) => value,
                Err(_) => {
                    writeln!(
                        self.writer,
                        "Invalid input. Please enter a floating point value."
                    )?;
                    continue;
                }
            };
            if let Some(least) = least
                && value < least
            {
                writeln!(
                    self.writer,
                    "The value you entered, {value}, is below the minimum acceptable value of {least}. Please try again."
                )?;
                continue;
            }
            if let Some(most) = most
                && value > most
            {
                writeln!(
                    self.writer,
                    "The value you entered, {value}, is above the maximum acceptable value of {most}. Please try again."
                )?;
                continue;
            }
            return Ok(value);
        }
    }

    /// Read a yes/no answer. Accepts y/yes/n/no in any case; an empty line
    /// yields the default.
    pub fn read_yes_no(&mut self, prompt: &str, default: bool) -> CalcResult<bool> {
        loop {
            let line = self.prompt_line(prompt)?.to_lowercase();
            match line.as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.writer, "Invalid input. Please enter either Y or N.")?,
            }
        }
    }
}
