//! The interactive collector: everything the workflows need from the operator.

use std::collections::VecDeque;
use std::io;

use chrono::{Local, NaiveDateTime};
use thiserror::Error;

use crate::when::{WhenError, parse_when};

/// Collector failures. These end the current command.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The input stream reached its end.
    #[error("input closed")]
    Closed,
    /// Reading from or writing to the terminal failed.
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// Synchronous prompts towards the operator.
///
/// Every call blocks until the operator answers. Date collection is provided
/// on top of [`ask`](Collector::ask) and [`confirm`](Collector::confirm) so
/// that every implementation shows its interpretation and waits for an
/// explicit yes before a date is accepted.
pub trait Collector {
    /// Shows one line of output.
    fn say(&mut self, message: &str) -> Result<(), CollectorError>;

    /// Asks for one line of text, returned without the line terminator.
    fn ask(&mut self, prompt: &str) -> Result<String, CollectorError>;

    /// Runs the do-now countdown. Returns early when the operator interrupts it.
    fn countdown(&mut self, seconds: u64) -> Result<(), CollectorError>;

    /// Asks a yes/no question; any answer containing `y` counts as yes.
    fn confirm(&mut self, prompt: &str) -> Result<bool, CollectorError> {
        let answer = self.ask(prompt)?;
        Ok(answer.to_lowercase().contains('y'))
    }

    /// Asks for a date, repeating until one is parsed and confirmed.
    fn ask_date(&mut self, prompt: &str) -> Result<NaiveDateTime, CollectorError> {
        loop {
            if let Some(when) = collect_date(self, prompt, false)?.into_required() {
                return Ok(when);
            }
        }
    }

    /// Like [`ask_date`](Collector::ask_date), but an empty answer means no date.
    fn ask_optional_date(&mut self, prompt: &str) -> Result<Option<NaiveDateTime>, CollectorError> {
        loop {
            match collect_date(self, prompt, true)? {
                DateAnswer::Accepted(when) => return Ok(Some(when)),
                DateAnswer::Skipped => return Ok(None),
                DateAnswer::Retry => {}
            }
        }
    }
}

enum DateAnswer {
    Accepted(NaiveDateTime),
    Skipped,
    Retry,
}

impl DateAnswer {
    fn into_required(self) -> Option<NaiveDateTime> {
        match self {
            Self::Accepted(when) => Some(when),
            Self::Skipped | Self::Retry => None,
        }
    }
}

/// One parse-then-confirm round.
fn collect_date<C: Collector + ?Sized>(
    collector: &mut C,
    prompt: &str,
    allow_empty: bool,
) -> Result<DateAnswer, CollectorError> {
    let answer = collector.ask(prompt)?;
    let now = Local::now().naive_local();
    match parse_when(&answer, now) {
        Ok(when) => {
            collector.say(&format!("Date/Time: {}", when.format("%c")))?;
            if collector.confirm("Ok? (y/n) ")? {
                Ok(DateAnswer::Accepted(when))
            } else {
                collector.say("Let's try again...")?;
                Ok(DateAnswer::Retry)
            }
        }
        Err(WhenError::Empty) if allow_empty => Ok(DateAnswer::Skipped),
        Err(err) => {
            collector.say(&err.to_string())?;
            Ok(DateAnswer::Retry)
        }
    }
}

/// A collector that answers from a script and records everything it shows.
///
/// Useful for driving the workflows without a terminal.
#[derive(Debug, Default)]
pub struct ScriptedCollector {
    answers: VecDeque<String>,
    /// Prompts and messages in the order they were shown.
    pub transcript: Vec<String>,
    /// Lengths of the countdowns that were run.
    pub countdowns: Vec<u64>,
}

impl ScriptedCollector {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
            countdowns: Vec::new(),
        }
    }

    /// Answers that were never asked for.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    /// Whether any shown line contains `needle`.
    pub fn showed(&self, needle: &str) -> bool {
        self.transcript.iter().any(|line| line.contains(needle))
    }
}

impl Collector for ScriptedCollector {
    fn say(&mut self, message: &str) -> Result<(), CollectorError> {
        self.transcript.push(message.to_string());
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> Result<String, CollectorError> {
        self.transcript.push(prompt.to_string());
        self.answers.pop_front().ok_or(CollectorError::Closed)
    }

    fn countdown(&mut self, seconds: u64) -> Result<(), CollectorError> {
        self.countdowns.push(seconds);
        Ok(())
    }
}
