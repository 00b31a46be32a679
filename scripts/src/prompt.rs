//! Sources of answers to the questions asked during an upgrade

use std::{
    collections::VecDeque,
    io::{self, BufRead, Write},
};

use tracing::warn;

use crate::{
    constants::{CONFIRM_ANSWER, DECLINE_ANSWER},
    errors::ScriptError,
};

/// A source of answers to free-text questions
pub trait AnswerSource {
    /// Asks a question and returns the trimmed answer
    fn ask(&mut self, question: &str) -> Result<String, ScriptError>;

    /// Asks a yes/no question until it is answered with `y` or `n`
    fn confirm(&mut self, question: &str) -> Result<bool, ScriptError> {
        loop {
            let answer = self.ask(&format!("{question} (y/n)"))?;
            if answer.eq_ignore_ascii_case(CONFIRM_ANSWER) {
                return Ok(true);
            }
            if answer.eq_ignore_ascii_case(DECLINE_ANSWER) {
                return Ok(false);
            }
            warn!("expected `{CONFIRM_ANSWER}` or `{DECLINE_ANSWER}`, got `{answer}`");
        }
    }
}

/// Answers typed by the operator in the terminal
#[derive(Debug, Default)]
pub struct StdinAnswers;

impl AnswerSource for StdinAnswers {
    fn ask(&mut self, question: &str) -> Result<String, ScriptError> {
        print!("{}: ", question);
        io::stdout()
            .flush()
            .map_err(|e| ScriptError::Prompt(e.to_string()))?;

        let mut input = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut input)
            .map_err(|e| ScriptError::Prompt(e.to_string()))?;
        if read == 0 {
            return Err(ScriptError::Prompt("input closed".to_string()));
        }

        Ok(input.trim().to_string())
    }
}

/// A finite queue of pre-resolved answers
#[derive(Debug, Default, Clone)]
pub struct ScriptedAnswers {
    /// The answers not yet given
    answers: VecDeque<String>,
    /// The questions asked so far
    asked: Vec<String>,
}

impl ScriptedAnswers {
    /// Creates a source answering with the given values, in order
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// The questions asked so far
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// The number of answers not yet given
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl AnswerSource for ScriptedAnswers {
    fn ask(&mut self, question: &str) -> Result<String, ScriptError> {
        self.asked.push(question.to_string());
        self.answers
            .pop_front()
            .map(|answer| answer.trim().to_string())
            .ok_or_else(|| ScriptError::Prompt(format!("no answer left for `{question}`")))
    }
}
