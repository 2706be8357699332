//! Answer codes and their accepted spellings.

use crate::error::EngineError;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};

/// One of the five answers the remote service accepts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    /// Yes.
    #[display("Yes")]
    Yes,
    /// No.
    #[display("No")]
    No,
    /// Don't know.
    #[display("Don't know")]
    DontKnow,
    /// Probably.
    #[display("Probably")]
    Probably,
    /// Probably not.
    #[display("Probably not")]
    ProbablyNot,
}

impl Answer {
    /// Value sent as the `reponse` parameter.
    pub fn wire_value(self) -> u8 {
        match self {
            Answer::Yes => 0,
            Answer::No => 1,
            Answer::DontKnow => 2,
            Answer::Probably => 3,
            Answer::ProbablyNot => 4,
        }
    }

    /// Every spelling that normalizes to this answer, lowercase.
    pub fn spellings(self) -> &'static [&'static str] {
        match self {
            Answer::Yes => &["y", "yes", "0"],
            Answer::No => &["n", "no", "1"],
            Answer::DontKnow => &["?", "idk", "dont know", "don't know", "2"],
            Answer::Probably => &["+", "p", "probably", "3"],
            Answer::ProbablyNot => &["-", "pn", "probably not", "not really", "4"],
        }
    }

    /// Single-key shortcut shown in legends.
    pub fn key(self) -> char {
        match self {
            Answer::Yes => 'y',
            Answer::No => 'n',
            Answer::DontKnow => '?',
            Answer::Probably => '+',
            Answer::ProbablyNot => '-',
        }
    }
}

/// A normalized answer code: an answer or one of the two control verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum AnswerCode {
    /// Answer the current question.
    #[display("{}", _0)]
    Answer(Answer),
    /// Undo the last answer.
    #[display("Back")]
    Back,
    /// Start a new game.
    #[display("Start")]
    Start,
}

impl FromStr for AnswerCode {
    type Err = EngineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "b" | "back" => return Ok(AnswerCode::Back),
            "s" | "start" => return Ok(AnswerCode::Start),
            _ => {}
        }
        Answer::iter()
            .find(|answer| answer.spellings().contains(&normalized.as_str()))
            .map(AnswerCode::Answer)
            .ok_or_else(|| {
                EngineError::invalid_answer(format!(
                    "unrecognized answer {:?}; use y, n, ?, +, - or b",
                    raw
                ))
            })
    }
}

impl FromStr for Answer {
    type Err = EngineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.parse::<AnswerCode>()? {
            AnswerCode::Answer(answer) => Ok(answer),
            other => Err(EngineError::invalid_answer(format!(
                "{} is a control verb, not an answer",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_aliases_normalize() {
        assert_eq!("y".parse::<Answer>().unwrap(), Answer::Yes);
        assert_eq!(" N ".parse::<Answer>().unwrap(), Answer::No);
        assert_eq!("?".parse::<Answer>().unwrap(), Answer::DontKnow);
        assert_eq!("Probably".parse::<Answer>().unwrap(), Answer::Probably);
        assert_eq!("probably not".parse::<Answer>().unwrap(), Answer::ProbablyNot);
        assert_eq!("4".parse::<Answer>().unwrap(), Answer::ProbablyNot);
    }

    #[test]
    fn test_control_verbs() {
        assert_eq!("b".parse::<AnswerCode>().unwrap(), AnswerCode::Back);
        assert_eq!("START".parse::<AnswerCode>().unwrap(), AnswerCode::Start);
        let err = "back".parse::<Answer>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAnswer);
    }

    #[test]
    fn test_unknown_code_rejected() {
        let err = "maybe".parse::<AnswerCode>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAnswer);
        assert!(err.message().contains("maybe"));
    }

    #[test]
    fn test_spellings_are_disjoint() {
        let all: Vec<&str> = Answer::iter().flat_map(|a| a.spellings().iter().copied()).collect();
        let mut deduped = all.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(all.len(), deduped.len());
    }
}
