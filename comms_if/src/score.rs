//! # Score messages
//!
//! The scorer accepts plain text messages of the form `<team>,<password>,<index>,<payload>`:
//!
//! - index `0` with payload `NA` starts the run timer,
//! - a positive index carries the prediction for the clue with that (1-based) position,
//! - index `-1` with payload `NA` stops the run timer.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Payload used by the start and end markers.
pub const NO_PAYLOAD: &str = "NA";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single message to the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMsg {
    pub team: String,
    pub password: String,
    pub entry: ScoreEntry,
}

/// Credentials identifying the team to the scorer.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamCredentials {
    pub team: String,
    pub password: String,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// What a score message reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScoreEntry {
    /// The mission has started
    Start,

    /// The prediction for the clue at the 1-based `index`
    Clue { index: u32, prediction: String },

    /// The mission has ended
    End,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ScoreParseError {
    #[error("Expected 4 comma separated fields, found {0}")]
    WrongFieldCount(usize),

    #[error("Invalid clue index \"{0}\"")]
    InvalidIndex(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TeamCredentials {
    /// Build a message from these credentials.
    pub fn msg(&self, entry: ScoreEntry) -> ScoreMsg {
        ScoreMsg {
            team: self.team.clone(),
            password: self.password.clone(),
            entry,
        }
    }
}

impl ScoreEntry {
    /// The index field written on the wire.
    pub fn index(&self) -> i64 {
        match self {
            ScoreEntry::Start => 0,
            ScoreEntry::Clue { index, .. } => *index as i64,
            ScoreEntry::End => -1,
        }
    }

    /// The payload field written on the wire.
    pub fn payload(&self) -> &str {
        match self {
            ScoreEntry::Clue { prediction, .. } => prediction,
            _ => NO_PAYLOAD,
        }
    }
}

impl Display for ScoreMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.team,
            self.password,
            self.entry.index(),
            self.entry.payload()
        )
    }
}

impl FromStr for ScoreMsg {
    type Err = ScoreParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.splitn(4, ',').collect();
        if fields.len() != 4 {
            return Err(ScoreParseError::WrongFieldCount(fields.len()));
        }

        let index: i64 = fields[2]
            .trim()
            .parse()
            .map_err(|_| ScoreParseError::InvalidIndex(fields[2].into()))?;

        let entry = match index {
            0 => ScoreEntry::Start,
            -1 => ScoreEntry::End,
            i if i > 0 && i <= u32::MAX as i64 => ScoreEntry::Clue {
                index: i as u32,
                prediction: fields[3].to_string(),
            },
            _ => return Err(ScoreParseError::InvalidIndex(fields[2].into())),
        };

        Ok(ScoreMsg {
            team: fields[0].to_string(),
            password: fields[1].to_string(),
            entry,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn creds() -> TeamCredentials {
        TeamCredentials {
            team: "Broda".into(),
            password: "adorb".into(),
        }
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(creds().msg(ScoreEntry::Start).to_string(), "Broda,adorb,0,NA");
        assert_eq!(creds().msg(ScoreEntry::End).to_string(), "Broda,adorb,-1,NA");
        assert_eq!(
            creds()
                .msg(ScoreEntry::Clue {
                    index: 2,
                    prediction: "TOXINS".into()
                })
                .to_string(),
            "Broda,adorb,2,TOXINS"
        );
    }

    #[test]
    fn test_parse() {
        let msg: ScoreMsg = "Broda,adorb,3,RAIN, MAYBE".parse().unwrap();
        assert_eq!(
            msg.entry,
            ScoreEntry::Clue {
                index: 3,
                prediction: "RAIN, MAYBE".into()
            }
        );
        assert_eq!(msg.to_string(), "Broda,adorb,3,RAIN, MAYBE");

        assert_eq!(
            "Broda,adorb,-1,NA".parse::<ScoreMsg>().unwrap().entry,
            ScoreEntry::End
        );
        assert_eq!(
            "Broda,adorb".parse::<ScoreMsg>(),
            Err(ScoreParseError::WrongFieldCount(2))
        );
        assert!(matches!(
            "Broda,adorb,-4,NA".parse::<ScoreMsg>(),
            Err(ScoreParseError::InvalidIndex(_))
        ));
    }
}
