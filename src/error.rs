use std::io;

use thiserror::Error;

/// Failures inside the simulation itself.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("no free interior cell left to place food on")]
    NoFreeCell,
}

/// Malformed or truncated save data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("save data ended before field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("field `{field}` has an out of range value {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("snake body declares {expected} segments but only {found} could be read")]
    TruncatedBody { expected: usize, found: usize },

    #[error("snake body must have at least one segment")]
    EmptyBody,

    #[error("heading ({0}, {1}) is not a unit vector")]
    InvalidHeading(i32, i32),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read save file: {0}")]
    Io(#[from] io::Error),

    #[error("save file is malformed: {0}")]
    Malformed(#[from] CodecError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] io::Error),

    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
