use thiserror::Error;

use crate::types::{PersonId, UnitId};

#[derive(Error, Debug)]
pub enum MothballError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid identifier: {0}")]
    Identifier(#[from] uuid::Error),

    #[error("Unit {unit_id} not found")]
    UnitNotFound { unit_id: UnitId },

    #[error("Person {person_id} not found")]
    PersonNotFound { person_id: PersonId },

    #[error("Unit {unit_id} is already mothballed")]
    AlreadyMothballed { unit_id: UnitId },

    #[error("Unit {unit_id} is not mothballed")]
    NotMothballed { unit_id: UnitId },

    #[error("Mothball snapshot for unit {unit_id} still holds unresolved references")]
    UnresolvedSnapshot { unit_id: UnitId },

    #[error("Corrupt stored value '{value}' in column {column}")]
    CorruptRow { column: &'static str, value: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type MothballResult<T> = Result<T, MothballError>;
