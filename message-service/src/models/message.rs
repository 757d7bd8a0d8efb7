use crate::error::MessageError;
use chrono::{DateTime, Utc};
use mongodb::bson::{self, Document};
use serde::{Deserialize, Serialize};

/// A stored message. `createdAt` is always assigned by the service at write
/// time and persisted as a BSON datetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub message: String,
    #[serde(
        rename = "createdAt",
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(message: String, created_at: DateTime<Utc>) -> Self {
        Self {
            message,
            created_at,
        }
    }

    pub fn to_document(&self) -> Result<Document, bson::ser::Error> {
        bson::to_document(self)
    }
}

/// Body of a POST. Any other fields in the payload are ignored.
#[derive(Debug, Deserialize)]
pub struct NewMessage {
    pub message: String,
}

impl NewMessage {
    pub fn from_body(body: &[u8]) -> Result<Self, MessageError> {
        Ok(serde_json::from_slice(body)?)
    }
}
