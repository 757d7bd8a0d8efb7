//! Store handle abstraction.
//!
//! A handle is opened per invocation through a [`StoreConnector`] and must be
//! closed with [`MessageStore::close`] before the invocation returns.

use crate::config::StoreSettings;
use crate::error::MessageError;
use async_trait::async_trait;
use mongodb::bson::Document;

/// Result of enumerating a collection.
#[derive(Debug, Default)]
pub struct Listing {
    pub documents: Vec<Document>,
    /// Set when enumeration stopped on a store error; `documents` then holds
    /// whatever was read before the failure.
    pub truncated: bool,
}

#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Open a handle to the namespace named in `settings`, or fail with
    /// [`MessageError::Connection`].
    async fn connect(
        &self,
        settings: &StoreSettings,
    ) -> Result<Box<dyn MessageStore>, MessageError>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Every document currently in `collection`, in store order.
    async fn list_documents(&self, collection: &str) -> Listing;

    async fn add_document(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<(), MessageError>;

    async fn close(self: Box<Self>);
}
