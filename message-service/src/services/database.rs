use crate::config::{redact_uri, StoreSettings};
use crate::error::MessageError;
use crate::services::store::{Listing, MessageStore, StoreConnector};
use async_trait::async_trait;
use futures::stream::StreamExt;
use mongodb::{
    bson::{doc, Document},
    options::ClientOptions,
    Client as MongoClient, Database,
};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Opens a fresh MongoDB client for every invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoConnector;

#[async_trait]
impl StoreConnector for MongoConnector {
    async fn connect(
        &self,
        settings: &StoreSettings,
    ) -> Result<Box<dyn MessageStore>, MessageError> {
        let store = MongoStore::connect(settings).await?;
        Ok(Box::new(store))
    }
}

pub struct MongoStore {
    client: MongoClient,
    db: Database,
}

impl MongoStore {
    pub async fn connect(settings: &StoreSettings) -> Result<Self, MessageError> {
        let uri = settings.credentials.resolve().await.map_err(|e| {
            MessageError::Connection(
                anyhow::Error::new(e).context("failed to read store credentials"),
            )
        })?;

        tracing::debug!(
            uri = %redact_uri(&uri),
            project_id = %settings.project_id,
            "Connecting to document store"
        );

        let mut options = ClientOptions::parse(uri.expose_secret().as_str())
            .await
            .map_err(|e| MessageError::Connection(anyhow::Error::new(e)))?;
        let timeout = Duration::from_millis(settings.connect_timeout_ms);
        options.app_name = Some(settings.app_name.clone());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = MongoClient::with_options(options)
            .map_err(|e| MessageError::Connection(anyhow::Error::new(e)))?;
        let db = client.database(&settings.project_id);

        // Client construction is lazy; ping so unreachable stores and bad
        // credentials fail at acquisition.
        if let Err(e) = db.run_command(doc! { "ping": 1 }, None).await {
            drop(db);
            client.shutdown().await;
            return Err(MessageError::Connection(anyhow::Error::new(e)));
        }

        tracing::debug!(database = %settings.project_id, "Connected to document store");
        Ok(Self { client, db })
    }
}

#[async_trait]
impl MessageStore for MongoStore {
    async fn list_documents(&self, collection: &str) -> Listing {
        let mut listing = Listing::default();

        let mut cursor = match self
            .db
            .collection::<Document>(collection)
            .find(None, None)
            .await
        {
            Ok(cursor) => cursor,
            Err(e) => {
                tracing::warn!(collection = %collection, error = %e, "Failed to open cursor");
                listing.truncated = true;
                return listing;
            }
        };

        while let Some(next) = cursor.next().await {
            match next {
                Ok(document) => listing.documents.push(document),
                Err(e) => {
                    tracing::warn!(
                        collection = %collection,
                        read = listing.documents.len(),
                        error = %e,
                        "Cursor failed mid-enumeration"
                    );
                    listing.truncated = true;
                    break;
                }
            }
        }

        listing
    }

    async fn add_document(&self, collection: &str, document: Document) -> Result<(), MessageError> {
        let result = self
            .db
            .collection::<Document>(collection)
            .insert_one(document, None)
            .await
            .map_err(|e| MessageError::StoreWrite(anyhow::Error::new(e)))?;

        tracing::debug!(collection = %collection, id = %result.inserted_id, "Inserted document");
        Ok(())
    }

    async fn close(self: Box<Self>) {
        let MongoStore { client, db } = *self;
        drop(db);
        client.shutdown().await;
    }
}
