//! The `/messages` entry point.
//!
//! One call is one invocation: dispatch on the method, open a store handle,
//! run a single store operation, close the handle, render the response.

use crate::error::MessageError;
use crate::models::{documents_to_json, Message, NewMessage};
use crate::services::metrics;
use crate::services::MessageStore;
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;

/// Set to `true` when the listing stopped early on a store error.
pub const PARTIAL_RESULT_HEADER: &str = "x-partial-result";

pub async fn handle_messages(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Response {
    let (operation, result) = match method {
        Method::GET => ("list_messages", list_messages(&state).await),
        Method::POST => ("add_message", add_message(&state, &body).await),
        other => ("dispatch", Err(MessageError::MethodNotAllowed(other))),
    };

    match result {
        Ok(response) => response,
        Err(err) => {
            if err.status_code().is_server_error() {
                tracing::error!(operation, kind = err.kind(), error = %err, "Invocation failed");
            } else {
                tracing::warn!(operation, kind = err.kind(), error = %err, "Request rejected");
            }
            metrics::record_failure(operation, err.kind());
            err.into_response()
        }
    }
}

async fn list_messages(state: &AppState) -> Result<Response, MessageError> {
    let store = state.connector.connect(&state.store).await?;
    let listing = store.list_documents(&state.store.collection).await;
    store.close().await;

    let count = listing.documents.len();
    metrics::record_listed(count, listing.truncated);

    let body = documents_to_json(listing.documents)
        .and_then(|value| Ok(serde_json::to_string(&value)?))
        .map_err(MessageError::Serialize)?;

    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response();

    if listing.truncated {
        tracing::warn!(count, "Returning partial message listing");
        response
            .headers_mut()
            .insert(PARTIAL_RESULT_HEADER, HeaderValue::from_static("true"));
    }

    Ok(response)
}

async fn add_message(state: &AppState, body: &[u8]) -> Result<Response, MessageError> {
    let store = state.connector.connect(&state.store).await?;
    let result = write_message(store.as_ref(), &state.store.collection, body).await;
    store.close().await;
    result?;

    metrics::record_created();
    Ok((
        StatusCode::CREATED,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Message added successfully",
    )
        .into_response())
}

async fn write_message(
    store: &dyn MessageStore,
    collection: &str,
    body: &[u8],
) -> Result<(), MessageError> {
    let new_message = NewMessage::from_body(body)?;
    let message = Message::new(new_message.message, Utc::now());
    let document = message
        .to_document()
        .map_err(|e| MessageError::Serialize(anyhow::Error::new(e)))?;

    store.add_document(collection, document).await
}
