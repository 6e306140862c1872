//! HTTP notes backend.

use gloo::net::http::{Request, Response};
use map_notes_core::{
    AppError, Note, StorageError, ValidationError,
    wire::{CreateNoteRequest, ErrorBody, NOTES_PATH},
};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteNoteStore {
    url: String,
}

impl RemoteNoteStore {
    pub fn new(api_base: &str) -> Self {
        Self {
            url: format!("{api_base}{NOTES_PATH}"),
        }
    }

    pub async fn list(&self) -> Result<Vec<Note>, StorageError> {
        debug!("notes request: GET {}", self.url);
        let response = Request::get(&self.url)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        if !response.ok() {
            return Err(status_error(response).await);
        }
        response
            .json::<Vec<Note>>()
            .await
            .map_err(|e| StorageError::Decode(e.to_string()))
    }

    /// Creates a note. A 400 answer is a validation failure carrying the
    /// server's message.
    pub async fn create(&self, request: &CreateNoteRequest) -> Result<Note, AppError> {
        debug!("notes request: POST {}", self.url);
        let response = Request::post(&self.url)
            .json(request)
            .map_err(|e| StorageError::Request(e.to_string()))?
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        if response.status() == 400 {
            let message = error_message(response).await;
            return Err(ValidationError::Rejected(message).into());
        }
        if !response.ok() {
            return Err(status_error(response).await.into());
        }
        response
            .json::<Note>()
            .await
            .map_err(|e| StorageError::Decode(e.to_string()).into())
    }
}

async fn error_message(response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text)
}

async fn status_error(response: Response) -> StorageError {
    let status = response.status();
    StorageError::Status {
        status,
        message: error_message(response).await,
    }
}
