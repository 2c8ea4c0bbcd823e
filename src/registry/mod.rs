//! Reads and writes against the users, documents and organizations tables.
//!
//! Every function takes the request's connection; multi-statement operations
//! open their own transaction so a failure leaves nothing behind.

pub mod documents;
pub mod ingest;
pub mod users;

use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::Document;
use crate::payload::DocumentData;

/// A stored document as returned to clients.
#[derive(Debug, Serialize)]
pub struct DocumentView {
    pub id: i32,
    pub type_id: Option<i32>,
    pub data: DocumentData,
}

impl TryFrom<Document> for DocumentView {
    type Error = AppError;

    fn try_from(document: Document) -> AppResult<Self> {
        let data = stored_payload(&document)?;
        Ok(Self {
            id: document.id,
            type_id: document.type_id,
            data,
        })
    }
}

pub(crate) fn stored_payload(document: &Document) -> AppResult<DocumentData> {
    let text = document
        .data
        .as_deref()
        .ok_or_else(|| AppError::internal(format!("document {} has no payload", document.id)))?;
    DocumentData::from_stored(text).map_err(|err| {
        AppError::internal(format!("document {} payload is unreadable: {err}", document.id))
    })
}
