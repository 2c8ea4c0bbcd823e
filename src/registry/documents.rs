use chrono::Utc;
use diesel::{pg::PgConnection, prelude::*};
use serde::Deserialize;

use super::stored_payload;
use crate::error::{AppError, AppResult};
use crate::models::{Document, ACTIVE, DELETED};
use crate::payload::DocumentData;
use crate::schema::documents;
use crate::validation::{check_document_fields, check_document_type, validate_document, ValidationResult};

/// Partial update of a stored document. Only truthy fields in `data` replace
/// what is stored.
#[derive(Debug, Deserialize)]
pub struct DocumentUpdate {
    pub id: i32,
    #[serde(rename = "documentType_id", default)]
    pub document_type_id: Option<i32>,
    #[serde(flatten)]
    pub data: DocumentData,
}

impl DocumentUpdate {
    pub fn validate(&self) -> ValidationResult {
        if let Some(type_id) = self.document_type_id {
            check_document_type(type_id)?;
        }
        check_document_fields(&self.data)
    }
}

/// Soft-deletes one active document. `owner` restricts the match to that
/// user's documents; nothing matching is reported as not found.
pub fn soft_delete_document(
    conn: &mut PgConnection,
    document_id: i32,
    owner: Option<i32>,
    modifier_id: i32,
) -> AppResult<()> {
    let now = Utc::now().naive_utc();
    let active = documents::table
        .filter(documents::id.eq(document_id))
        .filter(documents::deleted.eq(ACTIVE));

    let deleted = match owner {
        Some(owner_id) => diesel::update(active.filter(documents::user_id.eq(owner_id)))
            .set((
                documents::deleted.eq(DELETED),
                documents::modify_datetime.eq(now),
                documents::modify_user_id.eq(modifier_id),
            ))
            .execute(conn)?,
        None => diesel::update(active)
            .set((
                documents::deleted.eq(DELETED),
                documents::modify_datetime.eq(now),
                documents::modify_user_id.eq(modifier_id),
            ))
            .execute(conn)?,
    };

    if deleted == 0 {
        return Err(AppError::NotFound("document"));
    }

    tracing::info!(document_id, modifier_id, "document soft-deleted");
    Ok(())
}

/// Merges `update` into the stored payload, re-checks the per-type rules
/// against the merged result and writes it back.
pub fn update_document(
    conn: &mut PgConnection,
    update: &DocumentUpdate,
    owner: Option<i32>,
    modifier_id: i32,
) -> AppResult<()> {
    update.validate()?;

    conn.transaction::<_, AppError, _>(|conn| {
        let mut query = documents::table
            .filter(documents::id.eq(update.id))
            .filter(documents::deleted.eq(ACTIVE))
            .select(Document::as_select())
            .into_boxed();
        if let Some(owner_id) = owner {
            query = query.filter(documents::user_id.eq(owner_id));
        }
        let document: Document = query
            .first(conn)
            .optional()?
            .ok_or(AppError::NotFound("document"))?;

        let type_id = update
            .document_type_id
            .or(document.type_id)
            .ok_or_else(|| AppError::validation(format!("document {} has no type", document.id)))?;

        let merged = stored_payload(&document)?.merged_with(&update.data)?;
        validate_document(document.id, &merged, type_id)?;

        diesel::update(documents::table.find(document.id))
            .set((
                documents::type_id.eq(type_id),
                documents::data.eq(merged.to_stored()?),
                documents::modify_datetime.eq(Utc::now().naive_utc()),
                documents::modify_user_id.eq(modifier_id),
            ))
            .execute(conn)?;

        tracing::info!(document_id = document.id, type_id, modifier_id, "document updated");
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::DocumentUpdate;
    use crate::payload::Code;

    #[test]
    fn update_keeps_unknown_keys_in_the_payload() {
        let update: DocumentUpdate = serde_json::from_value(json!({
            "id": 5,
            "number": "654321",
            "issuerCode": "770-001"
        }))
        .unwrap();
        assert_eq!(update.id, 5);
        assert_eq!(update.document_type_id, None);
        assert_eq!(update.data.number, Code::Text("654321".into()));
        assert!(update.data.extra.contains_key("issuerCode"));
        assert!(!update.data.extra.contains_key("id"));
        assert!(update.validate().is_ok());
    }

    #[test]
    fn update_rejects_unknown_types_and_empty_strings() {
        let update: DocumentUpdate = serde_json::from_value(json!({
            "id": 5,
            "documentType_id": 8,
            "number": "1"
        }))
        .unwrap();
        assert!(update.validate().is_err());

        let update: DocumentUpdate = serde_json::from_value(json!({
            "id": 5,
            "number": "1",
            "orgDep_Name": ""
        }))
        .unwrap();
        assert!(update.validate().is_err());
    }

    #[test]
    fn number_is_required_on_update() {
        let parsed = serde_json::from_value::<DocumentUpdate>(json!({"id": 5}));
        assert!(parsed.is_err());
    }
}
