//! Field and document rules applied to everything a sender submits.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::payload::{Code, DocumentData};
use crate::types::DocumentType;

pub const SNILS_LENGTH: usize = 11;
pub const INN_LENGTH: usize = 12;

static OID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-2](\.[1-9]{1,7}){1,7}$").expect("valid OID pattern"));

static REFERRAL_GUID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{18}:[A-Z0-9]{6}$").expect("valid referral GUID pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type ValidationResult<T = ()> = Result<T, ValidationError>;

/// Absent is fine, an empty string is not.
pub fn not_empty(field: &str, value: Option<&str>) -> ValidationResult {
    match value {
        Some("") => Err(ValidationError::new(format!("{field} must not be empty"))),
        _ => Ok(()),
    }
}

pub fn not_empty_code(field: &str, value: Option<&Code>) -> ValidationResult {
    match value {
        Some(code) if code.is_empty_text() => {
            Err(ValidationError::new(format!("{field} must not be empty")))
        }
        _ => Ok(()),
    }
}

pub fn exact_length(field: &str, value: Option<&Code>, length: usize) -> ValidationResult {
    match value {
        Some(code) if code.char_len() != length => Err(ValidationError::new(format!(
            "{field} must be exactly {length} characters long"
        ))),
        _ => Ok(()),
    }
}

pub fn check_snils(value: Option<&Code>) -> ValidationResult {
    exact_length("snils", value, SNILS_LENGTH)
}

pub fn check_inn(value: Option<&Code>) -> ValidationResult {
    exact_length("inn", value, INN_LENGTH)
}

pub fn check_oid(oid: &str) -> ValidationResult {
    if OID_PATTERN.is_match(oid) {
        Ok(())
    } else {
        Err(ValidationError::new(format!("invalid organization oid '{oid}'")))
    }
}

pub fn check_referral_guid(guid: &str) -> ValidationResult {
    if REFERRAL_GUID_PATTERN.is_match(guid) {
        Ok(())
    } else {
        Err(ValidationError::new(format!("invalid referralGUID '{guid}'")))
    }
}

pub fn check_gender(gender: Option<i32>) -> ValidationResult {
    match gender {
        None | Some(1) | Some(2) => Ok(()),
        Some(other) => Err(ValidationError::new(format!("unknown gender {other}"))),
    }
}

pub fn check_document_type(type_id: i32) -> ValidationResult<DocumentType> {
    DocumentType::from_id(type_id)
        .ok_or_else(|| ValidationError::new(format!("unknown document type {type_id}")))
}

/// Not-empty checks for the string fields of a payload.
pub fn check_document_fields(data: &DocumentData) -> ValidationResult {
    not_empty("documentType_name", data.document_type_name.as_deref())?;
    not_empty_code("series", data.series.as_ref())?;
    not_empty_code("number", Some(&data.number))?;
    not_empty("orgDep_Name", data.org_dep_name.as_deref())
}

/// Per-type required fields. Passports need series, beginDate and orgDep_Name;
/// policies need series and orgDep_Name; SNILS and INN need nothing extra.
pub fn validate_document(document_id: i32, data: &DocumentData, type_id: i32) -> ValidationResult {
    let document_type = DocumentType::from_id(type_id).ok_or_else(|| {
        ValidationError::new(format!(
            "document {document_id}: unknown document type {type_id}"
        ))
    })?;

    let required: Vec<(&str, bool)> = match document_type {
        DocumentType::Passport => vec![
            ("series", data.series.is_some()),
            ("beginDate", data.begin_date.is_some()),
            ("orgDep_Name", data.org_dep_name.is_some()),
        ],
        DocumentType::Policy => vec![
            ("series", data.series.is_some()),
            ("orgDep_Name", data.org_dep_name.is_some()),
        ],
        DocumentType::Snils | DocumentType::Inn => Vec::new(),
    };

    let missing: Vec<&str> = required
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(field, _)| field)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(format!(
            "document {document_id}: {document_type} requires {}",
            missing.join(", ")
        )))
    }
}
