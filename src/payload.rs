//! Document payloads as they are stored in `documents.data`.
//!
//! The payload is JSON text with a handful of well-known fields. Senders may
//! attach any other keys; those live in [`DocumentData::extra`] and are written
//! back unchanged.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::json::overlay_truthy;

pub const REFERRAL_ID_KEY: &str = "referralId";
pub const REFERRAL_DATE_KEY: &str = "referralDate";
pub const SENDER_NAME_KEY: &str = "senderName";

/// Identifier that senders submit either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Code {
    Number(i64),
    Text(String),
}

impl Code {
    /// Length of the textual form, which is what length rules are checked against.
    pub fn char_len(&self) -> usize {
        match self {
            Code::Number(value) => value.to_string().chars().count(),
            Code::Text(value) => value.chars().count(),
        }
    }

    pub fn is_empty_text(&self) -> bool {
        matches!(self, Code::Text(value) if value.is_empty())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Number(value) => write!(f, "{value}"),
            Code::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentData {
    #[serde(
        rename = "documentType_name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub document_type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<Code>,
    pub number: Code,
    #[serde(rename = "beginDate", default, skip_serializing_if = "Option::is_none")]
    pub begin_date: Option<NaiveDate>,
    #[serde(rename = "endDate", default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "orgDep_Name", default, skip_serializing_if = "Option::is_none")]
    pub org_dep_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentData {
    /// Payload for SNILS/INN numbers that arrive on the user rather than as documents.
    pub fn number_only(number: Code) -> Self {
        Self {
            document_type_name: None,
            series: None,
            number,
            begin_date: None,
            end_date: None,
            org_dep_name: None,
            extra: Map::new(),
        }
    }

    pub fn from_stored(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_stored(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Applies a partial update: every truthy field of `update` replaces the
    /// current value, everything else (unknown keys included) is kept.
    pub fn merged_with(&self, update: &DocumentData) -> serde_json::Result<DocumentData> {
        let mut merged = into_object(serde_json::to_value(self)?);
        overlay_truthy(&mut merged, into_object(serde_json::to_value(update)?));
        serde_json::from_value(Value::Object(merged))
    }
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Where a document came from: the package that carried it and its sender.
#[derive(Debug, Clone, Copy)]
pub struct Provenance<'a> {
    pub referral_id: i64,
    pub referral_date: NaiveDateTime,
    pub sender_name: &'a str,
}

impl Provenance<'_> {
    /// Records the provenance keys in the payload, replacing any sender-supplied values.
    pub fn stamp(&self, data: &mut DocumentData) {
        data.extra
            .insert(REFERRAL_ID_KEY.to_string(), Value::from(self.referral_id));
        data.extra.insert(
            REFERRAL_DATE_KEY.to_string(),
            Value::String(
                self.referral_date
                    .format("%Y-%m-%dT%H:%M:%S%.f")
                    .to_string(),
            ),
        );
        data.extra.insert(
            SENDER_NAME_KEY.to_string(),
            Value::String(self.sender_name.to_string()),
        );
    }
}
