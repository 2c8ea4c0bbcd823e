//! Wire shape of an ingest batch as posted to `add_information`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer};

use crate::payload::{Code, DocumentData};
use crate::validation::{
    check_document_fields, check_document_type, check_gender, check_inn, check_oid,
    check_referral_guid, check_snils, not_empty, ValidationResult,
};

#[derive(Debug, Deserialize)]
pub struct Package {
    pub id: i64,
    #[serde(rename = "referralGUID")]
    pub referral_guid: String,
    #[serde(rename = "referralDate", deserialize_with = "deserialize_referral_date")]
    pub referral_date: NaiveDateTime,
    #[serde(rename = "Data", default)]
    pub data: Option<Vec<DataGroup>>,
}

impl Package {
    pub fn groups(&self) -> &[DataGroup] {
        self.data.as_deref().unwrap_or_default()
    }

    pub fn validate(&self) -> ValidationResult {
        check_referral_guid(&self.referral_guid)?;
        self.groups().iter().try_for_each(DataGroup::validate)
    }
}

/// One sender organization and the people it reports.
#[derive(Debug, Deserialize)]
pub struct DataGroup {
    #[serde(rename = "Sender")]
    pub sender: Sender,
    #[serde(rename = "Users", default)]
    pub users: Vec<IncomingUser>,
}

impl DataGroup {
    fn validate(&self) -> ValidationResult {
        self.sender.organization.validate()?;
        self.users.iter().try_for_each(IncomingUser::validate)
    }
}

#[derive(Debug, Deserialize)]
pub struct Sender {
    #[serde(rename = "Organization")]
    pub organization: OrganizationInfo,
}

#[derive(Debug, Deserialize)]
pub struct OrganizationInfo {
    pub oid: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
}

impl OrganizationInfo {
    fn validate(&self) -> ValidationResult {
        check_oid(&self.oid)?;
        not_empty("fullName", Some(&self.full_name))
    }
}

/// A person as reported by a sender. Birth date, phone and address are
/// accepted and checked but not persisted.
#[derive(Debug, Deserialize)]
pub struct IncomingUser {
    pub id: i32,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "patrName", default)]
    pub patr_name: Option<String>,
    #[serde(rename = "birthDate", default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub sex: Option<i32>,
    #[serde(rename = "phoneNumber")]
    pub phone_number: i64,
    #[serde(default)]
    pub snils: Option<Code>,
    #[serde(default)]
    pub inn: Option<Code>,
    #[serde(rename = "Credentials")]
    pub credentials: Credentials,
    #[serde(rename = "Address", default)]
    pub address: Option<Address>,
    #[serde(rename = "Documents", default)]
    pub documents: Option<Vec<IncomingDocument>>,
}

impl IncomingUser {
    pub fn documents(&self) -> &[IncomingDocument] {
        self.documents.as_deref().unwrap_or_default()
    }

    fn validate(&self) -> ValidationResult {
        not_empty("lastName", Some(&self.last_name))?;
        not_empty("firstName", self.first_name.as_deref())?;
        not_empty("patrName", self.patr_name.as_deref())?;
        check_gender(self.sex)?;
        check_snils(self.snils.as_ref())?;
        check_inn(self.inn.as_ref())?;
        not_empty("Credentials.username", Some(&self.credentials.username))?;
        not_empty("Credentials.password", Some(&self.credentials.password))?;
        if let Some(address) = &self.address {
            not_empty("Address.value", address.value.as_deref())?;
        }
        self.documents()
            .iter()
            .try_for_each(IncomingDocument::validate)
    }
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingDocument {
    pub id: i32,
    #[serde(rename = "documentType_id")]
    pub document_type_id: i32,
    #[serde(flatten)]
    pub data: DocumentData,
}

impl IncomingDocument {
    fn validate(&self) -> ValidationResult {
        check_document_type(self.document_type_id)?;
        check_document_fields(&self.data)
    }
}

fn deserialize_referral_date<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_referral_date(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid referralDate '{raw}'")))
}

/// Accepts RFC 3339 timestamps (normalised to UTC), naive date-times with
/// either `T` or a space as separator, and bare dates.
pub fn parse_referral_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_utc());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
