//! Writes one validated package: its sender organizations, their users and
//! the users' documents.

use chrono::{NaiveDateTime, Utc};
use diesel::{pg::PgConnection, prelude::*};

use crate::auth::password;
use crate::error::{AppError, AppResult};
use crate::models::{NewDocument, NewOrganization, NewUser, Organization};
use crate::packages::{IncomingDocument, IncomingUser, OrganizationInfo, Package};
use crate::payload::{Code, DocumentData, Provenance};
use crate::schema::{documents, organizations, users};
use crate::types::{DocumentType, UserType};
use crate::validation::validate_document;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub organizations: usize,
    pub users: usize,
    pub documents: usize,
}

/// Stores a package in a single transaction. Any failure rolls back everything
/// this package wrote; packages committed before it are unaffected.
pub fn ingest_package(
    conn: &mut PgConnection,
    package: &Package,
    creator_id: i32,
) -> AppResult<IngestSummary> {
    conn.transaction::<_, AppError, _>(|conn| {
        let now = Utc::now().naive_utc();
        let mut summary = IngestSummary::default();

        for group in package.groups() {
            let organization = &group.sender.organization;
            summary.organizations += upsert_organization(conn, organization, creator_id, now)?;

            let provenance = Provenance {
                referral_id: package.id,
                referral_date: package.referral_date,
                sender_name: &organization.full_name,
            };
            for user in &group.users {
                summary.documents += create_user(conn, user, creator_id, &provenance, now)?;
                summary.users += 1;
            }
        }

        Ok(summary)
    })
}

/// Inserts the organization unless one with the same OID already exists; an
/// existing row is kept as stored. Returns the number of rows written.
fn upsert_organization(
    conn: &mut PgConnection,
    organization: &OrganizationInfo,
    creator_id: i32,
    now: NaiveDateTime,
) -> AppResult<usize> {
    let inserted = diesel::insert_into(organizations::table)
        .values(&NewOrganization {
            oid: &organization.oid,
            name: &organization.full_name,
            create_datetime: now,
            create_user_id: creator_id,
        })
        .on_conflict(organizations::oid)
        .do_nothing()
        .execute(conn)?;

    if inserted == 0 {
        let existing: Organization = organizations::table
            .filter(organizations::oid.eq(&organization.oid))
            .select(Organization::as_select())
            .first(conn)?;
        if existing.name != organization.full_name {
            tracing::warn!(
                oid = %organization.oid,
                stored_name = %existing.name,
                sender_name = %organization.full_name,
                "organization already registered under another name"
            );
        } else {
            tracing::debug!(oid = %organization.oid, "organization already registered");
        }
    }
    Ok(inserted)
}

/// Creates the user with every attached document, then the synthetic SNILS
/// and INN documents. Returns the number of documents written.
fn create_user(
    conn: &mut PgConnection,
    user: &IncomingUser,
    creator_id: i32,
    provenance: &Provenance<'_>,
    now: NaiveDateTime,
) -> AppResult<usize> {
    let password_hash = password::hash_password(&user.credentials.password)?;
    diesel::insert_into(users::table)
        .values(&NewUser {
            id: user.id,
            last_name: user.last_name.clone(),
            first_name: user.first_name.clone(),
            patr_name: user.patr_name.clone(),
            gender_id: user.sex,
            type_id: Some(UserType::Regular.id()),
            login: Some(user.credentials.username.clone()),
            password: Some(password_hash),
            create_datetime: Some(now),
            create_user_id: Some(creator_id),
        })
        .execute(conn)?;

    let mut created = 0;
    for document in user.documents() {
        create_document(conn, user.id, document, creator_id, provenance, now)?;
        created += 1;
    }
    if created > 0 {
        sync_document_ids(conn)?;
    }

    let numbers = [
        (DocumentType::Snils, user.snils.as_ref()),
        (DocumentType::Inn, user.inn.as_ref()),
    ];
    for (document_type, number) in numbers {
        if let Some(number) = number {
            create_number_document(conn, user.id, document_type, number, creator_id, provenance, now)?;
            created += 1;
        }
    }

    tracing::debug!(user_id = user.id, documents = created, "user created");
    Ok(created)
}

fn create_document(
    conn: &mut PgConnection,
    user_id: i32,
    document: &IncomingDocument,
    creator_id: i32,
    provenance: &Provenance<'_>,
    now: NaiveDateTime,
) -> AppResult<()> {
    validate_document(document.id, &document.data, document.document_type_id)?;

    let mut data = document.data.clone();
    provenance.stamp(&mut data);

    diesel::insert_into(documents::table)
        .values(&NewDocument {
            id: Some(document.id),
            user_id,
            type_id: document.document_type_id,
            data: data.to_stored()?,
            create_datetime: now,
            create_user_id: creator_id,
        })
        .execute(conn)?;
    Ok(())
}

/// Number-only documents skip the per-type field rules.
fn create_number_document(
    conn: &mut PgConnection,
    user_id: i32,
    document_type: DocumentType,
    number: &Code,
    creator_id: i32,
    provenance: &Provenance<'_>,
    now: NaiveDateTime,
) -> AppResult<()> {
    let mut data = DocumentData::number_only(number.clone());
    provenance.stamp(&mut data);

    diesel::insert_into(documents::table)
        .values(&NewDocument {
            id: None,
            user_id,
            type_id: document_type.id(),
            data: data.to_stored()?,
            create_datetime: now,
            create_user_id: creator_id,
        })
        .execute(conn)?;
    Ok(())
}

/// Explicit ids bypass the identity sequence; move it past the highest id so
/// later generated ids cannot collide. It never moves backwards, so values
/// already drawn by other transactions, committed or not, are not reissued.
fn sync_document_ids(conn: &mut PgConnection) -> AppResult<()> {
    diesel::sql_query(
        "SELECT setval(seq, GREATEST( \
             (SELECT MAX(id) FROM documents), \
             pg_sequence_last_value(seq), \
             1)) \
         FROM (SELECT pg_get_serial_sequence('documents', 'id')::regclass AS seq) AS target",
    )
    .execute(conn)?;
    Ok(())
}
