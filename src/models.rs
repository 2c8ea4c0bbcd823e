use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::schema::*;

/// Value of the `deleted` column for rows that are still in use.
pub const ACTIVE: i32 = 0;
/// Value of the `deleted` column once a row has been soft-deleted.
pub const DELETED: i32 = 1;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub last_name: String,
    pub first_name: Option<String>,
    pub patr_name: Option<String>,
    pub gender_id: Option<i32>,
    pub type_id: Option<i32>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub create_datetime: Option<NaiveDateTime>,
    pub create_user_id: Option<i32>,
    pub modify_datetime: Option<NaiveDateTime>,
    pub modify_user_id: Option<i32>,
    pub deleted: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: i32,
    pub last_name: String,
    pub first_name: Option<String>,
    pub patr_name: Option<String>,
    pub gender_id: Option<i32>,
    pub type_id: Option<i32>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub create_datetime: Option<NaiveDateTime>,
    pub create_user_id: Option<i32>,
}

/// Only the columns set here are written; `None` leaves the stored value alone.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChangeset {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub patr_name: Option<String>,
    pub gender_id: Option<i32>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub modify_datetime: NaiveDateTime,
    pub modify_user_id: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = documents)]
pub struct Document {
    pub id: i32,
    pub user_id: Option<i32>,
    pub type_id: Option<i32>,
    pub data: Option<String>,
    pub create_datetime: Option<NaiveDateTime>,
    pub create_user_id: Option<i32>,
    pub modify_datetime: Option<NaiveDateTime>,
    pub modify_user_id: Option<i32>,
    pub deleted: i32,
}

/// `id` is `None` for number-only documents, which take the next identity value.
#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
pub struct NewDocument {
    pub id: Option<i32>,
    pub user_id: i32,
    pub type_id: i32,
    pub data: String,
    pub create_datetime: NaiveDateTime,
    pub create_user_id: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = organizations)]
pub struct Organization {
    pub id: i32,
    pub oid: String,
    pub name: String,
    pub create_datetime: Option<NaiveDateTime>,
    pub create_user_id: Option<i32>,
    pub modify_datetime: Option<NaiveDateTime>,
    pub modify_user_id: Option<i32>,
    pub deleted: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = organizations)]
pub struct NewOrganization<'a> {
    pub oid: &'a str,
    pub name: &'a str,
    pub create_datetime: NaiveDateTime,
    pub create_user_id: i32,
}
