//! Database models.

use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema;

/// A registered user and their current score.
#[derive(
    Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable, Getters, Serialize,
)]
#[diesel(table_name = schema::users)]
pub struct User {
    id: i32,
    name: String,
    score: i64,
}

/// Insertable user model for registering a new name.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    name: String,
    score: i64,
}
