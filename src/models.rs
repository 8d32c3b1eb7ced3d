use super::errors::DataError;
use super::schema::{appearances, episodes, guests};

use diesel::prelude::*;

#[derive(Clone, Debug, Queryable, Selectable, Identifiable, PartialEq)]
#[diesel(table_name = episodes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Episode {
    pub id: i32,
    pub date: String,
    pub number: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = episodes)]
pub struct NewEpisode<'a> {
    pub date: &'a str,
    pub number: i32,
}

#[derive(Clone, Debug, Queryable, Selectable, Identifiable, PartialEq)]
#[diesel(table_name = guests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Guest {
    pub id: i32,
    pub name: String,
    pub occupation: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = guests)]
pub struct NewGuest<'a> {
    pub name: &'a str,
    pub occupation: &'a str,
}

/// One guest's rated appearance on one episode.
#[derive(Clone, Debug, Queryable, Selectable, Identifiable, Associations, PartialEq)]
#[diesel(belongs_to(Episode))]
#[diesel(belongs_to(Guest))]
#[diesel(table_name = appearances)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Appearance {
    pub id: i32,
    pub rating: i32,
    pub episode_id: i32,
    pub guest_id: i32,
}

/// A rating that has been checked against `1..=5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rating(i32);

impl Rating {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 5;

    pub fn new(value: impl Into<i64>) -> Result<Self, DataError> {
        match i32::try_from(value.into()) {
            Ok(value) if (Self::MIN..=Self::MAX).contains(&value) => Ok(Rating(value)),
            _ => Err(DataError::Validation(format!(
                "Rating must be between {} and {}",
                Self::MIN,
                Self::MAX
            ))),
        }
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

/// Insertable appearance. Only constructible from a validated [`Rating`].
#[derive(Debug, Insertable)]
#[diesel(table_name = appearances)]
pub struct NewAppearance {
    rating: i32,
    episode_id: i32,
    guest_id: i32,
}

impl NewAppearance {
    pub fn new(rating: Rating, episode_id: i32, guest_id: i32) -> Self {
        NewAppearance {
            rating: rating.get(),
            episode_id,
            guest_id,
        }
    }
}
