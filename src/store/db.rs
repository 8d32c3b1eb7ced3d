use crate::errors::DataError;
use crate::models::{Appearance, Episode, Guest, NewAppearance, NewEpisode, NewGuest, Rating};
use crate::schema::{appearances, episodes, guests};
use crate::store::{AppearanceDetail, AppearanceFields, EpisodeDetail};

use diesel::prelude::*;
use log::*;

/// All episodes, in insertion order.
pub fn list_episodes(ctx: &mut SqliteConnection) -> Result<Vec<Episode>, DataError> {
    episodes::table
        .order(episodes::id.asc())
        .select(Episode::as_select())
        .load(ctx)
        .map_err(From::from)
}

pub fn find_episode(
    ctx: &mut SqliteConnection,
    episode_id: i32,
) -> Result<Option<Episode>, DataError> {
    episodes::table
        .find(episode_id)
        .select(Episode::as_select())
        .first(ctx)
        .optional()
        .map_err(From::from)
}

/// Appearances of `episode` with their episode and guest rows, oldest first.
pub fn episode_appearances(
    ctx: &mut SqliteConnection,
    episode: &Episode,
) -> Result<Vec<AppearanceDetail>, DataError> {
    let rows = Appearance::belonging_to(episode)
        .inner_join(episodes::table)
        .inner_join(guests::table)
        .order(appearances::id.asc())
        .select((
            Appearance::as_select(),
            Episode::as_select(),
            Guest::as_select(),
        ))
        .load::<(Appearance, Episode, Guest)>(ctx)?;

    Ok(rows.into_iter().map(AppearanceDetail::from).collect())
}

/// Look up one episode along with its appearances.
pub fn episode_detail(
    ctx: &mut SqliteConnection,
    episode_id: i32,
) -> Result<Option<EpisodeDetail>, DataError> {
    let Some(episode) = find_episode(ctx, episode_id)? else {
        return Ok(None);
    };
    let appearances = episode_appearances(ctx, &episode)?;

    Ok(Some(EpisodeDetail {
        episode,
        appearances,
    }))
}

/// All guests, in insertion order.
pub fn list_guests(ctx: &mut SqliteConnection) -> Result<Vec<Guest>, DataError> {
    guests::table
        .order(guests::id.asc())
        .select(Guest::as_select())
        .load(ctx)
        .map_err(From::from)
}

pub fn find_guest(ctx: &mut SqliteConnection, guest_id: i32) -> Result<Option<Guest>, DataError> {
    guests::table
        .find(guest_id)
        .select(Guest::as_select())
        .first(ctx)
        .optional()
        .map_err(From::from)
}

pub fn create_episode(
    ctx: &mut SqliteConnection,
    new: &NewEpisode<'_>,
) -> Result<Episode, DataError> {
    let episode = diesel::insert_into(episodes::table)
        .values(new)
        .returning(Episode::as_returning())
        .get_result(ctx)?;
    debug!("Inserted episode: {}", episode.id);
    Ok(episode)
}

pub fn create_guest(ctx: &mut SqliteConnection, new: &NewGuest<'_>) -> Result<Guest, DataError> {
    let guest = diesel::insert_into(guests::table)
        .values(new)
        .returning(Guest::as_returning())
        .get_result(ctx)?;
    debug!("Inserted guest: {}", guest.id);
    Ok(guest)
}

/// Insert an appearance linking two existing records.
pub fn create_appearance(
    ctx: &mut SqliteConnection,
    rating: impl Into<i64>,
    episode_id: impl Into<i64>,
    guest_id: impl Into<i64>,
) -> Result<AppearanceDetail, DataError> {
    create_appearance_from(
        ctx,
        &AppearanceFields {
            rating: Some(rating.into()),
            episode_id: Some(episode_id.into()),
            guest_id: Some(guest_id.into()),
        },
    )
}

/// Insert an appearance from unchecked fields.
///
/// The episode and guest are looked up first: an id that is missing, not an
/// integer, or outside the row id range fails with [`DataError::NotFound`].
/// The rating is checked after that. Nothing is written on failure.
pub fn create_appearance_from(
    ctx: &mut SqliteConnection,
    fields: &AppearanceFields,
) -> Result<AppearanceDetail, DataError> {
    ctx.transaction::<_, DataError, _>(|ctx| {
        let episode = match row_id(fields.episode_id) {
            Some(id) => find_episode(ctx, id)?,
            None => None,
        };
        let guest = match row_id(fields.guest_id) {
            Some(id) => find_guest(ctx, id)?,
            None => None,
        };
        let (Some(episode), Some(guest)) = (episode, guest) else {
            return Err(DataError::NotFound);
        };

        let rating = fields.rating.ok_or(DataError::NotAnInteger("rating"))?;
        let new = NewAppearance::new(Rating::new(rating)?, episode.id, guest.id);
        let appearance = diesel::insert_into(appearances::table)
            .values(&new)
            .returning(Appearance::as_returning())
            .get_result(ctx)?;
        info!(
            "Inserted appearance {} (episode {}, guest {})",
            appearance.id, episode.id, guest.id
        );

        Ok(AppearanceDetail {
            appearance,
            episode,
            guest,
        })
    })
}

fn row_id(id: Option<i64>) -> Option<i32> {
    id.and_then(|id| i32::try_from(id).ok())
}

/// Delete an episode and every appearance on it. Returns the number of
/// appearances removed.
pub fn delete_episode(ctx: &mut SqliteConnection, episode_id: i32) -> Result<usize, DataError> {
    ctx.transaction::<_, DataError, _>(|ctx| {
        if find_episode(ctx, episode_id)?.is_none() {
            return Err(DataError::NotFound);
        }

        let removed =
            diesel::delete(appearances::table.filter(appearances::episode_id.eq(episode_id)))
                .execute(ctx)?;
        diesel::delete(episodes::table.find(episode_id)).execute(ctx)?;
        info!("Deleted episode {} and {} appearance(s)", episode_id, removed);

        Ok(removed)
    })
}

/// Delete a guest and every appearance they made. Returns the number of
/// appearances removed.
pub fn delete_guest(ctx: &mut SqliteConnection, guest_id: i32) -> Result<usize, DataError> {
    ctx.transaction::<_, DataError, _>(|ctx| {
        if find_guest(ctx, guest_id)?.is_none() {
            return Err(DataError::NotFound);
        }

        let removed = diesel::delete(appearances::table.filter(appearances::guest_id.eq(guest_id)))
            .execute(ctx)?;
        diesel::delete(guests::table.find(guest_id)).execute(ctx)?;
        info!("Deleted guest {} and {} appearance(s)", guest_id, removed);

        Ok(removed)
    })
}

/// Remove every row, dependents first.
pub fn clear_all(ctx: &mut SqliteConnection) -> Result<(), DataError> {
    ctx.transaction::<_, DataError, _>(|ctx| {
        diesel::delete(appearances::table).execute(ctx)?;
        diesel::delete(guests::table).execute(ctx)?;
        diesel::delete(episodes::table).execute(ctx)?;
        Ok(())
    })
}

pub fn count_appearances(ctx: &mut SqliteConnection) -> Result<i64, DataError> {
    appearances::table
        .count()
        .get_result(ctx)
        .map_err(From::from)
}
