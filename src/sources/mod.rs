use diesel::prelude::*;
use log::*;

use crate::database::Database;
use crate::errors::DataError;
use crate::models::{NewEpisode, NewGuest};
use crate::store::db;

/// Initial episodes as `(date, number)`.
pub const EPISODES: [(&str, i32); 3] = [("1/11/99", 1), ("1/12/99", 2), ("1/13/99", 3)];

/// Initial guests as `(name, occupation)`.
pub const GUESTS: [(&str, &str); 3] = [
    ("Michael J. Fox", "actor"),
    ("Sandra Bernhard", "Comedian"),
    ("Tracey Ullman", "television actress"),
];

/// Initial appearances as `(rating, episode index, guest index)` into the lists above.
pub const APPEARANCES: [(i32, usize, usize); 3] = [(4, 0, 0), (5, 1, 1), (3, 2, 2)];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub episodes: usize,
    pub guests: usize,
    pub appearances: usize,
}

/// Wipe the store and load the initial data set, all in one transaction.
pub fn seed(database: &Database) -> Result<SeedSummary, DataError> {
    let mut ctx = database.connection()?;
    ctx.transaction::<_, DataError, _>(|ctx| seed_on(ctx))
}

fn seed_on(ctx: &mut SqliteConnection) -> Result<SeedSummary, DataError> {
    info!("Seeding db...");
    db::clear_all(ctx)?;

    let episodes = EPISODES
        .iter()
        .map(|&(date, number)| db::create_episode(ctx, &NewEpisode { date, number }))
        .collect::<Result<Vec<_>, _>>()?;
    let guests = GUESTS
        .iter()
        .map(|&(name, occupation)| db::create_guest(ctx, &NewGuest { name, occupation }))
        .collect::<Result<Vec<_>, _>>()?;

    for &(rating, episode, guest) in APPEARANCES.iter() {
        db::create_appearance(ctx, rating, episodes[episode].id, guests[guest].id)?;
    }

    let summary = SeedSummary {
        episodes: episodes.len(),
        guests: guests.len(),
        appearances: APPEARANCES.len(),
    };
    info!("Seeded {:?}", summary);
    Ok(summary)
}
