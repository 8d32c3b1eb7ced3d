/// Everything the service reads from and writes to sqlite:
/// - db mod holds the queries and transactional writes
/// - the read models below pair a record with the records it embeds
pub mod db;

use crate::models::{Appearance, Episode, Guest};

/// Appearance fields as received. `None` marks a value that is not an integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AppearanceFields {
    pub rating: Option<i64>,
    pub episode_id: Option<i64>,
    pub guest_id: Option<i64>,
}

/// An appearance together with the episode and guest it links.
#[derive(Clone, Debug, PartialEq)]
pub struct AppearanceDetail {
    pub appearance: Appearance,
    pub episode: Episode,
    pub guest: Guest,
}

impl From<(Appearance, Episode, Guest)> for AppearanceDetail {
    fn from((appearance, episode, guest): (Appearance, Episode, Guest)) -> Self {
        AppearanceDetail {
            appearance,
            episode,
            guest,
        }
    }
}

/// An episode with all of its appearances, oldest first.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeDetail {
    pub episode: Episode,
    pub appearances: Vec<AppearanceDetail>,
}
