use serde::Serialize;

use crate::models::{Episode, Guest};
use crate::store::{AppearanceDetail, EpisodeDetail};

/// `{id, date, number}`, plus `appearances` for single-episode lookups.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EpisodeView {
    pub id: i32,
    pub date: String,
    pub number: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appearances: Option<Vec<AppearanceView>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GuestView {
    pub id: i32,
    pub name: String,
    pub occupation: String,
}

/// Always carries the full episode and guest next to their ids.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppearanceView {
    pub id: i32,
    pub rating: i32,
    pub episode_id: i32,
    pub guest_id: i32,
    pub episode: EpisodeView,
    pub guest: GuestView,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MessageView {
    pub message: String,
}

impl From<&Episode> for EpisodeView {
    fn from(episode: &Episode) -> Self {
        EpisodeView {
            id: episode.id,
            date: episode.date.clone(),
            number: episode.number,
            appearances: None,
        }
    }
}

impl From<&Guest> for GuestView {
    fn from(guest: &Guest) -> Self {
        GuestView {
            id: guest.id,
            name: guest.name.clone(),
            occupation: guest.occupation.clone(),
        }
    }
}

impl From<&AppearanceDetail> for AppearanceView {
    fn from(detail: &AppearanceDetail) -> Self {
        AppearanceView {
            id: detail.appearance.id,
            rating: detail.appearance.rating,
            episode_id: detail.appearance.episode_id,
            guest_id: detail.appearance.guest_id,
            episode: EpisodeView::from(&detail.episode),
            guest: GuestView::from(&detail.guest),
        }
    }
}

// the only place appearances get embedded into an episode
impl From<&EpisodeDetail> for EpisodeView {
    fn from(detail: &EpisodeDetail) -> Self {
        EpisodeView {
            appearances: Some(detail.appearances.iter().map(AppearanceView::from).collect()),
            ..EpisodeView::from(&detail.episode)
        }
    }
}
