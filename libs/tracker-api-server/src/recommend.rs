use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::config::RecommendVariant;
use crate::error::ApiError;

const CATALOG: &[(&str, &str)] = &[
    ("music", "Listen to some chill beats"),
    ("movies", "Watch The Shawshank Redemption"),
    ("sports", "Try playing basketball"),
];

/// Интересы, которые знает вариант `Fallback`; остальное → [`FALLBACK`].
const FALLBACK_INTERESTS: &[&str] = &["music"];

const FALLBACK: &str = "Read a good book";

fn lookup(interest: &str) -> Option<&'static str> {
    CATALOG
        .iter()
        .find(|(name, _)| *name == interest)
        .map(|(_, text)| *text)
}

/// Фиксированные рекомендации по интересу.
#[derive(Debug, Clone, Copy)]
pub struct Recommender {
    variant: RecommendVariant,
}

impl Recommender {
    pub fn new(variant: RecommendVariant) -> Self {
        Self { variant }
    }

    pub fn recommend(&self, interest: &str) -> Result<&'static str, ApiError> {
        match self.variant {
            RecommendVariant::Fallback => Ok(FALLBACK_INTERESTS
                .iter()
                .any(|known| *known == interest)
                .then(|| lookup(interest))
                .flatten()
                .unwrap_or(FALLBACK)),
            RecommendVariant::Strict => lookup(interest).ok_or_else(|| {
                let allowed: Vec<&str> = CATALOG.iter().map(|(name, _)| *name).collect();
                ApiError::UnsupportedInterest(allowed.join(", "))
            }),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct Profile {
    interest: String,
}

#[derive(Serialize)]
pub(crate) struct RecommendResponse {
    recommendation: &'static str,
}

// --- POST /recommend ---

pub(crate) async fn handle_recommend(
    State(state): State<AppState>,
    payload: Result<Json<Profile>, JsonRejection>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let Json(profile) = payload.map_err(|e| ApiError::validation("body", e.body_text()))?;
    let recommendation = state.recommender.recommend(&profile.interest)?;
    Ok(Json(RecommendResponse { recommendation }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_knows_music_only() {
        let rec = Recommender::new(RecommendVariant::Fallback);
        assert_eq!(rec.recommend("music").unwrap(), "Listen to some chill beats");
        assert_eq!(rec.recommend("movies").unwrap(), "Read a good book");
        assert_eq!(rec.recommend("astrology").unwrap(), "Read a good book");
    }

    #[test]
    fn fallback_answers_come_from_catalog() {
        let rec = Recommender::new(RecommendVariant::Fallback);
        for interest in FALLBACK_INTERESTS {
            let expected = lookup(interest).unwrap();
            assert_eq!(rec.recommend(interest).unwrap(), expected);
            assert_ne!(expected, FALLBACK);
        }
    }

    #[test]
    fn strict_uses_full_catalog() {
        let rec = Recommender::new(RecommendVariant::Strict);
        assert_eq!(rec.recommend("movies").unwrap(), "Watch The Shawshank Redemption");
        assert_eq!(rec.recommend("sports").unwrap(), "Try playing basketball");
    }

    #[test]
    fn strict_rejects_unknown_interest_with_allow_list() {
        let err = Recommender::new(RecommendVariant::Strict).recommend("astrology").unwrap_err();
        assert_eq!(err.to_string(), "Interest must be one of: music, movies, sports");
    }
}
