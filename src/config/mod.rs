use crate::recommend::ShelfOrder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TOKEN_ENV_VAR: &str = "TMDB_TOKEN";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Configuration {
    pub tmdb: Option<TmdbConfig>,
    pub recommendations: Option<RecommendationConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TmdbConfig {
    pub token: Option<String>,
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,
    #[serde(rename = "imageBaseUrl")]
    pub image_base_url: Option<String>,
    pub language: Option<String>,
    pub region: Option<String>,
    #[serde(rename = "timeoutSeconds")]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecommendationConfig {
    #[serde(rename = "displayLimit")]
    pub display_limit: Option<usize>,
    #[serde(rename = "favoriteGenres")]
    pub favorite_genres: Option<usize>,
    #[serde(rename = "maxSavedLookups")]
    pub max_saved_lookups: Option<usize>,
    #[serde(rename = "classicsBeforeYear")]
    pub classics_before_year: Option<i32>,
    pub order: Option<ShelfOrderConfig>,
}

/// Per-shelf ordering. Shelves left out keep their default policy.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShelfOrderConfig {
    #[serde(rename = "favoriteGenres")]
    pub favorite_genres: Option<ShelfOrder>,
    #[serde(rename = "becauseYouLiked")]
    pub because_you_liked: Option<ShelfOrder>,
    #[serde(rename = "newForYou")]
    pub new_for_you: Option<ShelfOrder>,
    pub classics: Option<ShelfOrder>,
    #[serde(rename = "topRatedForProfile")]
    pub top_rated_for_profile: Option<ShelfOrder>,
}

/// Fully resolved recommendation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationSettings {
    pub display_limit: usize,
    pub favorite_genres: usize,
    pub max_saved_lookups: usize,
    pub classics_before_year: i32,
    pub favorite_genres_order: ShelfOrder,
    pub because_you_liked_order: ShelfOrder,
    pub new_for_you_order: ShelfOrder,
    pub classics_order: ShelfOrder,
    pub top_rated_for_profile_order: ShelfOrder,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            display_limit: 20,
            favorite_genres: 3,
            max_saved_lookups: 40,
            classics_before_year: 2000,
            favorite_genres_order: ShelfOrder::Discovery,
            because_you_liked_order: ShelfOrder::Discovery,
            new_for_you_order: ShelfOrder::Discovery,
            classics_order: ShelfOrder::Discovery,
            top_rated_for_profile_order: ShelfOrder::VoteAverage,
        }
    }
}

impl Configuration {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Configuration = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Bearer token from the file, or from `TMDB_TOKEN` when the file has none.
    pub fn tmdb_token(&self) -> Option<String> {
        self.tmdb
            .as_ref()
            .and_then(|t| t.token.clone())
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok().filter(|t| !t.is_empty()))
    }

    pub fn tmdb_base_url(&self) -> String {
        self.tmdb
            .as_ref()
            .and_then(|t| t.base_url.clone())
            .unwrap_or_else(|| "https://api.themoviedb.org/3".to_string())
    }

    pub fn image_base_url(&self) -> String {
        self.tmdb
            .as_ref()
            .and_then(|t| t.image_base_url.clone())
            .unwrap_or_else(|| "https://image.tmdb.org/t/p/".to_string())
    }

    pub fn language(&self) -> String {
        self.tmdb
            .as_ref()
            .and_then(|t| t.language.clone())
            .unwrap_or_else(|| "es-ES".to_string())
    }

    pub fn region(&self) -> String {
        self.tmdb
            .as_ref()
            .and_then(|t| t.region.clone())
            .unwrap_or_else(|| "ES".to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.tmdb
                .as_ref()
                .and_then(|t| t.timeout_seconds)
                .unwrap_or(30),
        )
    }

    pub fn recommendation_settings(&self) -> RecommendationSettings {
        let defaults = RecommendationSettings::default();
        let Some(ref rec) = self.recommendations else {
            return defaults;
        };
        let order = rec.order.clone().unwrap_or_default();

        RecommendationSettings {
            display_limit: rec.display_limit.unwrap_or(defaults.display_limit),
            favorite_genres: rec.favorite_genres.unwrap_or(defaults.favorite_genres),
            max_saved_lookups: rec.max_saved_lookups.unwrap_or(defaults.max_saved_lookups),
            classics_before_year: rec
                .classics_before_year
                .unwrap_or(defaults.classics_before_year),
            favorite_genres_order: order
                .favorite_genres
                .unwrap_or(defaults.favorite_genres_order),
            because_you_liked_order: order
                .because_you_liked
                .unwrap_or(defaults.because_you_liked_order),
            new_for_you_order: order.new_for_you.unwrap_or(defaults.new_for_you_order),
            classics_order: order.classics.unwrap_or(defaults.classics_order),
            top_rated_for_profile_order: order
                .top_rated_for_profile
                .unwrap_or(defaults.top_rated_for_profile_order),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Configuration::from_yaml("{}").unwrap();
        assert_eq!(config.tmdb_base_url(), "https://api.themoviedb.org/3");
        assert_eq!(config.language(), "es-ES");
        assert_eq!(config.region(), "ES");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(
            config.recommendation_settings(),
            RecommendationSettings::default()
        );
    }

    #[test]
    fn shelf_orders_are_read_per_shelf() {
        let yaml = r#"
recommendations:
  displayLimit: 10
  classicsBeforeYear: 1990
  order:
    becauseYouLiked: voteAverage
    topRatedForProfile: discovery
"#;
        let settings = Configuration::from_yaml(yaml)
            .unwrap()
            .recommendation_settings();

        assert_eq!(settings.display_limit, 10);
        assert_eq!(settings.favorite_genres, 3);
        assert_eq!(settings.classics_before_year, 1990);
        assert_eq!(settings.because_you_liked_order, ShelfOrder::VoteAverage);
        assert_eq!(settings.top_rated_for_profile_order, ShelfOrder::Discovery);
        assert_eq!(settings.favorite_genres_order, ShelfOrder::Discovery);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "tmdb:\n  token: abc\n  language: en-US\n  timeoutSeconds: 5"
        )
        .unwrap();

        let config = Configuration::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.tmdb_token().as_deref(), Some("abc"));
        assert_eq!(config.language(), "en-US");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn unknown_order_policy_is_rejected() {
        let yaml = "recommendations:\n  order:\n    classics: random\n";
        assert!(Configuration::from_yaml(yaml).is_err());
    }
}
