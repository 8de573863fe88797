use crate::models::{parse_partial_date, CatalogItem, Genre, ItemDetails, MediaKind, Video};
use serde::Deserialize;

/// A movie or show exactly as TMDB sends it. Movies use `title` and
/// `release_date`, shows use `name` and `first_air_date`; listings carry
/// `genre_ids` while detail responses carry `genres` objects.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbItem {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub genre_ids: Option<Vec<u32>>,
    pub genres: Option<Vec<TmdbGenre>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub id: u32,
    pub name: Option<String>,
}

impl TmdbItem {
    pub fn into_item(self, kind: MediaKind) -> CatalogItem {
        let title = match kind {
            MediaKind::Movie => self.title.or(self.name),
            MediaKind::Show => self.name.or(self.title),
        }
        .filter(|t| !t.is_empty());

        let date = match kind {
            MediaKind::Movie => self.release_date.or(self.first_air_date),
            MediaKind::Show => self.first_air_date.or(self.release_date),
        };

        let genres: Vec<Genre> = self
            .genres
            .unwrap_or_default()
            .into_iter()
            .map(|g| Genre {
                id: g.id,
                name: g.name,
            })
            .collect();

        let genre_ids = match self.genre_ids {
            Some(ids) if !ids.is_empty() => ids,
            _ => genres.iter().map(|g| g.id).collect(),
        };

        CatalogItem {
            id: self.id,
            kind,
            title,
            release_date: date.as_deref().and_then(parse_partial_date),
            genre_ids,
            genres,
            vote_average: self.vote_average,
            vote_count: self.vote_count,
            overview: self.overview.filter(|o| !o.is_empty()),
            poster_path: self.poster_path.filter(|p| !p.is_empty()),
            backdrop_path: self.backdrop_path.filter(|p| !p.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbDetails {
    #[serde(flatten)]
    pub base: TmdbItem,
    pub tagline: Option<String>,
    pub runtime: Option<u32>,
    pub number_of_seasons: Option<u32>,
    pub credits: Option<TmdbCredits>,
    #[serde(default)]
    pub created_by: Vec<TmdbPerson>,
    pub videos: Option<TmdbVideos>,
    pub images: Option<TmdbImages>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbPerson>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPerson {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideos {
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideo {
    pub key: String,
    pub name: Option<String>,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub official: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbImages {
    #[serde(default)]
    pub backdrops: Vec<TmdbImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbImage {
    pub file_path: String,
}

const CAST_LIMIT: usize = 5;

impl TmdbDetails {
    pub fn into_details(self, kind: MediaKind) -> ItemDetails {
        let fallback_backdrop = self
            .images
            .and_then(|i| i.backdrops.into_iter().next())
            .map(|b| b.file_path);

        let mut item = self.base.into_item(kind);
        if item.backdrop_path.is_none() {
            item.backdrop_path = fallback_backdrop;
        }

        let trailer = self
            .videos
            .map(|v| v.results)
            .and_then(|videos| pick_trailer(&videos))
            .map(|v| Video {
                key: v.key,
                name: v.name,
                site: v.site,
                video_type: v.video_type,
                official: v.official,
            });

        ItemDetails {
            item,
            tagline: self.tagline.filter(|t| !t.is_empty()),
            runtime: self.runtime,
            number_of_seasons: self.number_of_seasons,
            cast: self
                .credits
                .map(|c| c.cast)
                .unwrap_or_default()
                .into_iter()
                .take(CAST_LIMIT)
                .map(|p| p.name)
                .collect(),
            creators: self.created_by.into_iter().map(|p| p.name).collect(),
            trailer,
        }
    }
}

/// Official YouTube trailer if there is one, otherwise any YouTube trailer.
pub fn pick_trailer(videos: &[TmdbVideo]) -> Option<TmdbVideo> {
    let is_trailer = |v: &&TmdbVideo| v.site == "YouTube" && v.video_type == "Trailer";

    videos
        .iter()
        .filter(is_trailer)
        .find(|v| v.official)
        .or_else(|| videos.iter().find(is_trailer))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Page;
    use chrono::NaiveDate;

    #[test]
    fn movie_listing_entry() {
        let json = r#"{
            "page": 1,
            "results": [{
                "id": 550,
                "title": "Fight Club",
                "release_date": "1999-10-15",
                "genre_ids": [18, 53],
                "vote_average": 8.4,
                "poster_path": "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
                "backdrop_path": null
            }],
            "total_pages": 500,
            "total_results": 10000
        }"#;

        let page: Page<TmdbItem> = serde_json::from_str(json).unwrap();
        let page = page.map(|i| i.into_item(MediaKind::Movie));
        let item = &page.results[0];

        assert_eq!(page.total_pages, 500);
        assert_eq!(item.display_title(), "Fight Club");
        assert_eq!(item.release_date, NaiveDate::from_ymd_opt(1999, 10, 15));
        assert_eq!(item.genre_ids, vec![18, 53]);
        assert_eq!(item.backdrop_path, None);
    }

    #[test]
    fn show_entry_uses_name_and_first_air_date() {
        let json = r#"{"id": 1399, "name": "Game of Thrones", "first_air_date": "2011-04-17", "genre_ids": [10765]}"#;
        let item = serde_json::from_str::<TmdbItem>(json)
            .unwrap()
            .into_item(MediaKind::Show);

        assert_eq!(item.kind, MediaKind::Show);
        assert_eq!(item.display_title(), "Game of Thrones");
        assert_eq!(item.year(), Some(2011));
    }

    #[test]
    fn malformed_optional_fields_become_absent() {
        let json = r#"{"id": 3, "title": "", "release_date": "", "genre_ids": null, "poster_path": ""}"#;
        let item = serde_json::from_str::<TmdbItem>(json)
            .unwrap()
            .into_item(MediaKind::Movie);

        assert_eq!(item.title, None);
        assert_eq!(item.release_date, None);
        assert!(item.genre_ids.is_empty());
        assert_eq!(item.poster_path, None);
    }

    #[test]
    fn details_carry_genres_cast_and_trailer() {
        let json = r#"{
            "id": 603,
            "title": "The Matrix",
            "release_date": "1999-03-30",
            "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
            "runtime": 136,
            "tagline": "Welcome to the Real World.",
            "credits": {"cast": [
                {"name": "Keanu Reeves"}, {"name": "Laurence Fishburne"},
                {"name": "Carrie-Anne Moss"}, {"name": "Hugo Weaving"},
                {"name": "Joe Pantoliano"}, {"name": "Marcus Chong"}
            ]},
            "videos": {"results": [
                {"key": "teaser", "site": "YouTube", "type": "Teaser", "official": true},
                {"key": "fan", "site": "YouTube", "type": "Trailer", "official": false},
                {"key": "official", "site": "YouTube", "type": "Trailer", "official": true}
            ]},
            "images": {"backdrops": [{"file_path": "/fallback.jpg"}]}
        }"#;

        let details = serde_json::from_str::<TmdbDetails>(json)
            .unwrap()
            .into_details(MediaKind::Movie);

        assert_eq!(details.item.genre_ids, vec![28, 878]);
        assert_eq!(details.item.genres[1].name.as_deref(), Some("Science Fiction"));
        assert_eq!(details.item.backdrop_path.as_deref(), Some("/fallback.jpg"));
        assert_eq!(details.cast.len(), 5);
        assert_eq!(details.runtime, Some(136));
        assert_eq!(details.trailer.map(|t| t.key).as_deref(), Some("official"));
    }

    #[test]
    fn unofficial_trailer_is_used_when_no_official_one() {
        let videos = vec![
            TmdbVideo {
                key: "vimeo".into(),
                name: None,
                site: "Vimeo".into(),
                video_type: "Trailer".into(),
                official: true,
            },
            TmdbVideo {
                key: "yt".into(),
                name: None,
                site: "YouTube".into(),
                video_type: "Trailer".into(),
                official: false,
            },
        ];
        assert_eq!(pick_trailer(&videos).map(|v| v.key).as_deref(), Some("yt"));
        assert!(pick_trailer(&[]).is_none());
    }
}
