mod wire;

use crate::catalog::{image_url, CatalogSource, ImageSize, Listing};
use crate::config::Configuration;
use crate::error::{CatalogError, CatalogResult};
use crate::http::HttpClient;
use crate::models::{CatalogItem, ItemDetails, MediaKind, Page};
use async_trait::async_trait;
use tracing::{debug, info, instrument};
use url::Url;
use wire::{TmdbDetails, TmdbItem};

pub struct TmdbClient {
    http: HttpClient,
    base_url: String,
    image_base_url: String,
    language: String,
    region: String,
}

impl TmdbClient {
    pub fn new(http: HttpClient, config: &Configuration) -> Self {
        Self {
            http,
            base_url: config.tmdb_base_url(),
            image_base_url: config.image_base_url(),
            language: config.language(),
            region: config.region(),
        }
    }

    pub fn image_url(&self, path: Option<&str>, size: ImageSize) -> Option<String> {
        image_url(&self.image_base_url, path, size)
    }

    /// Every request carries the configured `language`.
    fn url(&self, path: &str, params: &[(&str, String)]) -> CatalogResult<Url> {
        let mut pairs: Vec<(&str, &str)> = vec![("language", self.language.as_str())];
        pairs.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        let raw = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        Ok(Url::parse_with_params(&raw, pairs)?)
    }

    pub fn listing_url(&self, kind: MediaKind, listing: &Listing, page: u32) -> CatalogResult<Url> {
        if !listing.supports(kind) {
            return Err(CatalogError::UnsupportedListing {
                listing: listing.to_string(),
                kind,
            });
        }

        let k = kind.as_str();
        let mut params = vec![("page", page.max(1).to_string())];

        let path = match listing {
            Listing::Popular => format!("/{}/popular", k),
            Listing::TopRated => format!("/{}/top_rated", k),
            Listing::Trending => format!("/trending/{}/week", k),
            Listing::NowPlaying => {
                params.push(("region", self.region.clone()));
                "/movie/now_playing".to_string()
            }
            Listing::Upcoming => {
                params.push(("region", self.region.clone()));
                "/movie/upcoming".to_string()
            }
            Listing::OnTheAir => "/tv/on_the_air".to_string(),
            Listing::TopRatedThisYear(year) => {
                let year_key = match kind {
                    MediaKind::Movie => "primary_release_year",
                    MediaKind::Show => "first_air_date_year",
                };
                params.push(("sort_by", "vote_average.desc".to_string()));
                params.push((year_key, year.to_string()));
                params.push(("vote_count.gte", "500".to_string()));
                format!("/discover/{}", k)
            }
            Listing::TopRatedClassics => {
                let date_key = match kind {
                    MediaKind::Movie => "primary_release_date.lte",
                    MediaKind::Show => "first_air_date.lte",
                };
                params.push(("sort_by", "vote_average.desc".to_string()));
                params.push((date_key, "1999-12-31".to_string()));
                params.push(("vote_count.gte", "200".to_string()));
                format!("/discover/{}", k)
            }
            Listing::ByGenre(genre) => {
                params.push(("sort_by", "popularity.desc".to_string()));
                params.push(("with_genres", genre.to_string()));
                format!("/discover/{}", k)
            }
        };

        self.url(&path, &params)
    }

    pub fn search_url(&self, kind: MediaKind, query: &str, page: u32) -> CatalogResult<Url> {
        self.url(
            &format!("/search/{}", kind.as_str()),
            &[
                ("query", query.to_string()),
                ("page", page.max(1).to_string()),
                ("include_adult", "false".to_string()),
            ],
        )
    }

    pub fn item_url(&self, kind: MediaKind, id: u64, with_related: bool) -> CatalogResult<Url> {
        let path = format!("/{}/{}", kind.as_str(), id);
        if with_related {
            self.url(
                &path,
                &[
                    ("append_to_response", "credits,images,videos".to_string()),
                    ("include_image_language", "es,en,null".to_string()),
                ],
            )
        } else {
            self.url(&path, &[])
        }
    }
}

#[async_trait]
impl CatalogSource for TmdbClient {
    #[instrument(skip(self, listing), fields(listing = %listing))]
    async fn listing(
        &self,
        kind: MediaKind,
        listing: &Listing,
        page: u32,
    ) -> CatalogResult<Page<CatalogItem>> {
        let url = self.listing_url(kind, listing, page)?;
        let page: Page<TmdbItem> = self.http.get_json(&url).await?;

        info!(
            "Retrieved {} {} items (page {} of {})",
            page.results.len(),
            kind,
            page.page,
            page.total_pages
        );
        Ok(page.map(|i| i.into_item(kind)))
    }

    #[instrument(skip(self))]
    async fn search(
        &self,
        kind: MediaKind,
        query: &str,
        page: u32,
    ) -> CatalogResult<Page<CatalogItem>> {
        let url = self.search_url(kind, query, page)?;
        let page: Page<TmdbItem> = self.http.get_json(&url).await?;

        info!("Search '{}' matched {} {} titles", query, page.total_results, kind);
        Ok(page.map(|i| i.into_item(kind)))
    }

    #[instrument(skip(self))]
    async fn item(&self, kind: MediaKind, id: u64) -> CatalogResult<CatalogItem> {
        let url = self.item_url(kind, id, false)?;
        let item: TmdbItem = self.http.get_json(&url).await?;
        debug!("Fetched {} {}", kind, id);
        Ok(item.into_item(kind))
    }

    #[instrument(skip(self))]
    async fn details(&self, kind: MediaKind, id: u64) -> CatalogResult<ItemDetails> {
        let url = self.item_url(kind, id, true)?;
        let details: TmdbDetails = self.http.get_json(&url).await?;
        Ok(details.into_details(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client() -> TmdbClient {
        let config = Configuration::from_yaml(
            "tmdb:\n  baseUrl: https://api.example.test/3/\n  language: en-US\n  region: US\n",
        )
        .unwrap();
        let http = HttpClient::new(Some("token"), Duration::from_secs(5)).unwrap();
        TmdbClient::new(http, &config)
    }

    fn query(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn listing_paths_per_kind() {
        let tmdb = client();

        let url = tmdb.listing_url(MediaKind::Movie, &Listing::TopRated, 1).unwrap();
        assert_eq!(url.path(), "/3/movie/top_rated");
        assert_eq!(query(&url, "language").as_deref(), Some("en-US"));

        let url = tmdb.listing_url(MediaKind::Show, &Listing::Trending, 2).unwrap();
        assert_eq!(url.path(), "/3/trending/tv/week");
        assert_eq!(query(&url, "page").as_deref(), Some("2"));

        let url = tmdb.listing_url(MediaKind::Movie, &Listing::NowPlaying, 1).unwrap();
        assert_eq!(url.path(), "/3/movie/now_playing");
        assert_eq!(query(&url, "region").as_deref(), Some("US"));
    }

    #[test]
    fn discover_listings_carry_filters() {
        let tmdb = client();

        let url = tmdb
            .listing_url(MediaKind::Movie, &Listing::TopRatedThisYear(2024), 1)
            .unwrap();
        assert_eq!(url.path(), "/3/discover/movie");
        assert_eq!(query(&url, "primary_release_year").as_deref(), Some("2024"));
        assert_eq!(query(&url, "vote_count.gte").as_deref(), Some("500"));

        let url = tmdb
            .listing_url(MediaKind::Show, &Listing::TopRatedClassics, 1)
            .unwrap();
        assert_eq!(url.path(), "/3/discover/tv");
        assert_eq!(query(&url, "first_air_date.lte").as_deref(), Some("1999-12-31"));

        let url = tmdb
            .listing_url(MediaKind::Movie, &Listing::ByGenre(27), 1)
            .unwrap();
        assert_eq!(query(&url, "with_genres").as_deref(), Some("27"));
    }

    #[test]
    fn unsupported_listing_is_an_error() {
        let err = client()
            .listing_url(MediaKind::Show, &Listing::Upcoming, 1)
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::UnsupportedListing {
                kind: MediaKind::Show,
                ..
            }
        ));
    }

    #[test]
    fn search_and_detail_urls() {
        let tmdb = client();

        let url = tmdb.search_url(MediaKind::Movie, "blade runner", 0).unwrap();
        assert_eq!(url.path(), "/3/search/movie");
        assert_eq!(query(&url, "query").as_deref(), Some("blade runner"));
        assert_eq!(query(&url, "page").as_deref(), Some("1"));
        assert_eq!(query(&url, "include_adult").as_deref(), Some("false"));

        let url = tmdb.item_url(MediaKind::Show, 1399, true).unwrap();
        assert_eq!(url.path(), "/3/tv/1399");
        assert_eq!(
            query(&url, "append_to_response").as_deref(),
            Some("credits,images,videos")
        );
        let url = tmdb.item_url(MediaKind::Movie, 1, false).unwrap();
        assert_eq!(query(&url, "append_to_response"), None);
    }
}
