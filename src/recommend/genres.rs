use crate::models::MediaKind;

/// Movie genres that get their own shelf, in display order.
pub const MOVIE_GENRE_SECTIONS: [u32; 7] = [28, 35, 18, 27, 878, 10749, 99];

/// TMDB uses a separate genre list for shows.
pub const SHOW_GENRE_SECTIONS: [u32; 7] = [10759, 35, 18, 80, 10765, 16, 99];

pub fn genre_sections(kind: MediaKind) -> &'static [u32] {
    match kind {
        MediaKind::Movie => &MOVIE_GENRE_SECTIONS,
        MediaKind::Show => &SHOW_GENRE_SECTIONS,
    }
}

/// Display name for a TMDB genre id.
pub fn genre_label(genre_id: u32) -> &'static str {
    match genre_id {
        28 => "Action",
        12 => "Adventure",
        16 => "Animation",
        35 => "Comedy",
        80 => "Crime",
        18 => "Drama",
        14 => "Fantasy",
        27 => "Horror",
        10749 => "Romance",
        878 => "Sci-Fi",
        53 => "Thriller",
        10751 => "Family",
        9648 => "Mystery",
        36 => "History",
        10752 => "War",
        99 => "Documentary",
        10759 => "Action & Adventure",
        10765 => "Sci-Fi & Fantasy",
        _ => "Genre",
    }
}
