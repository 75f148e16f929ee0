//! Movie details as shown next to a recommendation, and the TMDB response
//! they are built from.

use serde::{Deserialize, Serialize};

/// Shown when TMDB has no poster for a movie
pub const NO_POSTER_PLACEHOLDER: &str = "https://placehold.co/500x750/111827/FFFFFF?text=No+Poster";

/// Shown when the details lookup itself failed
pub const ERROR_POSTER_PLACEHOLDER: &str = "https://placehold.co/500x750/111827/FFFFFF?text=Error";

/// Public TMDB page for a movie
pub fn tmdb_movie_url(movie_id: u32) -> String {
    format!("https://www.themoviedb.org/movie/{}", movie_id)
}

/// Display metadata for one movie
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieDetails {
    /// Full poster image URL, `None` when TMDB has no poster
    pub poster_url: Option<String>,
    pub overview: String,
    pub genres: Vec<String>,
    /// TMDB vote average (0-10)
    pub rating: f32,
}

impl MovieDetails {
    /// Poster URL, or the "No Poster" placeholder
    pub fn poster_or_placeholder(&self) -> &str {
        self.poster_url.as_deref().unwrap_or(NO_POSTER_PLACEHOLDER)
    }

    /// Convert a TMDB `/movie/{id}` payload, resolving the poster path
    /// against `image_base_url` (e.g. `https://image.tmdb.org/t/p/w500`)
    pub fn from_tmdb(movie: TmdbMovie, image_base_url: &str) -> Self {
        let poster_url = movie
            .poster_path
            .filter(|path| !path.trim().is_empty())
            .map(|path| {
                format!(
                    "{}/{}",
                    image_base_url.trim_end_matches('/'),
                    path.trim_start_matches('/')
                )
            });

        Self {
            poster_url,
            overview: movie.overview.unwrap_or_default(),
            genres: movie
                .genres
                .unwrap_or_default()
                .into_iter()
                .map(|g| g.name)
                .collect(),
            rating: movie.vote_average.unwrap_or(0.0),
        }
    }
}

/// Subset of the TMDB `/movie/{id}` response we read. Every field may be
/// missing or null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbMovie {
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<TmdbGenre>>,
    #[serde(default)]
    pub vote_average: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub name: String,
}
