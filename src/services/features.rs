use std::collections::HashMap;

use ndarray::Array2;

use crate::models::Movie;

/// Fixed numeric encoding for a movie catalog.
///
/// The schema is learned once from the full catalog and then reused for every
/// subset encoded against it: the genre vocabulary (one indicator column per
/// distinct genre, ordered by first appearance) and the year statistics are
/// frozen at fit time. Matrices built from different subsets therefore always
/// share the same column layout, so a watch history and the catalog it came
/// from can be compared column for column.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    genres: Vec<String>,
    genre_columns: HashMap<String, usize>,
    year_mean: f64,
    year_std: f64,
}

impl FeatureSchema {
    /// Learns the encoding from a catalog. Returns `None` when the catalog is
    /// empty, since there is nothing to derive a vocabulary or year statistics
    /// from.
    pub fn fit(catalog: &[Movie]) -> Option<Self> {
        if catalog.is_empty() {
            return None;
        }

        let mut genres = Vec::new();
        let mut genre_columns = HashMap::new();
        for movie in catalog {
            if !genre_columns.contains_key(&movie.genre) {
                genre_columns.insert(movie.genre.clone(), genres.len());
                genres.push(movie.genre.clone());
            }
        }

        let n = catalog.len() as f64;
        let year_mean = catalog.iter().map(|m| m.year as f64).sum::<f64>() / n;
        let variance = catalog
            .iter()
            .map(|m| {
                let delta = m.year as f64 - year_mean;
                delta * delta
            })
            .sum::<f64>()
            / n;

        Some(Self {
            genres,
            genre_columns,
            year_mean,
            year_std: variance.sqrt(),
        })
    }

    /// Number of feature columns: the scaled year plus one indicator per genre
    pub fn width(&self) -> usize {
        1 + self.genres.len()
    }

    /// Genre vocabulary in column order
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    /// Encodes movies as rows of `[scaled_year, genre indicators...]`.
    ///
    /// Movies whose genre is not in the vocabulary get an all-zero genre
    /// block. An empty slice encodes to a matrix with zero rows but the full
    /// schema width.
    pub fn encode(&self, movies: &[Movie]) -> Array2<f64> {
        let mut features = Array2::zeros((movies.len(), self.width()));
        for (row, movie) in movies.iter().enumerate() {
            features[[row, 0]] = self.scale_year(movie.year);
            if let Some(&column) = self.genre_columns.get(&movie.genre) {
                features[[row, 1 + column]] = 1.0;
            }
        }
        features
    }

    // A zero-variance catalog (all movies from the same year) maps every year
    // to 0.0 rather than dividing by zero.
    fn scale_year(&self, year: i32) -> f64 {
        if self.year_std > 0.0 {
            (year as f64 - self.year_mean) / self.year_std
        } else {
            0.0
        }
    }
}
