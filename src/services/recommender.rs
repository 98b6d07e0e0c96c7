use std::collections::{HashMap, HashSet};

use linfa::dataset::DatasetBase;
use linfa::traits::Fit;
use linfa_clustering::KMeans;
use ndarray::{Array2, ArrayView1};
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Movie;
use crate::services::features::FeatureSchema;

/// Seed for centroid initialization, so refitting the same catalog always
/// produces the same clustering
const KMEANS_SEED: u64 = 42;

/// Error types for the recommender
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Recommender has not been fitted")]
    NotFitted,
    #[error("Catalog is empty, nothing to fit")]
    EmptyCatalog,
    #[error("Clustering failed: {0}")]
    DegenerateClustering(String),
    #[error("Feature mismatch: {0}")]
    FeatureMismatch(String),
}

/// Recommends unseen movies by clustering the catalog on genre and release
/// year, then surfacing movies from the cluster a user's watch history lands
/// in most often.
///
/// The recommender is cheap to construct and owns no shared state, so callers
/// that serve concurrent requests can build a fresh one per request and fit it
/// against a point-in-time snapshot of the catalog.
pub struct ClusterRecommender {
    requested_clusters: usize,
    model: Option<FittedModel>,
}

/// Everything frozen by a successful fit: the feature schema learned from the
/// catalog and the centroids of the clustering built on top of it
#[derive(Debug, Clone)]
struct FittedModel {
    schema: FeatureSchema,
    centroids: Array2<f64>,
}

impl Default for ClusterRecommender {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CLUSTERS)
    }
}

impl ClusterRecommender {
    /// Cluster count used when the caller does not configure one
    pub const DEFAULT_CLUSTERS: usize = 5;

    /// Creates an unfitted recommender that will partition the catalog into at
    /// most `clusters` clusters. A value of zero is treated as one.
    pub fn new(clusters: usize) -> Self {
        Self {
            requested_clusters: clusters.max(1),
            model: None,
        }
    }

    /// Fits the recommender to a catalog, replacing any previous model.
    ///
    /// The effective cluster count is capped at the number of distinct
    /// feature rows, so tiny or highly uniform catalogs fit cleanly instead
    /// of asking k-means for more clusters than there are points to separate.
    pub fn fit(&mut self, catalog: &[Movie]) -> Result<(), RecommendError> {
        let schema = FeatureSchema::fit(catalog).ok_or(RecommendError::EmptyCatalog)?;
        let features = schema.encode(catalog);
        let clusters = self.requested_clusters.min(distinct_rows(&features));

        let rng = Xoshiro256Plus::seed_from_u64(KMEANS_SEED);
        let dataset = DatasetBase::from(features);
        let fitted = KMeans::params_with_rng(clusters, rng)
            .fit(&dataset)
            .map_err(|e| RecommendError::DegenerateClustering(e.to_string()))?;

        self.model = Some(FittedModel {
            schema,
            centroids: fitted.centroids().to_owned(),
        });
        Ok(())
    }

    /// Recommends up to `count` movies from `catalog` that the user has not
    /// watched, drawn from the cluster their history falls into most often.
    ///
    /// Results keep catalog order. An empty history or catalog yields an
    /// empty list regardless of fit state; otherwise the recommender must
    /// have been fitted first.
    pub fn recommend(
        &self,
        history: &[Movie],
        catalog: &[Movie],
        count: usize,
    ) -> Result<Vec<Movie>, RecommendError> {
        if history.is_empty() || catalog.is_empty() {
            return Ok(Vec::new());
        }
        let model = self.model.as_ref().ok_or(RecommendError::NotFitted)?;

        let history_clusters = model.assign(&model.schema.encode(history))?;
        let preferred = match majority_cluster(&history_clusters) {
            Some(cluster) => cluster,
            None => return Ok(Vec::new()),
        };

        let catalog_clusters = model.assign(&model.schema.encode(catalog))?;
        let watched: HashSet<Uuid> = history.iter().map(|m| m.id).collect();

        Ok(catalog
            .iter()
            .zip(catalog_clusters)
            .filter(|(movie, cluster)| *cluster == preferred && !watched.contains(&movie.id))
            .map(|(movie, _)| movie.clone())
            .take(count)
            .collect())
    }

    /// Number of clusters in the fitted model, or `None` before fitting
    pub fn cluster_count(&self) -> Option<usize> {
        self.model.as_ref().map(|m| m.centroids.nrows())
    }
}

impl FittedModel {
    /// Assigns each feature row to its nearest centroid
    fn assign(&self, features: &Array2<f64>) -> Result<Vec<usize>, RecommendError> {
        if features.ncols() != self.centroids.ncols() {
            return Err(RecommendError::FeatureMismatch(format!(
                "feature width {} does not match model width {}",
                features.ncols(),
                self.centroids.ncols()
            )));
        }
        Ok(features
            .rows()
            .into_iter()
            .map(|row| self.nearest_centroid(row))
            .collect())
    }

    fn nearest_centroid(&self, point: ArrayView1<'_, f64>) -> usize {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (cluster, centroid) in self.centroids.rows().into_iter().enumerate() {
            let distance = point
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>();
            if distance < best_distance {
                best_distance = distance;
                best = cluster;
            }
        }
        best
    }
}

/// Cluster id with the highest count in `assignments`. Ties are broken in
/// favor of whichever tied cluster appears earliest in the slice, so the
/// outcome never depends on hash iteration order.
fn majority_cluster(assignments: &[usize]) -> Option<usize> {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for &cluster in assignments {
        *counts.entry(cluster).or_insert(0) += 1;
    }
    let best = counts.values().copied().max()?;
    assignments
        .iter()
        .copied()
        .find(|cluster| counts[cluster] == best)
}

/// Number of distinct feature rows, compared by exact bit pattern
fn distinct_rows(features: &Array2<f64>) -> usize {
    let mut seen = HashSet::new();
    for row in features.rows() {
        let bits: Vec<u64> = row.iter().map(|v| v.to_bits()).collect();
        seen.insert(bits);
    }
    seen.len()
}
