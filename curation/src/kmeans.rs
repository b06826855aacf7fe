//! Seeded k-means over embedding vectors.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use helpdesk_embeddings::{Embedding, euclidean_distance};

use crate::error::{CurationError, Result};

/// Assignments and final centroids from one clustering run.
#[derive(Debug, Clone)]
pub struct KMeansResult {
    /// Cluster index for each input point, in input order.
    pub assignments: Vec<usize>,

    /// One centroid per cluster; every cluster has at least one member.
    pub centroids: Vec<Embedding>,
}

/// Partition `points` into `k` clusters with Lloyd's algorithm.
///
/// Initialization is k-means++ driven by `seed`, and every tie-break is
/// index-ordered, so a given (points, k, seed) triple always produces the
/// same clustering. Requires at least `k` points; every returned cluster is
/// non-empty.
pub fn kmeans(points: &[Embedding], k: usize, seed: u64, max_iters: usize) -> Result<KMeansResult> {
    if k == 0 {
        return Err(CurationError::InvalidArgument(
            "cluster count must be positive".to_string(),
        ));
    }
    if points.len() < k {
        return Err(CurationError::InvalidArgument(format!(
            "cannot split {} points into {k} clusters",
            points.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids = seed_centroids(points, k, &mut rng)?;
    let mut assignments = assign_all(points, &centroids)?;

    for _ in 0..max_iters {
        for (cluster, mean) in cluster_means(points, &assignments, k).into_iter().enumerate() {
            // an emptied cluster keeps its previous centroid until the
            // rebalance below
            if let Some(mean) = mean {
                centroids[cluster] = mean;
            }
        }

        let next = assign_all(points, &centroids)?;
        if next == assignments {
            break;
        }
        assignments = next;
    }

    fill_empty_clusters(points, &mut assignments, &mut centroids)?;

    Ok(KMeansResult {
        assignments,
        centroids,
    })
}

/// k-means++ seeding: each new centroid is drawn with probability
/// proportional to squared distance from the nearest already-chosen one.
fn seed_centroids(points: &[Embedding], k: usize, rng: &mut StdRng) -> Result<Vec<Embedding>> {
    let mut centroids = Vec::with_capacity(k);
    let first = rng.random_range(0..points.len());
    centroids.push(points[first].clone());

    while centroids.len() < k {
        let mut weights = Vec::with_capacity(points.len());
        for point in points {
            let (_, distance) = nearest_centroid(point, &centroids)?;
            weights.push(f64::from(distance) * f64::from(distance));
        }
        let total: f64 = weights.iter().sum();

        let chosen = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            let mut index = points.len() - 1;
            for (i, weight) in weights.iter().enumerate() {
                if target < *weight {
                    index = i;
                    break;
                }
                target -= weight;
            }
            index
        } else {
            // every point coincides with a centroid already
            rng.random_range(0..points.len())
        };
        centroids.push(points[chosen].clone());
    }

    Ok(centroids)
}

fn nearest_centroid(point: &Embedding, centroids: &[Embedding]) -> Result<(usize, f32)> {
    let mut best = (0, f32::INFINITY);
    for (cluster, centroid) in centroids.iter().enumerate() {
        let distance = euclidean_distance(point, centroid)?;
        if distance < best.1 {
            best = (cluster, distance);
        }
    }
    Ok(best)
}

fn assign_all(points: &[Embedding], centroids: &[Embedding]) -> Result<Vec<usize>> {
    points
        .iter()
        .map(|point| nearest_centroid(point, centroids).map(|(cluster, _)| cluster))
        .collect()
}

fn cluster_means(
    points: &[Embedding],
    assignments: &[usize],
    k: usize,
) -> Vec<Option<Embedding>> {
    let width = points.first().map(Vec::len).unwrap_or(0);
    let mut sums = vec![vec![0.0f32; width]; k];
    let mut counts = vec![0usize; k];

    for (point, &cluster) in points.iter().zip(assignments) {
        counts[cluster] += 1;
        for (slot, value) in sums[cluster].iter_mut().zip(point) {
            *slot += value;
        }
    }

    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| {
            if count == 0 {
                None
            } else {
                Some(sum.into_iter().map(|v| v / count as f32).collect())
            }
        })
        .collect()
}

/// Guarantee every cluster at least one member: each empty cluster takes
/// over the point currently farthest from its assigned centroid, drawn from
/// a cluster that can spare one.
fn fill_empty_clusters(
    points: &[Embedding],
    assignments: &mut [usize],
    centroids: &mut [Embedding],
) -> Result<()> {
    loop {
        let mut counts = vec![0usize; centroids.len()];
        for &cluster in assignments.iter() {
            counts[cluster] += 1;
        }
        let Some(empty) = counts.iter().position(|&count| count == 0) else {
            return Ok(());
        };

        let mut donor: Option<(usize, f32)> = None;
        for (index, point) in points.iter().enumerate() {
            if counts[assignments[index]] < 2 {
                continue;
            }
            let distance = euclidean_distance(point, &centroids[assignments[index]])?;
            let better = match donor {
                None => true,
                Some((_, best)) => distance > best,
            };
            if better {
                donor = Some((index, distance));
            }
        }
        let Some((index, _)) = donor else {
            return Ok(());
        };

        centroids[empty] = points[index].clone();
        assignments[index] = empty;
    }
}
