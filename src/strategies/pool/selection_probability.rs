use crate::error::{Error, Result};
use crate::utils::math::euclidean;

/// Output of one k-means++ seeding step.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionProbability {
    /// Normalized squared distances, or all ones when `randomized`.
    pub probabilities: Vec<f64>,
    /// Distance of every point to its nearest chosen center, to be passed
    /// back as `d_latest` in the next round.
    pub min_distances: Option<Vec<f64>>,
    /// When set, `probabilities` are placeholders and the caller must draw
    /// uniformly instead of from the categorical distribution.
    pub randomized: bool,
}

impl SelectionProbability {
    fn uniform(n: usize, min_distances: Option<Vec<f64>>) -> Self {
        Self {
            probabilities: vec![1.0; n],
            min_distances,
            randomized: true,
        }
    }
}

/// Selection probability proportional to the squared distance between each
/// point of `g_x` and its nearest point in `chosen`.
///
/// `d_latest` caches the minimum distances to centers chosen in earlier
/// rounds, so only the newest centers need to be passed in `chosen`.
pub fn distance_probability(
    g_x: &[Vec<f64>],
    chosen: &[usize],
    d_latest: Option<&[f64]>,
) -> Result<SelectionProbability> {
    if let Some(&index) = chosen.iter().find(|&&c| c >= g_x.len()) {
        return Err(Error::IndexOutOfBounds {
            what: "embedding pool",
            index,
            len: g_x.len(),
        });
    }
    if let Some(prev) = d_latest {
        if prev.len() != g_x.len() {
            return Err(Error::LengthMismatch {
                what: "d_latest",
                expected: g_x.len(),
                found: prev.len(),
            });
        }
    }
    if chosen.is_empty() {
        return Ok(SelectionProbability::uniform(
            g_x.len(),
            d_latest.map(<[f64]>::to_vec),
        ));
    }

    let mut distances: Vec<f64> = g_x
        .iter()
        .map(|point| {
            chosen
                .iter()
                .map(|&c| euclidean(point, &g_x[c]))
                .fold(f64::INFINITY, f64::min)
        })
        .collect();
    if let Some(prev) = d_latest {
        for (d, &p) in distances.iter_mut().zip(prev) {
            *d = d.min(p);
        }
    }

    let squared: Vec<f64> = distances.iter().map(|d| d * d).collect();
    let total: f64 = squared.iter().sum();
    // every point sits on a chosen center, e.g. the classifier knows one class only
    if total == 0.0 {
        return Ok(SelectionProbability::uniform(g_x.len(), Some(distances)));
    }

    Ok(SelectionProbability {
        probabilities: squared.iter().map(|d| d / total).collect(),
        min_distances: Some(distances),
        randomized: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn no_centers_is_randomized_uniform() {
        let g = vec![vec![0.0], vec![1.0], vec![2.0]];
        let p = distance_probability(&g, &[], None).unwrap();
        assert!(p.randomized);
        assert_eq!(p.probabilities, vec![1.0; 3]);
        assert!(p.min_distances.is_none());
    }

    #[test]
    fn proportional_to_squared_distance() {
        let g = vec![vec![0.0], vec![1.0], vec![3.0]];
        let p = distance_probability(&g, &[0], None).unwrap();
        assert!(!p.randomized);
        assert!(approx_eq(p.probabilities[0], 0.0, EPS));
        assert!(approx_eq(p.probabilities[1], 0.1, EPS));
        assert!(approx_eq(p.probabilities[2], 0.9, EPS));
        assert!(approx_eq(p.probabilities.iter().sum::<f64>(), 1.0, EPS));
        assert_eq!(p.min_distances, Some(vec![0.0, 1.0, 3.0]));
    }

    #[test]
    fn cached_distances_combine_with_new_center() {
        let g = vec![vec![0.0], vec![1.0], vec![3.0], vec![4.0]];
        let first = distance_probability(&g, &[0], None).unwrap();
        let second =
            distance_probability(&g, &[3], first.min_distances.as_deref()).unwrap();
        let full = distance_probability(&g, &[0, 3], None).unwrap();
        assert_eq!(second.min_distances, Some(vec![0.0, 1.0, 1.0, 0.0]));
        for (a, b) in second.probabilities.iter().zip(&full.probabilities) {
            assert!(approx_eq(*a, *b, EPS));
        }
        assert!(approx_eq(second.probabilities[1], 0.5, EPS));
    }

    #[test]
    fn collapsed_embeddings_fall_back_to_uniform() {
        let g = vec![vec![0.0, 0.0]; 4];
        let p = distance_probability(&g, &[2], None).unwrap();
        assert!(p.randomized);
        assert_eq!(p.probabilities, vec![1.0; 4]);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let g = vec![vec![0.0], vec![1.0]];
        assert!(matches!(
            distance_probability(&g, &[2], None),
            Err(Error::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            distance_probability(&g, &[0], Some(&[1.0])),
            Err(Error::LengthMismatch { .. })
        ));
    }
}
