#[inline]
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[inline]
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    squared_euclidean(a, b).sqrt()
}

/// Index of the largest entry; the first one wins ties. NaN entries are
/// never selected unless every entry is NaN.
pub fn max_index(dist: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in dist.iter().enumerate() {
        match best {
            None => best = Some((i, v)),
            Some((_, b)) if b.is_nan() || v > b => best = Some((i, v)),
            _ => {}
        }
    }
    best.map(|(i, _)| i)
}

pub fn max_value(dist: &[f64]) -> f64 {
    max_index(dist).map_or(f64::NAN, |i| dist[i])
}

/// Divides every entry by the sum; an all-zero row becomes uniform.
pub fn normalize(values: &mut [f64]) {
    let sum: f64 = values.iter().sum();
    if sum > 0.0 {
        values.iter_mut().for_each(|v| *v /= sum);
    } else if !values.is_empty() {
        let uniform = 1.0 / values.len() as f64;
        values.iter_mut().for_each(|v| *v = uniform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances() {
        assert_eq!(squared_euclidean(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(euclidean(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(euclidean(&[], &[]), 0.0);
    }

    #[test]
    fn max_index_prefers_first_on_ties() {
        assert_eq!(max_index(&[0.2, 0.5, 0.5]), Some(1));
        assert_eq!(max_index(&[]), None);
        assert_eq!(max_index(&[f64::NAN, 0.1]), Some(1));
        assert_eq!(max_value(&[0.3, 0.7]), 0.7);
    }

    #[test]
    fn normalize_falls_back_to_uniform() {
        let mut v = vec![1.0, 3.0];
        normalize(&mut v);
        assert_eq!(v, vec![0.25, 0.75]);

        let mut z = vec![0.0, 0.0, 0.0, 0.0];
        normalize(&mut z);
        assert_eq!(z, vec![0.25; 4]);
    }
}
