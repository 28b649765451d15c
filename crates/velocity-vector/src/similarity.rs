//! Vector similarity math.
//!
//! Accumulation is done in `f64` so that scores are stable across
//! embedding sizes.

/// Euclidean norm of `v`.
pub fn norm(v: &[f32]) -> f64 {
    v.iter()
        .map(|&x| {
            let x = f64::from(x);
            x * x
        })
        .sum::<f64>()
        .sqrt()
}

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum()
}

/// Cosine similarity given precomputed norms.
///
/// A zero norm on either side yields 0.0.
pub fn cosine_with_norms(a: &[f32], a_norm: f64, b: &[f32], b_norm: f64) -> f64 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    dot(a, b) / (a_norm * b_norm)
}

/// Cosine similarity (`1 - cosine distance`), in `[-1, 1]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    cosine_with_norms(a, norm(a), b, norm(b))
}
