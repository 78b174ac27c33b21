//! Vector similarity functions.

/// Calculate cosine similarity between two vectors.
///
/// Applies the full formula `dot / (|a| * |b|)` so non-normalized input is
/// handled. Returns 0.0 when either norm is (near) zero and clamps the result
/// to [-1.0, 1.0]. Callers must pass equal-length slices.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vectors must have same dimension");

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f32, 0.0f32, 0.0f32), |(d, na, nb), (x, y)| {
            (d + x * y, na + x * x, nb + y * y)
        });

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    (dot / denom).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_unnormalized_input() {
        // Same direction, different magnitude
        let sim = cosine_similarity(&[3.0, 4.0], &[0.6, 0.8]);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector_is_zero_similarity() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_result_is_clamped() {
        let v = [0.1f32; 384];
        let sim = cosine_similarity(&v, &v);
        assert!(sim <= 1.0);
        assert!(sim > 0.999);
    }
}
