// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector math for the semantic classifier.

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when the lengths differ or either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    dot / denominator
}

/// L2-normalize a vector. Zero vectors are returned unchanged.
pub fn l2_normalize(vec: &[f32]) -> Vec<f32> {
    let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vec.iter().map(|v| v / norm).collect()
    } else {
        vec.to_vec()
    }
}

/// Componentwise mean of `vectors`.
///
/// The dimension is taken from the first vector; callers must pass vectors
/// of equal length, since extra components are ignored. An empty input yields
/// an empty vector. The result is not renormalized.
pub fn average_vectors(vectors: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = vectors.first() else {
        return Vec::new();
    };

    let mut sum = vec![0.0f32; first.len()];
    for vec in vectors {
        for (acc, v) in sum.iter_mut().zip(vec) {
            *acc += v;
        }
    }

    let count = vectors.len() as f32;
    for val in &mut sum {
        *val /= count;
    }
    sum
}
