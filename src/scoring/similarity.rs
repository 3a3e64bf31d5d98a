// Cosine similarity between document vectors, and its percent rendering.

/// Cosine similarity between two vectors, in [-1.0, 1.0].
///
/// Zero-length, mismatched, or all-zero inputs score 0.0. The denominator is
/// `sqrt(|a|² · |b|²)` so identical vectors come out at exactly 1.0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum();
    let norm_b: f64 = b.iter().map(|x| x * x).sum();

    let denom = (norm_a * norm_b).sqrt();
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}

/// Render a similarity as a percent string: 1.0 -> "100.0%", 0.875 -> "87.5%".
///
/// Uses the shortest representation that round-trips, always with a
/// fractional part.
pub fn format_percent(similarity: f64) -> String {
    format!("{:?}%", similarity * 100.0)
}

/// Parse a percent string produced by `format_percent` back to a similarity.
pub fn parse_percent(percent: &str) -> Option<f64> {
    percent
        .strip_suffix('%')
        .and_then(|n| n.trim().parse::<f64>().ok())
        .map(|p| p / 100.0)
}
