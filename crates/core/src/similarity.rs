use crate::error::SearchError;
use crate::models::Match;

/// Cosine of the angle between `a` and `b`.
///
/// Returns `0.0` when either norm is zero, the lengths differ or a component is not finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0f64;
    let mut norm_a = 0f64;
    let mut norm_b = 0f64;
    for (left, right) in a.iter().zip(b.iter()) {
        let (left, right) = (f64::from(*left), f64::from(*right));
        dot += left * right;
        norm_a += left * left;
        norm_b += right * right;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

/// Scores every candidate against `query` and returns the first maximum.
pub fn best_match<V>(query: &[f32], candidates: &[V]) -> Result<Match, SearchError>
where
    V: AsRef<[f32]>,
{
    let mut best: Option<Match> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let candidate = candidate.as_ref();
        if candidate.len() != query.len() {
            return Err(SearchError::DimensionMismatch {
                index,
                expected: query.len(),
                actual: candidate.len(),
            });
        }

        let score = cosine_similarity(query, candidate);
        match best {
            Some(current) if score <= current.score => {}
            _ => best = Some(Match { index, score }),
        }
    }

    best.ok_or(SearchError::EmptyCandidateSet)
}
