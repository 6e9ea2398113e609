//! Fuzzy string matching
//!
//! The resolver only needs a partial-ratio score on a 0-100 scale, so the
//! algorithm sits behind [`StringMatcher`]. Implementations may disagree a
//! little on edge cases; the resolver's threshold is a fixed constant.

/// Partial-ratio string similarity
pub trait StringMatcher: Send + Sync {
    /// Best alignment score of the shorter string against contiguous
    /// substrings of the longer one, in `0.0..=100.0`
    fn partial_ratio(&self, a: &str, b: &str) -> f64;

    fn name(&self) -> &'static str;
}

/// Normalized indel (LCS) similarity over character windows
///
/// `ratio(a, b) = 100 * 2 * LCS(a, b) / (|a| + |b|)`, maximized over every
/// placement of the shorter string along the longer one, including the
/// partial windows that hang off either end.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndelMatcher;

impl StringMatcher for IndelMatcher {
    fn partial_ratio(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

        if short.is_empty() {
            return if long.is_empty() { 100.0 } else { 0.0 };
        }

        let s = short.len() as isize;
        let l = long.len() as isize;
        let mut best = 0.0f64;
        for start in (1 - s)..l {
            let lo = start.max(0) as usize;
            let hi = (start + s).min(l) as usize;
            let score = ratio(&short, &long[lo..hi]);
            if score > best {
                best = score;
                if best >= 100.0 {
                    break;
                }
            }
        }
        best
    }

    fn name(&self) -> &'static str {
        "indel"
    }
}

/// Normalized indel similarity of two character slices, 0-100
pub fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    100.0 * (2 * lcs_len(a, b)) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
