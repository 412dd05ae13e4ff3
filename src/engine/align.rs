use crate::engine::similarity::WordMatcher;

/// Longest common subsequence of two word streams under fuzzy word equality.
///
/// Returns the matched words as they appear in `window` (the reference side).
/// On equal-length alternatives the backtrack prefers skipping a transcribed word,
/// so the result is deterministic.
pub fn lcs(transcribed: &[String], window: &[String], matcher: &WordMatcher) -> Vec<String> {
    let n = transcribed.len();
    let m = window.len();
    if n == 0 || m == 0 {
        return Vec::new();
    }

    // table[i][j] = LCS length of transcribed[..i] and window[..j]
    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            table[i][j] = if matcher.matches(&transcribed[i - 1], &window[j - 1]) {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }

    let mut matched = Vec::with_capacity(table[n][m]);
    let (mut i, mut j) = (n, m);
    while i > 0 && j > 0 {
        if matcher.matches(&transcribed[i - 1], &window[j - 1])
            && table[i][j] == table[i - 1][j - 1] + 1
        {
            matched.push(window[j - 1].clone());
            i -= 1;
            j -= 1;
        } else if table[i - 1][j] >= table[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    matched.reverse();
    matched
}

/// `|lcs| / max(len)`; 0.0 when both sides are empty.
pub fn sequence_match(lcs_len: usize, transcribed_len: usize, window_len: usize) -> f64 {
    let longest = transcribed_len.max(window_len);
    if longest == 0 {
        return 0.0;
    }
    lcs_len as f64 / longest as f64
}
