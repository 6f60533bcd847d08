//! Case-insensitive glob matching
//!
//! Supported syntax:
//! - `*` matches one or more characters, never `/` unless slash crossing is
//!   allowed. A trailing `*` swallows the rest of the candidate.
//! - `**` matches zero or more characters including `/`. Everything after a
//!   `**` is matched with slash crossing allowed.
//! - Any other character matches itself, ignoring case.
//!
//! The matcher backtracks: each wildcard tries the shortest span first and
//! grows it until the remainder of the pattern matches. Patterns are short
//! and user-authored; long runs of wildcards against long candidates are
//! exponential in the worst case.

/// Compare two characters ignoring case
#[inline]
pub fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Compare two strings ignoring case, character by character
pub fn str_eq_ignore_case(a: &str, b: &str) -> bool {
    let mut a = a.chars();
    let mut b = b.chars();
    loop {
        match (a.next(), b.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if chars_eq_ignore_case(x, y) => continue,
            _ => return false,
        }
    }
}

/// Match `candidate` against a glob `pattern`
pub fn match_glob(candidate: &str, pattern: &str, allow_slash_crossing: bool) -> bool {
    let candidate: Vec<char> = candidate.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    match_chars(&candidate, &pattern, allow_slash_crossing)
}

/// Match over pre-split characters
///
/// Used by rule evaluation, which tries many suffixes of one candidate and
/// should not re-collect the pattern each time.
pub(crate) fn match_chars(mut s: &[char], mut p: &[char], allow_slash_crossing: bool) -> bool {
    while let Some(&pc) = p.first() {
        if pc != '*' {
            match s.first() {
                Some(&sc) if chars_eq_ignore_case(sc, pc) => {
                    s = &s[1..];
                    p = &p[1..];
                    continue;
                }
                _ => return false,
            }
        }

        let double = p.get(1) == Some(&'*');
        p = if double { &p[2..] } else { &p[1..] };

        // Trailing wildcard takes the remainder
        if p.is_empty() {
            return double || !s.is_empty();
        }

        if double {
            return (0..=s.len()).any(|start| match_chars(&s[start..], p, true));
        }

        for (i, &c) in s.iter().enumerate() {
            if !allow_slash_crossing && c == '/' {
                break;
            }
            if match_chars(&s[i + 1..], p, allow_slash_crossing) {
                return true;
            }
        }
        return false;
    }

    s.is_empty()
}

/// Check whether any `/`-delimited segment of `relative_path` equals `name`
///
/// Comparison ignores case. An empty path has no segments.
pub fn contains_dir_segment(relative_path: &str, name: &str) -> bool {
    !relative_path.is_empty()
        && relative_path
            .split('/')
            .any(|segment| str_eq_ignore_case(segment, name))
}
