//! Glob matching for `KEYS <pattern>`.
//!
//! Supported syntax:
//! - `*` any run of bytes, including none
//! - `?` exactly one byte
//! - `[abc]`, `[a-z]`, `[^abc]` one byte from (or not from) a class
//! - `\x` the literal byte `x`

/// Returns true if `text` matches the glob `pattern`.
///
/// Runs in `O(pattern * text)` time: on a mismatch only the most recent `*`
/// is retried, one byte further along.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let (pattern, text) = (pattern.as_bytes(), text.as_bytes());
    let (mut p, mut t) = (0, 0);
    // Pattern index after the last `*`, and where in the text it resumes.
    let mut retry: Option<(usize, usize)> = None;

    while t < text.len() {
        if pattern.get(p) == Some(&b'*') {
            p += 1;
            retry = Some((p, t));
            continue;
        }

        if let Some(next) = match_byte(pattern, p, text[t]) {
            p = next;
            t += 1;
            continue;
        }

        match retry {
            Some((after_star, resume)) => {
                p = after_star;
                t = resume + 1;
                retry = Some((after_star, t));
            }
            None => return false,
        }
    }

    pattern[p..].iter().all(|&b| b == b'*')
}

/// Matches the single-byte token at `pattern[p]` against `c`.
///
/// Returns the index of the next token on success.
fn match_byte(pattern: &[u8], p: usize, c: u8) -> Option<usize> {
    let (&head, tail) = pattern.get(p..)?.split_first()?;

    match head {
        b'?' => Some(p + 1),
        b'[' => {
            let end = class_end(tail)?;
            class_contains(&tail[..end], c).then_some(p + end + 2)
        }
        b'\\' if !tail.is_empty() => (tail[0] == c).then_some(p + 2),
        literal => (literal == c).then_some(p + 1),
    }
}

/// Index of the closing `]` within a class body.
fn class_end(body: &[u8]) -> Option<usize> {
    // A `]` right after the opening bracket (or `[^`) is a literal member.
    let start = match body.first() {
        Some(b'^') => 2,
        _ => 1,
    };
    body.iter()
        .skip(start)
        .position(|&b| b == b']')
        .map(|p| p + start)
}

fn class_contains(class: &[u8], c: u8) -> bool {
    let (negate, members) = match class.split_first() {
        Some((b'^', rest)) => (true, rest),
        _ => (false, class),
    };

    let mut found = false;
    let mut i = 0;
    while i < members.len() {
        if i + 2 < members.len() && members[i + 1] == b'-' {
            let (lo, hi) = (members[i].min(members[i + 2]), members[i].max(members[i + 2]));
            found |= (lo..=hi).contains(&c);
            i += 3;
        } else {
            found |= members[i] == c;
            i += 1;
        }
    }

    found != negate
}
