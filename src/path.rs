//! Path normalization and group-path joining.

use crate::error::Error;

/// Longest path a route group may produce, in bytes.
pub const MAX_PATH_LENGTH: usize = 255;

/// Strips one trailing `/`, leaving the root path untouched.
///
/// An empty path is the root.
pub(crate) fn normalize(path: &str) -> &str {
    match path {
        "" | "/" => "/",
        _ => path.strip_suffix('/').unwrap_or(path),
    }
}

/// Joins a group base path and a sub-path into one clean route path.
///
/// Empty and `.` segments are dropped, so `("/users/", "/")` becomes `/users`
/// and `("api", "v1//items")` becomes `/api/v1/items`. Any `..` is rejected
/// outright rather than resolved.
pub fn join(base: &str, sub: &str) -> Result<String, Error> {
    for part in [base, sub] {
        if part.contains("..") {
            return Err(Error::PathTraversal(part.to_owned()));
        }
    }

    let mut joined = String::with_capacity(base.len() + sub.len() + 1);
    for segment in base.split('/').chain(sub.split('/')) {
        if segment.is_empty() || segment == "." {
            continue;
        }
        joined.push('/');
        joined.push_str(segment);
    }
    if joined.is_empty() {
        joined.push('/');
    }

    if joined.len() > MAX_PATH_LENGTH {
        return Err(Error::PathTooLong(joined.len()));
    }
    Ok(joined)
}
