//! Shared argument-parsing helpers used across the `commands::*` modules.

use crate::error::CommandError;

pub fn parse_i64(token: &[u8]) -> Result<i64, CommandError> {
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(CommandError::not_an_integer)
}

pub fn parse_f64(token: &[u8]) -> Result<f64, CommandError> {
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(CommandError::not_a_float)
}

pub fn parse_usize(token: &[u8]) -> Result<usize, CommandError> {
    let n = parse_i64(token)?;
    usize::try_from(n).map_err(|_| CommandError::out_of_range())
}

/// Normalizes a Redis-style negative-from-the-end index (`-1` = last
/// element) against a container of length `len`. Returns `None` if, after
/// normalization, the index still falls outside `[0, len)`.
pub fn normalize_index(len: usize, index: i64) -> Option<usize> {
    let resolved = if index < 0 { index + len as i64 } else { index };
    if resolved < 0 || resolved as usize >= len {
        None
    } else {
        Some(resolved as usize)
    }
}

/// Normalizes a `start`/`stop` range the way `LRANGE`/`ZRANGE`/`LTRIM` do:
/// negative indices count from the end, and the resulting bounds are
/// clamped into `[0, len]` rather than rejected, so an out-of-range
/// request yields an empty (or truncated) slice instead of an error.
pub fn normalize_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let clamp = |i: i64| -> i64 {
        let resolved = if i < 0 { i + len as i64 } else { i };
        resolved.clamp(0, len as i64 - 1)
    };
    let start = if start < 0 && start + (len as i64) < 0 { 0 } else { clamp(start) };
    let stop = if stop < 0 && stop + (len as i64) < 0 { -1 } else { clamp(stop) };
    if stop < start {
        return None;
    }
    Some((start as usize, stop as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_index_resolves_negative_from_end() {
        assert_eq!(normalize_index(3, -1), Some(2));
        assert_eq!(normalize_index(3, 0), Some(0));
        assert_eq!(normalize_index(3, 3), None);
        assert_eq!(normalize_index(3, -4), None);
    }

    #[test]
    fn normalize_range_clamps_and_rejects_empty() {
        assert_eq!(normalize_range(5, 0, -1), Some((0, 4)));
        assert_eq!(normalize_range(5, -2, -1), Some((3, 4)));
        assert_eq!(normalize_range(5, 3, 1), None);
        assert_eq!(normalize_range(0, 0, -1), None);
    }
}
