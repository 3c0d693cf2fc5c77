//! C1: the reply model.
//!
//! A tagged union of the wire-level reply shapes a Redis-compatible server
//! produces, kept independent of any actual wire encoding (RESP framing is
//! explicitly a collaborator's concern, not this crate's).

#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(Vec<u8>),
    NullBulk,
    Array(Vec<Reply>),
    NullArray,
}

impl Reply {
    pub fn ok() -> Reply {
        Reply::SimpleString("OK".to_string())
    }

    pub fn pong() -> Reply {
        Reply::SimpleString("PONG".to_string())
    }

    pub fn bulk(bytes: impl Into<Vec<u8>>) -> Reply {
        Reply::BulkString(bytes.into())
    }

    pub fn int(n: impl Into<i64>) -> Reply {
        Reply::Integer(n.into())
    }

    pub fn array(items: Vec<Reply>) -> Reply {
        Reply::Array(items)
    }

    pub fn bulk_array(items: impl IntoIterator<Item = Vec<u8>>) -> Reply {
        Reply::Array(items.into_iter().map(Reply::BulkString).collect())
    }

    /// Formats `score` the way `ZSCORE`/`ZINCRBY`/`ZADD INCR` do: the plain
    /// default `f64` textual form, no trailing-`.0` stripping.
    pub fn score_bulk(score: f64) -> Reply {
        Reply::BulkString(format!("{score}").into_bytes())
    }

    /// Formats `score` the way `ZPOPMIN`/`ZPOPMAX`/`ZSCAN` do: trailing
    /// `.0` is stripped so `1.0` renders as `"1"`, matching integer-looking
    /// scores in real Redis replies.
    pub fn score_bulk_stripped(score: f64) -> Reply {
        let text = format!("{score}");
        let stripped = text.strip_suffix(".0").unwrap_or(&text);
        Reply::BulkString(stripped.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_formatting_strips_only_on_stripped_variant() {
        assert_eq!(Reply::score_bulk(1.0), Reply::BulkString(b"1".to_vec()));
        assert_eq!(Reply::score_bulk_stripped(1.0), Reply::BulkString(b"1".to_vec()));
        assert_eq!(Reply::score_bulk(1.5), Reply::BulkString(b"1.5".to_vec()));
        assert_eq!(Reply::score_bulk_stripped(1.5), Reply::BulkString(b"1.5".to_vec()));
    }
}
