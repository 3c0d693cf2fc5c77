//! Range/bound types for sorted-set range queries.
//!
//! Parsed once at handler entry per `spec.md` §9's design note, rather than
//! re-parsed on every comparison.

use crate::error::CommandError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScoreBound {
    NegInf,
    PosInf,
    Open(f64),
    Closed(f64),
}

impl ScoreBound {
    pub fn parse(token: &[u8]) -> Result<ScoreBound, CommandError> {
        let text = std::str::from_utf8(token).map_err(|_| CommandError::syntax())?;
        match text {
            "-inf" => Ok(ScoreBound::NegInf),
            "+inf" | "inf" => Ok(ScoreBound::PosInf),
            _ if text.starts_with('(') => text[1..]
                .parse::<f64>()
                .map(ScoreBound::Open)
                .map_err(|_| CommandError::not_a_float()),
            _ => text.parse::<f64>().map(ScoreBound::Closed).map_err(|_| CommandError::not_a_float()),
        }
    }

    /// Whether `score` satisfies this bound as a lower bound.
    pub fn admits_as_min(&self, score: f64) -> bool {
        match self {
            ScoreBound::NegInf => true,
            ScoreBound::PosInf => false,
            ScoreBound::Open(v) => score > *v,
            ScoreBound::Closed(v) => score >= *v,
        }
    }

    /// Whether `score` satisfies this bound as an upper bound.
    pub fn admits_as_max(&self, score: f64) -> bool {
        match self {
            ScoreBound::PosInf => true,
            ScoreBound::NegInf => false,
            ScoreBound::Open(v) => score < *v,
            ScoreBound::Closed(v) => score <= *v,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LexBound {
    NegInf,
    PosInf,
    Open(Vec<u8>),
    Closed(Vec<u8>),
}

impl LexBound {
    pub fn parse(token: &[u8]) -> Result<LexBound, CommandError> {
        match token.first() {
            Some(b'-') if token.len() == 1 => Ok(LexBound::NegInf),
            Some(b'+') if token.len() == 1 => Ok(LexBound::PosInf),
            Some(b'(') => Ok(LexBound::Open(token[1..].to_vec())),
            Some(b'[') => Ok(LexBound::Closed(token[1..].to_vec())),
            _ => Err(CommandError::syntax()),
        }
    }

    pub fn admits_as_min(&self, member: &[u8]) -> bool {
        match self {
            LexBound::NegInf => true,
            LexBound::PosInf => false,
            LexBound::Open(v) => member > v.as_slice(),
            LexBound::Closed(v) => member >= v.as_slice(),
        }
    }

    pub fn admits_as_max(&self, member: &[u8]) -> bool {
        match self {
            LexBound::PosInf => true,
            LexBound::NegInf => false,
            LexBound::Open(v) => member < v.as_slice(),
            LexBound::Closed(v) => member <= v.as_slice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_bound_parses_infinities_and_exclusivity() {
        assert_eq!(ScoreBound::parse(b"-inf").unwrap(), ScoreBound::NegInf);
        assert_eq!(ScoreBound::parse(b"+inf").unwrap(), ScoreBound::PosInf);
        assert_eq!(ScoreBound::parse(b"(1").unwrap(), ScoreBound::Open(1.0));
        assert_eq!(ScoreBound::parse(b"3").unwrap(), ScoreBound::Closed(3.0));
    }

    #[test]
    fn score_bound_exclusive_excludes_endpoint() {
        let bound = ScoreBound::parse(b"(1").unwrap();
        assert!(!bound.admits_as_min(1.0));
        assert!(bound.admits_as_min(1.0001));
    }

    #[test]
    fn lex_bound_parses_brackets() {
        assert_eq!(LexBound::parse(b"[a").unwrap(), LexBound::Closed(b"a".to_vec()));
        assert_eq!(LexBound::parse(b"(a").unwrap(), LexBound::Open(b"a".to_vec()));
        assert_eq!(LexBound::parse(b"-").unwrap(), LexBound::NegInf);
        assert_eq!(LexBound::parse(b"+").unwrap(), LexBound::PosInf);
    }

    #[test]
    fn lex_bound_infinities_are_one_sided() {
        assert!(LexBound::PosInf.admits_as_max(b"anything"));
        assert!(!LexBound::PosInf.admits_as_min(b"anything"));
        assert!(LexBound::NegInf.admits_as_min(b"anything"));
        assert!(!LexBound::NegInf.admits_as_max(b"anything"));
    }
}
