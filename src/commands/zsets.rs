//! `spec.md` §4.6 "Sorted sets" (over the `sortedSets` namespace), plus the
//! blocking `BZPOPMAX`/`BZPOPMIN` handlers.
//!
//! Per `spec.md` §9's design note, the sorted set stays the simple
//! `{member -> score}` map the teacher's `obj.rs` models it as; the
//! contract only fixes the *result order*, not the internal structure, so
//! each range query re-sorts rather than maintaining a skiplist.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::args::{normalize_range, parse_f64, parse_i64, parse_usize};
use crate::bounds::{LexBound, ScoreBound};
use crate::error::CommandError;
use crate::pattern::glob_match;
use crate::rand_pick::RandomPick;
use crate::reply::Reply;
use crate::store::Store;

use super::{Args, HandlerResult};

/// Ascending by `(score, member)` — the tie-break from `spec.md` §3
/// invariant 3. `Vec<u8>`'s `Ord` is already byte-lexicographic.
fn sorted_ascending(zset: &BTreeMap<Vec<u8>, f64>) -> Vec<(Vec<u8>, f64)> {
    let mut items: Vec<(Vec<u8>, f64)> = zset.iter().map(|(m, &s)| (m.clone(), s)).collect();
    items.sort_by(|(ma, sa), (mb, sb)| sa.partial_cmp(sb).unwrap_or(Ordering::Equal).then_with(|| ma.cmp(mb)));
    items
}

fn with_scores(items: Vec<(Vec<u8>, f64)>, with_scores: bool) -> Reply {
    if with_scores {
        Reply::array(items.into_iter().flat_map(|(m, s)| [Reply::BulkString(m), Reply::score_bulk(s)]).collect())
    } else {
        Reply::bulk_array(items.into_iter().map(|(m, _)| m))
    }
}

struct ZaddFlags {
    xx: bool,
    nx: bool,
    lt: bool,
    gt: bool,
    ch: bool,
    incr: bool,
}

fn parse_zadd_flags(args: Args) -> (ZaddFlags, usize) {
    let mut flags = ZaddFlags { xx: false, nx: false, lt: false, gt: false, ch: false, incr: false };
    let mut i = 1;
    while i < args.len() {
        match args[i].to_ascii_uppercase().as_slice() {
            b"XX" => flags.xx = true,
            b"NX" => flags.nx = true,
            b"LT" => flags.lt = true,
            b"GT" => flags.gt = true,
            b"CH" => flags.ch = true,
            b"INCR" => flags.incr = true,
            _ => break,
        }
        i += 1;
    }
    (flags, i)
}

pub fn zadd(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() < 3 {
        return Err(CommandError::wrong_arity("zadd"));
    }
    let key = &args[0];
    let (flags, rest_start) = parse_zadd_flags(args);
    let rest = &args[rest_start..];
    if rest.is_empty() || rest.len() % 2 != 0 {
        return Err(CommandError::syntax());
    }
    if flags.incr && rest.len() != 2 {
        return Err(CommandError::syntax());
    }

    let zset = store.zset_entry(key)?;

    if flags.incr {
        let score_delta = parse_f64(&rest[0])?;
        let member = rest[1].clone();
        let existing = zset.get(&member).copied();
        if (flags.nx && existing.is_some()) || (flags.xx && existing.is_none()) {
            return Ok(Reply::NullBulk);
        }
        let new_score = existing.unwrap_or(0.0) + score_delta;
        zset.insert(member, new_score);
        return Ok(Reply::score_bulk(new_score));
    }

    let mut added = 0i64;
    let mut changed = 0i64;
    for pair in rest.chunks(2) {
        let score = parse_f64(&pair[0])?;
        let member = pair[1].clone();
        match zset.get(&member).copied() {
            None => {
                if flags.xx {
                    continue;
                }
                zset.insert(member, score);
                added += 1;
                changed += 1;
            }
            Some(old) => {
                if flags.nx {
                    continue;
                }
                let allowed = if flags.lt {
                    score < old
                } else if flags.gt {
                    score > old
                } else {
                    true
                };
                if allowed && score != old {
                    zset.insert(member, score);
                    changed += 1;
                }
            }
        }
    }
    Ok(Reply::Integer(if flags.ch { changed } else { added }))
}

pub fn zcard(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    let key = args.first().ok_or_else(|| CommandError::wrong_arity("zcard"))?;
    let len = store.get_zset(key)?.map(|z| z.len()).unwrap_or(0);
    Ok(Reply::Integer(len as i64))
}

pub fn zscore(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 2 {
        return Err(CommandError::wrong_arity("zscore"));
    }
    match store.get_zset(&args[0])?.and_then(|z| z.get(&args[1])) {
        Some(&score) => Ok(Reply::score_bulk(score)),
        None => Ok(Reply::NullBulk),
    }
}

pub fn zmscore(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() < 2 {
        return Err(CommandError::wrong_arity("zmscore"));
    }
    let zset = store.get_zset(&args[0])?;
    let results = args[1..]
        .iter()
        .map(|m| match zset.and_then(|z| z.get(m)) {
            Some(&score) => Reply::score_bulk(score),
            None => Reply::NullBulk,
        })
        .collect();
    Ok(Reply::array(results))
}

fn rank(store: &mut Store, args: Args, reverse: bool, name: &str) -> HandlerResult {
    if args.len() != 2 {
        return Err(CommandError::wrong_arity(name));
    }
    let zset = match store.get_zset(&args[0])? {
        Some(z) => z,
        None => return Ok(Reply::NullBulk),
    };
    let mut ordered = sorted_ascending(zset);
    if reverse {
        ordered.reverse();
    }
    match ordered.iter().position(|(m, _)| m == &args[1]) {
        Some(pos) => Ok(Reply::Integer(pos as i64)),
        None => Ok(Reply::NullBulk),
    }
}

pub fn zrank(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    rank(store, args, false, "zrank")
}

pub fn zrevrank(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    rank(store, args, true, "zrevrank")
}

pub fn zincrby(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 3 {
        return Err(CommandError::wrong_arity("zincrby"));
    }
    let delta = parse_f64(&args[1])?;
    let zset = store.zset_entry(&args[0])?;
    let updated = zset.get(&args[2]).copied().unwrap_or(0.0) + delta;
    zset.insert(args[2].clone(), updated);
    Ok(Reply::score_bulk(updated))
}

fn range_by_rank(store: &mut Store, args: Args, reverse: bool, name: &str) -> HandlerResult {
    if args.len() < 3 {
        return Err(CommandError::wrong_arity(name));
    }
    let start = parse_i64(&args[1])?;
    let stop = parse_i64(&args[2])?;
    let want_scores = args.get(3).map(|t| t.eq_ignore_ascii_case(b"WITHSCORES")).unwrap_or(false);

    let zset = match store.get_zset(&args[0])? {
        Some(z) => z,
        None => return Ok(Reply::array(Vec::new())),
    };
    let mut ordered = sorted_ascending(zset);
    if reverse {
        ordered.reverse();
    }
    let items = match normalize_range(ordered.len(), start, stop) {
        Some((s, e)) => ordered[s..=e].to_vec(),
        None => Vec::new(),
    };
    Ok(with_scores(items, want_scores))
}

pub fn zrange(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    range_by_rank(store, args, false, "zrange")
}

pub fn zrevrange(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    range_by_rank(store, args, true, "zrevrange")
}

fn parse_limit(args: Args, from: usize) -> Result<Option<(usize, i64)>, CommandError> {
    if from >= args.len() {
        return Ok(None);
    }
    if !args[from].eq_ignore_ascii_case(b"LIMIT") {
        return Err(CommandError::syntax());
    }
    let offset = parse_usize(args.get(from + 1).ok_or_else(CommandError::syntax)?)?;
    let count = parse_i64(args.get(from + 2).ok_or_else(CommandError::syntax)?)?;
    Ok(Some((offset, count)))
}

fn apply_limit<T>(items: Vec<T>, limit: Option<(usize, i64)>) -> Vec<T> {
    match limit {
        None => items,
        Some((offset, count)) => {
            let tail: Vec<T> = items.into_iter().skip(offset).collect();
            if count < 0 {
                tail
            } else {
                tail.into_iter().take(count as usize).collect()
            }
        }
    }
}

fn range_by_score(store: &mut Store, args: Args, reverse: bool, name: &str) -> HandlerResult {
    if args.len() < 3 {
        return Err(CommandError::wrong_arity(name));
    }
    let (min_tok, max_tok) = if reverse { (&args[2], &args[1]) } else { (&args[1], &args[2]) };
    let min = ScoreBound::parse(min_tok)?;
    let max = ScoreBound::parse(max_tok)?;

    let mut want_scores = false;
    let mut limit = None;
    let mut i = 3;
    while i < args.len() {
        if args[i].eq_ignore_ascii_case(b"WITHSCORES") {
            want_scores = true;
            i += 1;
        } else if args[i].eq_ignore_ascii_case(b"LIMIT") {
            limit = parse_limit(args, i)?;
            i += 3;
        } else {
            return Err(CommandError::syntax());
        }
    }

    let zset = match store.get_zset(&args[0])? {
        Some(z) => z,
        None => return Ok(Reply::array(Vec::new())),
    };
    let mut ordered = sorted_ascending(zset);
    ordered.retain(|(_, s)| min.admits_as_min(*s) && max.admits_as_max(*s));
    if reverse {
        ordered.reverse();
    }
    let windowed = apply_limit(ordered, limit);
    Ok(with_scores(windowed, want_scores))
}

pub fn zrangebyscore(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    range_by_score(store, args, false, "zrangebyscore")
}

pub fn zrevrangebyscore(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    range_by_score(store, args, true, "zrevrangebyscore")
}

fn range_by_lex(store: &mut Store, args: Args, reverse: bool, name: &str) -> HandlerResult {
    if args.len() < 3 {
        return Err(CommandError::wrong_arity(name));
    }
    let (min_tok, max_tok) = if reverse { (&args[2], &args[1]) } else { (&args[1], &args[2]) };
    let min = LexBound::parse(min_tok)?;
    let max = LexBound::parse(max_tok)?;
    let limit = parse_limit(args, 3)?;

    let zset = match store.get_zset(&args[0])? {
        Some(z) => z,
        None => return Ok(Reply::array(Vec::new())),
    };
    let mut ordered = sorted_ascending(zset);
    ordered.retain(|(m, _)| min.admits_as_min(m) && max.admits_as_max(m));
    if reverse {
        ordered.reverse();
    }
    let windowed = apply_limit(ordered, limit);
    Ok(Reply::bulk_array(windowed.into_iter().map(|(m, _)| m)))
}

pub fn zrangebylex(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    range_by_lex(store, args, false, "zrangebylex")
}

pub fn zrevrangebylex(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    range_by_lex(store, args, true, "zrevrangebylex")
}

pub fn zlexcount(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 3 {
        return Err(CommandError::wrong_arity("zlexcount"));
    }
    let min = LexBound::parse(&args[1])?;
    let max = LexBound::parse(&args[2])?;
    let count = store
        .get_zset(&args[0])?
        .map(|z| z.keys().filter(|m| min.admits_as_min(m) && max.admits_as_max(m)).count())
        .unwrap_or(0);
    Ok(Reply::Integer(count as i64))
}

pub fn zcount(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 3 {
        return Err(CommandError::wrong_arity("zcount"));
    }
    let min = ScoreBound::parse(&args[1])?;
    let max = ScoreBound::parse(&args[2])?;
    let count = store
        .get_zset(&args[0])?
        .map(|z| z.values().filter(|&&s| min.admits_as_min(s) && max.admits_as_max(s)).count())
        .unwrap_or(0);
    Ok(Reply::Integer(count as i64))
}

pub fn zremrangebyrank(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 3 {
        return Err(CommandError::wrong_arity("zremrangebyrank"));
    }
    let start = parse_i64(&args[1])?;
    let stop = parse_i64(&args[2])?;
    let zset = match store.get_zset(&args[0])? {
        Some(z) => z.clone(),
        None => return Ok(Reply::Integer(0)),
    };
    let ordered = sorted_ascending(&zset);
    let to_remove: Vec<Vec<u8>> = match normalize_range(ordered.len(), start, stop) {
        Some((s, e)) => ordered[s..=e].iter().map(|(m, _)| m.clone()).collect(),
        None => Vec::new(),
    };
    let removed = to_remove.len();
    let mut remaining = zset;
    for m in &to_remove {
        remaining.remove(m.as_slice());
    }
    store.put_zset(&args[0], remaining)?;
    Ok(Reply::Integer(removed as i64))
}

pub fn zremrangebyscore(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 3 {
        return Err(CommandError::wrong_arity("zremrangebyscore"));
    }
    let min = ScoreBound::parse(&args[1])?;
    let max = ScoreBound::parse(&args[2])?;
    let zset = match store.get_zset(&args[0])? {
        Some(z) => z.clone(),
        None => return Ok(Reply::Integer(0)),
    };
    let mut remaining = zset.clone();
    let mut removed = 0;
    for (m, s) in &zset {
        if min.admits_as_min(*s) && max.admits_as_max(*s) {
            remaining.remove(m.as_slice());
            removed += 1;
        }
    }
    store.put_zset(&args[0], remaining)?;
    Ok(Reply::Integer(removed))
}

pub fn zremrangebylex(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 3 {
        return Err(CommandError::wrong_arity("zremrangebylex"));
    }
    let min = LexBound::parse(&args[1])?;
    let max = LexBound::parse(&args[2])?;
    let zset = match store.get_zset(&args[0])? {
        Some(z) => z.clone(),
        None => return Ok(Reply::Integer(0)),
    };
    let mut remaining = zset.clone();
    let mut removed = 0;
    for m in zset.keys() {
        if min.admits_as_min(m) && max.admits_as_max(m) {
            remaining.remove(m.as_slice());
            removed += 1;
        }
    }
    store.put_zset(&args[0], remaining)?;
    Ok(Reply::Integer(removed))
}

fn pop_extreme(store: &mut Store, args: Args, take_max: bool, name: &str) -> HandlerResult {
    if args.is_empty() || args.len() > 2 {
        return Err(CommandError::wrong_arity(name));
    }
    let count = match args.get(1) {
        Some(t) => parse_usize(t)?,
        None => 1,
    };
    let mut ordered = match store.get_zset(&args[0])? {
        Some(zset) => sorted_ascending(zset),
        None => return Ok(Reply::array(Vec::new())),
    };
    if take_max {
        ordered.reverse();
    }
    let take = count.min(ordered.len());
    let chosen: Vec<(Vec<u8>, f64)> = ordered.into_iter().take(take).collect();
    let zset = store.zset_entry(&args[0])?;
    for (m, _) in &chosen {
        zset.remove(m.as_slice());
    }
    let flat = chosen.into_iter().flat_map(|(m, s)| [Reply::BulkString(m), Reply::score_bulk_stripped(s)]).collect();
    Ok(Reply::array(flat))
}

pub fn zpopmin(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    pop_extreme(store, args, false, "zpopmin")
}

pub fn zpopmax(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    pop_extreme(store, args, true, "zpopmax")
}

pub fn zrandmember(store: &mut Store, rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.is_empty() || args.len() > 3 {
        return Err(CommandError::wrong_arity("zrandmember"));
    }
    let pairs: Vec<(Vec<u8>, f64)> = store.get_zset(&args[0])?.map(|z| z.iter().map(|(m, &s)| (m.clone(), s)).collect()).unwrap_or_default();

    match args.get(1) {
        None => match rand.select_one(&pairs) {
            Some((m, _)) => Ok(Reply::bulk(m)),
            None => Ok(Reply::NullBulk),
        },
        Some(count_token) => {
            let count = parse_i64(count_token)?;
            let with_scores_flag = args.get(2).map(|t| t.eq_ignore_ascii_case(b"WITHSCORES")).unwrap_or(false);
            let chosen = if count < 0 {
                rand.select_n_with_replacement(&pairs, (-count) as usize)
            } else {
                rand.select_n(&pairs, count as usize)
            };
            Ok(with_scores(chosen, with_scores_flag))
        }
    }
}

pub fn zscan(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() < 2 {
        return Err(CommandError::wrong_arity("zscan"));
    }
    let cursor = parse_usize(&args[1])?;
    let mut pattern: Option<Vec<u8>> = None;
    let mut count = 10usize;
    let mut i = 2;
    while i < args.len() {
        match args[i].to_ascii_uppercase().as_slice() {
            b"MATCH" => {
                pattern = Some(args.get(i + 1).ok_or_else(CommandError::syntax)?.clone());
                i += 2;
            }
            b"COUNT" => {
                count = parse_usize(args.get(i + 1).ok_or_else(CommandError::syntax)?)?;
                i += 2;
            }
            _ => return Err(CommandError::syntax()),
        }
    }

    let all: Vec<(Vec<u8>, f64)> = store.get_zset(&args[0])?.map(|z| z.iter().map(|(m, &s)| (m.clone(), s)).collect()).unwrap_or_default();
    let filtered: Vec<(Vec<u8>, f64)> = match &pattern {
        Some(p) => all.into_iter().filter(|(m, _)| glob_match(p, m)).collect(),
        None => all,
    };
    let window_end = (cursor + count).min(filtered.len());
    let window = if cursor < filtered.len() { &filtered[cursor..window_end] } else { &[] };
    let next_cursor = if window_end >= filtered.len() { 0 } else { window_end };
    let flat = window.iter().flat_map(|(m, s)| [Reply::BulkString(m.clone()), Reply::score_bulk_stripped(*s)]).collect();

    Ok(Reply::array(vec![Reply::bulk(next_cursor.to_string().into_bytes()), Reply::array(flat)]))
}

// -- ZDIFF/ZINTER/ZUNION family ---------------------------------------------

enum Aggregate {
    Sum,
    Min,
    Max,
}

impl Aggregate {
    fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            Aggregate::Sum => a + b,
            Aggregate::Min => a.min(b),
            Aggregate::Max => a.max(b),
        }
    }
}

struct CombineArgs {
    keys: Vec<Vec<u8>>,
    weights: Vec<f64>,
    aggregate: Aggregate,
    with_scores: bool,
}

fn parse_combine_args(args: Args, name: &str) -> Result<CombineArgs, CommandError> {
    if args.len() < 2 {
        return Err(CommandError::wrong_arity(name));
    }
    let num_keys = parse_usize(&args[0])?;
    if num_keys == 0 || args.len() < 1 + num_keys {
        return Err(CommandError::syntax());
    }
    let keys: Vec<Vec<u8>> = args[1..1 + num_keys].to_vec();
    let mut weights = vec![1.0; num_keys];
    let mut aggregate = Aggregate::Sum;
    let mut with_scores = false;

    let mut i = 1 + num_keys;
    while i < args.len() {
        match args[i].to_ascii_uppercase().as_slice() {
            b"WEIGHTS" => {
                if args.len() < i + 1 + num_keys {
                    return Err(CommandError::syntax());
                }
                let given: Result<Vec<f64>, CommandError> = args[i + 1..i + 1 + num_keys].iter().map(|t| parse_f64(t)).collect();
                let given = given?;
                if given.len() != num_keys {
                    return Err(CommandError::generic("syntax error"));
                }
                weights = given;
                i += 1 + num_keys;
            }
            b"AGGREGATE" => {
                aggregate = match args.get(i + 1).ok_or_else(CommandError::syntax)?.to_ascii_uppercase().as_slice() {
                    b"SUM" => Aggregate::Sum,
                    b"MIN" => Aggregate::Min,
                    b"MAX" => Aggregate::Max,
                    _ => return Err(CommandError::syntax()),
                };
                i += 2;
            }
            b"WITHSCORES" => {
                with_scores = true;
                i += 1;
            }
            _ => return Err(CommandError::syntax()),
        }
    }

    Ok(CombineArgs { keys, weights, aggregate, with_scores })
}

fn load_weighted_sets(store: &Store, args: &CombineArgs) -> Result<Vec<BTreeMap<Vec<u8>, f64>>, CommandError> {
    args.keys
        .iter()
        .zip(args.weights.iter())
        .map(|(key, &w)| {
            let zset = store.get_zset(key)?.cloned().unwrap_or_default();
            Ok(zset.into_iter().map(|(m, s)| (m, s * w)).collect())
        })
        .collect()
}

/// The source's `ZDIFF` reduction is symmetric-difference-like, not Redis's
/// "first minus rest" (`spec.md` §9 Open Questions). This implements the
/// Redis-compatible "first minus rest" semantics instead, since that is the
/// behavior callers of a Redis-compatible double actually rely on; the
/// divergence from the literal source is recorded in `DESIGN.md`.
fn zdiff_members(sets: &[BTreeMap<Vec<u8>, f64>]) -> BTreeMap<Vec<u8>, f64> {
    let Some((first, rest)) = sets.split_first() else {
        return BTreeMap::new();
    };
    first.iter().filter(|(m, _)| !rest.iter().any(|s| s.contains_key(*m))).map(|(m, &s)| (m.clone(), s)).collect()
}

fn zinter_members(sets: &[BTreeMap<Vec<u8>, f64>], aggregate: &Aggregate) -> BTreeMap<Vec<u8>, f64> {
    let Some((first, rest)) = sets.split_first() else {
        return BTreeMap::new();
    };
    let mut result = first.clone();
    result.retain(|m, _| rest.iter().all(|s| s.contains_key(m)));
    for set in rest {
        for (m, score) in result.iter_mut() {
            if let Some(&other) = set.get(m) {
                *score = aggregate.apply(*score, other);
            }
        }
    }
    result
}

fn zunion_members(sets: &[BTreeMap<Vec<u8>, f64>], aggregate: &Aggregate) -> BTreeMap<Vec<u8>, f64> {
    let mut result = BTreeMap::new();
    for set in sets {
        for (m, &score) in set {
            result
                .entry(m.clone())
                .and_modify(|existing| *existing = aggregate.apply(*existing, score))
                .or_insert(score);
        }
    }
    result
}

fn combine_reply(combined: BTreeMap<Vec<u8>, f64>, with_scores: bool) -> Reply {
    with_scores(sorted_ascending(&combined), with_scores)
}

pub fn zdiff(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    let parsed = parse_combine_args(args, "zdiff")?;
    let sets = load_weighted_sets(store, &parsed)?;
    Ok(combine_reply(zdiff_members(&sets), parsed.with_scores))
}

pub fn zinter(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    let parsed = parse_combine_args(args, "zinter")?;
    let sets = load_weighted_sets(store, &parsed)?;
    Ok(combine_reply(zinter_members(&sets, &parsed.aggregate), parsed.with_scores))
}

pub fn zunion(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    let parsed = parse_combine_args(args, "zunion")?;
    let sets = load_weighted_sets(store, &parsed)?;
    Ok(combine_reply(zunion_members(&sets, &parsed.aggregate), parsed.with_scores))
}

fn combine_store(store: &mut Store, args: Args, name: &str, combine: impl Fn(&[BTreeMap<Vec<u8>, f64>], &Aggregate) -> BTreeMap<Vec<u8>, f64>) -> HandlerResult {
    if args.is_empty() {
        return Err(CommandError::wrong_arity(name));
    }
    let dest = &args[0];
    let parsed = parse_combine_args(&args[1..], name)?;
    let sets = load_weighted_sets(store, &parsed)?;
    let combined = combine(&sets, &parsed.aggregate);
    let len = combined.len();
    store.put_zset(dest, combined)?;
    Ok(Reply::Integer(len as i64))
}

pub fn zdiffstore(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    combine_store(store, args, "zdiffstore", |sets, _| zdiff_members(sets))
}

pub fn zinterstore(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    combine_store(store, args, "zinterstore", zinter_members)
}

pub fn zunionstore(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    combine_store(store, args, "zunionstore", zunion_members)
}

// -- blocking handlers (C7) --------------------------------------------------

fn blocking_pop_extreme(store: &mut Store, args: Args, take_max: bool, name: &str) -> Result<Option<Reply>, CommandError> {
    if args.is_empty() {
        return Err(CommandError::wrong_arity(name));
    }
    for key in args {
        let zset = match store.get_zset(key)? {
            Some(z) if !z.is_empty() => z.clone(),
            _ => continue,
        };
        let mut ordered = sorted_ascending(&zset);
        if take_max {
            ordered.reverse();
        }
        let (member, score) = ordered[0].clone();
        store.zset_entry(key)?.remove(member.as_slice());
        return Ok(Some(Reply::array(vec![Reply::bulk(key.clone()), Reply::BulkString(member), Reply::score_bulk_stripped(score)])));
    }
    Ok(None)
}

/// Per `spec.md` §9's flag: the source may return `NullBulk` on timeout for
/// these two; this implementation uses `NullArray` (matching real Redis and
/// the other five blocking commands) — see `SPEC_FULL.md` §3.
pub fn bzpopmin(store: &mut Store, _rand: &mut RandomPick, args: Args) -> Result<Option<Reply>, CommandError> {
    blocking_pop_extreme(store, args, false, "bzpopmin")
}

pub fn bzpopmax(store: &mut Store, _rand: &mut RandomPick, args: Args) -> Result<Option<Reply>, CommandError> {
    blocking_pop_extreme(store, args, true, "bzpopmax")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rand() -> RandomPick {
        RandomPick::from_seed(Some(1))
    }

    #[test]
    fn zadd_xx_updates_existing_only() {
        let mut store = Store::new();
        let mut r = rand();
        zadd(&mut store, &mut r, &[b"z".to_vec(), b"1".to_vec(), b"a".to_vec()]).unwrap();
        zadd(&mut store, &mut r, &[b"z".to_vec(), b"XX".to_vec(), b"2".to_vec(), b"a".to_vec()]).unwrap();
        assert_eq!(zscore(&mut store, &mut r, &[b"z".to_vec(), b"a".to_vec()]).unwrap(), Reply::bulk(b"2".to_vec()));
    }

    #[test]
    fn zadd_nx_keeps_first_write() {
        let mut store = Store::new();
        let mut r = rand();
        zadd(&mut store, &mut r, &[b"z".to_vec(), b"NX".to_vec(), b"1".to_vec(), b"a".to_vec()]).unwrap();
        zadd(&mut store, &mut r, &[b"z".to_vec(), b"NX".to_vec(), b"2".to_vec(), b"a".to_vec()]).unwrap();
        assert_eq!(zscore(&mut store, &mut r, &[b"z".to_vec(), b"a".to_vec()]).unwrap(), Reply::bulk(b"1".to_vec()));
    }

    #[test]
    fn zrangebyscore_exclusive_bound_excludes_endpoint() {
        let mut store = Store::new();
        let mut r = rand();
        let args = vec![b"z".to_vec(), b"1".to_vec(), b"a".to_vec(), b"2".to_vec(), b"b".to_vec(), b"3".to_vec(), b"c".to_vec()];
        zadd(&mut store, &mut r, &args).unwrap();
        let range_args = vec![b"z".to_vec(), b"(1".to_vec(), b"3".to_vec()];
        assert_eq!(
            zrangebyscore(&mut store, &mut r, &range_args).unwrap(),
            Reply::bulk_array(vec![b"b".to_vec(), b"c".to_vec()])
        );
    }

    #[test]
    fn zunionstore_applies_weights_and_sum_aggregate() {
        let mut store = Store::new();
        let mut r = rand();
        zadd(&mut store, &mut r, &[b"z".to_vec(), b"1".to_vec(), b"a".to_vec(), b"2".to_vec(), b"b".to_vec()]).unwrap();
        let args = vec![
            b"out".to_vec(),
            b"2".to_vec(),
            b"z".to_vec(),
            b"z".to_vec(),
            b"WEIGHTS".to_vec(),
            b"1".to_vec(),
            b"2".to_vec(),
            b"AGGREGATE".to_vec(),
            b"SUM".to_vec(),
        ];
        assert_eq!(zunionstore(&mut store, &mut r, &args).unwrap(), Reply::Integer(2));
        assert_eq!(zscore(&mut store, &mut r, &[b"out".to_vec(), b"a".to_vec()]).unwrap(), Reply::bulk(b"3".to_vec()));
    }

    #[test]
    fn zunionstore_weight_arity_mismatch_errors() {
        let mut store = Store::new();
        let mut r = rand();
        zadd(&mut store, &mut r, &[b"z".to_vec(), b"1".to_vec(), b"a".to_vec()]).unwrap();
        let args = vec![b"out".to_vec(), b"1".to_vec(), b"z".to_vec(), b"WEIGHTS".to_vec(), b"1".to_vec(), b"2".to_vec()];
        assert!(zunionstore(&mut store, &mut r, &args).is_err());
    }

    #[test]
    fn end_to_end_scenario_from_spec() {
        let mut store = Store::new();
        let mut r = rand();
        let add = vec![b"z".to_vec(), b"1".to_vec(), b"a".to_vec(), b"2".to_vec(), b"b".to_vec(), b"3".to_vec(), b"c".to_vec()];
        assert_eq!(zadd(&mut store, &mut r, &add).unwrap(), Reply::Integer(3));

        let rbs = vec![b"z".to_vec(), b"(1".to_vec(), b"+inf".to_vec(), b"WITHSCORES".to_vec()];
        assert_eq!(
            zrangebyscore(&mut store, &mut r, &rbs).unwrap(),
            Reply::array(vec![
                Reply::bulk(b"b".to_vec()),
                Reply::bulk(b"2".to_vec()),
                Reply::bulk(b"c".to_vec()),
                Reply::bulk(b"3".to_vec()),
            ])
        );

        let rmrs = vec![b"z".to_vec(), b"-inf".to_vec(), b"2".to_vec()];
        assert_eq!(zremrangebyscore(&mut store, &mut r, &rmrs).unwrap(), Reply::Integer(2));

        let range_args = vec![b"z".to_vec(), b"0".to_vec(), b"-1".to_vec()];
        assert_eq!(zrange(&mut store, &mut r, &range_args).unwrap(), Reply::bulk_array(vec![b"c".to_vec()]));
    }
}
