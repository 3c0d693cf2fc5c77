//! `spec.md` §4.6 "Sets" (over the `sets` namespace).

use std::collections::BTreeSet;

use crate::args::{parse_i64, parse_usize};
use crate::error::CommandError;
use crate::pattern::glob_match;
use crate::rand_pick::RandomPick;
use crate::reply::Reply;
use crate::store::Store;

use super::{Args, HandlerResult};

pub fn sadd(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() < 2 {
        return Err(CommandError::wrong_arity("sadd"));
    }
    let set = store.set_entry(&args[0])?;
    let mut added = 0;
    for member in &args[1..] {
        if set.insert(member.clone()) {
            added += 1;
        }
    }
    Ok(Reply::Integer(added))
}

pub fn srem(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() < 2 {
        return Err(CommandError::wrong_arity("srem"));
    }
    let set = store.set_entry(&args[0])?;
    let mut removed = 0;
    for member in &args[1..] {
        if set.remove(member.as_slice()) {
            removed += 1;
        }
    }
    Ok(Reply::Integer(removed))
}

pub fn scard(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    let key = args.first().ok_or_else(|| CommandError::wrong_arity("scard"))?;
    let len = store.get_set(key)?.map(|s| s.len()).unwrap_or(0);
    Ok(Reply::Integer(len as i64))
}

pub fn sismember(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 2 {
        return Err(CommandError::wrong_arity("sismember"));
    }
    let is_member = store.get_set(&args[0])?.map(|s| s.contains(&args[1])).unwrap_or(false);
    Ok(Reply::Integer(is_member as i64))
}

pub fn smembers(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    let key = args.first().ok_or_else(|| CommandError::wrong_arity("smembers"))?;
    let members = store.get_set(key)?.cloned().unwrap_or_default();
    Ok(Reply::bulk_array(members))
}

fn read_sets(store: &Store, keys: &[Vec<u8>]) -> Result<Vec<BTreeSet<Vec<u8>>>, CommandError> {
    keys.iter().map(|k| Ok(store.get_set(k)?.cloned().unwrap_or_default())).collect()
}

/// Left-folds `op` over the key list, per `spec.md` §4.6.
fn fold_sets(store: &Store, keys: &[Vec<u8>], op: impl Fn(BTreeSet<Vec<u8>>, &BTreeSet<Vec<u8>>) -> BTreeSet<Vec<u8>>) -> Result<BTreeSet<Vec<u8>>, CommandError> {
    let sets = read_sets(store, keys)?;
    let mut iter = sets.into_iter();
    let first = iter.next().unwrap_or_default();
    Ok(iter.fold(first, |acc, s| op(acc, &s)))
}

pub fn sdiff(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.is_empty() {
        return Err(CommandError::wrong_arity("sdiff"));
    }
    let result = fold_sets(store, args, |acc, s| acc.difference(s).cloned().collect())?;
    Ok(Reply::bulk_array(result))
}

pub fn sinter(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.is_empty() {
        return Err(CommandError::wrong_arity("sinter"));
    }
    let result = fold_sets(store, args, |acc, s| acc.intersection(s).cloned().collect())?;
    Ok(Reply::bulk_array(result))
}

pub fn sunion(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.is_empty() {
        return Err(CommandError::wrong_arity("sunion"));
    }
    let result = fold_sets(store, args, |acc, s| acc.union(s).cloned().collect())?;
    Ok(Reply::bulk_array(result))
}

fn store_variant(store: &mut Store, args: Args, op: impl Fn(BTreeSet<Vec<u8>>, &BTreeSet<Vec<u8>>) -> BTreeSet<Vec<u8>>) -> HandlerResult {
    if args.len() < 2 {
        return Err(CommandError::wrong_arity("sstore"));
    }
    let dest = &args[0];
    let result = fold_sets(store, &args[1..], op)?;
    let len = result.len();
    store.put_set(dest, result)?;
    Ok(Reply::Integer(len as i64))
}

pub fn sdiffstore(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    store_variant(store, args, |acc, s| acc.difference(s).cloned().collect())
}

pub fn sinterstore(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    store_variant(store, args, |acc, s| acc.intersection(s).cloned().collect())
}

pub fn sunionstore(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    store_variant(store, args, |acc, s| acc.union(s).cloned().collect())
}

pub fn smove(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 3 {
        return Err(CommandError::wrong_arity("smove"));
    }
    let (src, dst, member) = (&args[0], &args[1], &args[2]);

    // Validate both sides' kinds before mutating either.
    store.check_kind(dst, crate::store::Kind::Set)?;
    let present = store.set_entry(src)?.remove(member.as_slice());
    if !present {
        return Ok(Reply::Integer(0));
    }
    store.set_entry(dst)?.insert(member.clone());
    Ok(Reply::Integer(1))
}

pub fn spop(store: &mut Store, rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.is_empty() || args.len() > 2 {
        return Err(CommandError::wrong_arity("spop"));
    }
    let key = &args[0];
    match args.get(1) {
        None => {
            let members: Vec<Vec<u8>> = match store.get_set(key)? {
                Some(set) => set.iter().cloned().collect(),
                None => return Ok(Reply::NullBulk),
            };
            match rand.select_one(&members) {
                Some(chosen) => {
                    store.set_entry(key)?.remove(chosen.as_slice());
                    Ok(Reply::bulk(chosen))
                }
                None => Ok(Reply::NullBulk),
            }
        }
        Some(count_token) => {
            let count = parse_usize(count_token)?;
            let members: Vec<Vec<u8>> = match store.get_set(key)? {
                Some(set) => set.iter().cloned().collect(),
                None => return Ok(Reply::bulk_array(Vec::new())),
            };
            let chosen = rand.select_n(&members, count);
            let set = store.set_entry(key)?;
            for m in &chosen {
                set.remove(m.as_slice());
            }
            Ok(Reply::bulk_array(chosen))
        }
    }
}

pub fn srandmember(store: &mut Store, rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.is_empty() || args.len() > 2 {
        return Err(CommandError::wrong_arity("srandmember"));
    }
    let key = &args[0];
    let members: Vec<Vec<u8>> = store.get_set(key)?.cloned().unwrap_or_default().into_iter().collect();
    match args.get(1) {
        None => match rand.select_one(&members) {
            Some(m) => Ok(Reply::bulk(m)),
            None => Ok(Reply::NullBulk),
        },
        Some(count_token) => {
            let count = parse_i64(count_token)?;
            let chosen = if count < 0 {
                rand.select_n_with_replacement(&members, (-count) as usize)
            } else {
                rand.select_n(&members, count as usize)
            };
            Ok(Reply::bulk_array(chosen))
        }
    }
}

pub fn sscan(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() < 2 {
        return Err(CommandError::wrong_arity("sscan"));
    }
    let key = &args[0];
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

    let all: Vec<Vec<u8>> = store.get_set(key)?.cloned().unwrap_or_default().into_iter().collect();
    let filtered: Vec<Vec<u8>> = match &pattern {
        Some(p) => all.into_iter().filter(|m| glob_match(p, m)).collect(),
        None => all,
    };

    let window_end = (cursor + count).min(filtered.len());
    let window = if cursor < filtered.len() { filtered[cursor..window_end].to_vec() } else { Vec::new() };
    let next_cursor = if window_end >= filtered.len() { 0 } else { window_end };

    Ok(Reply::array(vec![Reply::bulk(next_cursor.to_string().into_bytes()), Reply::bulk_array(window)]))
}
