//! `spec.md` §4.6 "Hashes" (over the `hashes` namespace).

use crate::args::{parse_f64, parse_i64};
use crate::error::CommandError;
use crate::pattern::glob_match;
use crate::rand_pick::RandomPick;
use crate::reply::Reply;
use crate::store::Store;

use super::{Args, HandlerResult};

pub fn hset(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() < 3 || args.len() % 2 == 0 {
        return Err(CommandError::wrong_arity("hset"));
    }
    let hash = store.hash_entry(&args[0])?;
    let mut added = 0;
    for pair in args[1..].chunks(2) {
        if hash.insert(pair[0].clone(), pair[1].clone()).is_none() {
            added += 1;
        }
    }
    Ok(Reply::Integer(added))
}

/// `HMSET` shares `HSET`'s body but always replies `OK`.
pub fn hmset(store: &mut Store, rand: &mut RandomPick, args: Args) -> HandlerResult {
    hset(store, rand, args)?;
    Ok(Reply::ok())
}

pub fn hsetnx(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 3 {
        return Err(CommandError::wrong_arity("hsetnx"));
    }
    let hash = store.hash_entry(&args[0])?;
    if hash.contains_key(&args[1]) {
        Ok(Reply::Integer(0))
    } else {
        hash.insert(args[1].clone(), args[2].clone());
        Ok(Reply::Integer(1))
    }
}

pub fn hget(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 2 {
        return Err(CommandError::wrong_arity("hget"));
    }
    match store.get_hash(&args[0])?.and_then(|h| h.get(&args[1])) {
        Some(value) => Ok(Reply::bulk(value.clone())),
        None => Ok(Reply::NullBulk),
    }
}

pub fn hmget(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() < 2 {
        return Err(CommandError::wrong_arity("hmget"));
    }
    let hash = store.get_hash(&args[0])?;
    let results = args[1..]
        .iter()
        .map(|field| match hash.and_then(|h| h.get(field)) {
            Some(value) => Reply::BulkString(value.clone()),
            None => Reply::NullBulk,
        })
        .collect();
    Ok(Reply::array(results))
}

pub fn hdel(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() < 2 {
        return Err(CommandError::wrong_arity("hdel"));
    }
    let hash = store.hash_entry(&args[0])?;
    let mut removed = 0;
    for field in &args[1..] {
        if hash.remove(field.as_slice()).is_some() {
            removed += 1;
        }
    }
    store.remove_hash_if_empty(&args[0]);
    Ok(Reply::Integer(removed))
}

pub fn hexists(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 2 {
        return Err(CommandError::wrong_arity("hexists"));
    }
    let exists = store.get_hash(&args[0])?.map(|h| h.contains_key(&args[1])).unwrap_or(false);
    Ok(Reply::Integer(exists as i64))
}

pub fn hkeys(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    let key = args.first().ok_or_else(|| CommandError::wrong_arity("hkeys"))?;
    let keys = store.get_hash(key)?.map(|h| h.keys().cloned().collect()).unwrap_or_default();
    Ok(Reply::bulk_array(keys))
}

pub fn hvals(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    let key = args.first().ok_or_else(|| CommandError::wrong_arity("hvals"))?;
    let values = store.get_hash(key)?.map(|h| h.values().cloned().collect()).unwrap_or_default();
    Ok(Reply::bulk_array(values))
}

pub fn hlen(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    let key = args.first().ok_or_else(|| CommandError::wrong_arity("hlen"))?;
    let len = store.get_hash(key)?.map(|h| h.len()).unwrap_or(0);
    Ok(Reply::Integer(len as i64))
}

pub fn hgetall(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    let key = args.first().ok_or_else(|| CommandError::wrong_arity("hgetall"))?;
    let mut flat = Vec::new();
    if let Some(hash) = store.get_hash(key)? {
        for (field, value) in hash {
            flat.push(Reply::BulkString(field.clone()));
            flat.push(Reply::BulkString(value.clone()));
        }
    }
    Ok(Reply::array(flat))
}

pub fn hstrlen(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 2 {
        return Err(CommandError::wrong_arity("hstrlen"));
    }
    let len = store.get_hash(&args[0])?.and_then(|h| h.get(&args[1])).map(|v| v.len()).unwrap_or(0);
    Ok(Reply::Integer(len as i64))
}

pub fn hincrby(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 3 {
        return Err(CommandError::wrong_arity("hincrby"));
    }
    let delta = parse_i64(&args[2])?;
    let hash = store.hash_entry(&args[0])?;
    let current = match hash.get(&args[1]) {
        Some(v) => std::str::from_utf8(v).ok().and_then(|s| s.parse::<i64>().ok()).ok_or_else(|| CommandError::generic("hash value is not an integer"))?,
        None => 0,
    };
    let updated = current.wrapping_add(delta);
    hash.insert(args[1].clone(), updated.to_string().into_bytes());
    Ok(Reply::Integer(updated))
}

pub fn hincrbyfloat(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 3 {
        return Err(CommandError::wrong_arity("hincrbyfloat"));
    }
    let delta = parse_f64(&args[2])?;
    let hash = store.hash_entry(&args[0])?;
    let current = match hash.get(&args[1]) {
        Some(v) => std::str::from_utf8(v).ok().and_then(|s| s.parse::<f64>().ok()).ok_or_else(|| CommandError::generic("hash value is not a float"))?,
        None => 0.0,
    };
    let updated = current + delta;
    hash.insert(args[1].clone(), format!("{updated}").into_bytes());
    Ok(Reply::bulk(format!("{updated}").into_bytes()))
}

pub fn hrandfield(store: &mut Store, rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.is_empty() || args.len() > 3 {
        return Err(CommandError::wrong_arity("hrandfield"));
    }
    let pairs: Vec<(Vec<u8>, Vec<u8>)> = store
        .get_hash(&args[0])?
        .map(|h| h.iter().map(|(f, v)| (f.clone(), v.clone())).collect())
        .unwrap_or_default();

    match args.get(1) {
        None => match rand.select_one(&pairs) {
            Some((field, _)) => Ok(Reply::bulk(field)),
            None => Ok(Reply::NullBulk),
        },
        Some(count_token) => {
            let count = parse_i64(count_token)?;
            let with_values = args.get(2).map(|t| t.eq_ignore_ascii_case(b"WITHVALUES")).unwrap_or(false);
            let chosen = if count < 0 {
                rand.select_n_with_replacement(&pairs, (-count) as usize)
            } else {
                rand.select_n(&pairs, count as usize)
            };
            let items = if with_values {
                chosen.into_iter().flat_map(|(f, v)| [Reply::BulkString(f), Reply::BulkString(v)]).collect()
            } else {
                chosen.into_iter().map(|(f, _)| Reply::BulkString(f)).collect()
            };
            Ok(Reply::array(items))
        }
    }
}

pub fn hscan(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    use crate::args::parse_usize;

    if args.len() < 2 {
        return Err(CommandError::wrong_arity("hscan"));
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

    let all: Vec<(Vec<u8>, Vec<u8>)> = store.get_hash(&args[0])?.map(|h| h.iter().map(|(f, v)| (f.clone(), v.clone())).collect()).unwrap_or_default();
    let filtered: Vec<(Vec<u8>, Vec<u8>)> = match &pattern {
        Some(p) => all.into_iter().filter(|(f, _)| glob_match(p, f)).collect(),
        None => all,
    };

    let window_end = (cursor + count).min(filtered.len());
    let window = if cursor < filtered.len() { &filtered[cursor..window_end] } else { &[] };
    let next_cursor = if window_end >= filtered.len() { 0 } else { window_end };
    let flat = window.iter().flat_map(|(f, v)| [Reply::BulkString(f.clone()), Reply::BulkString(v.clone())]).collect();

    Ok(Reply::array(vec![Reply::bulk(next_cursor.to_string().into_bytes()), Reply::array(flat)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rand() -> RandomPick {
        RandomPick::from_seed(Some(1))
    }

    #[test]
    fn hset_hincrby_hgetall_scenario() {
        let mut store = Store::new();
        let mut r = rand();
        let args = vec![b"h".to_vec(), b"f1".to_vec(), b"v1".to_vec(), b"f2".to_vec(), b"v2".to_vec()];
        assert_eq!(hset(&mut store, &mut r, &args).unwrap(), Reply::Integer(2));
        assert_eq!(hincrby(&mut store, &mut r, &[b"h".to_vec(), b"n".to_vec(), b"5".to_vec()]).unwrap(), Reply::Integer(5));
        assert_eq!(hincrby(&mut store, &mut r, &[b"h".to_vec(), b"n".to_vec(), b"2".to_vec()]).unwrap(), Reply::Integer(7));

        match hgetall(&mut store, &mut r, &[b"h".to_vec()]).unwrap() {
            Reply::Array(items) => assert_eq!(items.len(), 6),
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn hdel_removes_key_once_hash_is_empty() {
        let mut store = Store::new();
        let mut r = rand();
        hset(&mut store, &mut r, &[b"h".to_vec(), b"f".to_vec(), b"v".to_vec()]).unwrap();
        assert_eq!(hdel(&mut store, &mut r, &[b"h".to_vec(), b"f".to_vec()]).unwrap(), Reply::Integer(1));
        assert_eq!(store.kind_of(b"h"), None);
    }

    #[test]
    fn hincrby_on_non_integer_field_errors() {
        let mut store = Store::new();
        let mut r = rand();
        hset(&mut store, &mut r, &[b"h".to_vec(), b"f".to_vec(), b"notanumber".to_vec()]).unwrap();
        assert!(hincrby(&mut store, &mut r, &[b"h".to_vec(), b"f".to_vec(), b"1".to_vec()]).is_err());
    }
}
