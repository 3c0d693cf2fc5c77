//! `spec.md` §4.6 "Lists" (over the `lists` namespace), including the
//! blocking handlers consumed by `blocking::run_blocking`.

use std::collections::VecDeque;

use crate::args::{normalize_index, normalize_range, parse_i64, parse_usize};
use crate::error::CommandError;
use crate::rand_pick::RandomPick;
use crate::reply::Reply;
use crate::store::Store;

use super::{Args, HandlerResult};

pub fn lpush(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() < 2 {
        return Err(CommandError::wrong_arity("lpush"));
    }
    let list = store.list_entry(&args[0])?;
    // LPUSH reverses its arg order as it pushes: `LPUSH k a b c` then
    // `LRANGE k 0 -1` yields `[c, b, a]`.
    for value in &args[1..] {
        list.push_front(value.clone());
    }
    Ok(Reply::Integer(list.len() as i64))
}

pub fn rpush(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() < 2 {
        return Err(CommandError::wrong_arity("rpush"));
    }
    let list = store.list_entry(&args[0])?;
    for value in &args[1..] {
        list.push_back(value.clone());
    }
    Ok(Reply::Integer(list.len() as i64))
}

pub fn lpushx(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() < 2 {
        return Err(CommandError::wrong_arity("lpushx"));
    }
    match store.list_mut(&args[0])? {
        Some(list) => {
            for value in &args[1..] {
                list.push_front(value.clone());
            }
            Ok(Reply::Integer(list.len() as i64))
        }
        None => Ok(Reply::Integer(0)),
    }
}

pub fn rpushx(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() < 2 {
        return Err(CommandError::wrong_arity("rpushx"));
    }
    match store.list_mut(&args[0])? {
        Some(list) => {
            for value in &args[1..] {
                list.push_back(value.clone());
            }
            Ok(Reply::Integer(list.len() as i64))
        }
        None => Ok(Reply::Integer(0)),
    }
}

pub fn llen(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    let key = args.first().ok_or_else(|| CommandError::wrong_arity("llen"))?;
    let len = store.get_list(key)?.map(|l| l.len()).unwrap_or(0);
    Ok(Reply::Integer(len as i64))
}

pub fn lrange(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 3 {
        return Err(CommandError::wrong_arity("lrange"));
    }
    let start = parse_i64(&args[1])?;
    let stop = parse_i64(&args[2])?;
    let list = store.get_list(&args[0])?;
    let items = match list {
        Some(list) => match normalize_range(list.len(), start, stop) {
            Some((s, e)) => list.iter().skip(s).take(e - s + 1).cloned().collect(),
            None => Vec::new(),
        },
        None => Vec::new(),
    };
    Ok(Reply::bulk_array(items))
}

pub fn lindex(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 2 {
        return Err(CommandError::wrong_arity("lindex"));
    }
    let index = parse_i64(&args[1])?;
    let list = store.get_list(&args[0])?;
    match list.and_then(|l| normalize_index(l.len(), index).map(|i| l[i].clone())) {
        Some(value) => Ok(Reply::bulk(value)),
        None => Ok(Reply::NullBulk),
    }
}

pub fn lset(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 3 {
        return Err(CommandError::wrong_arity("lset"));
    }
    let index = parse_i64(&args[1])?;
    let list = store.list_mut(&args[0])?.ok_or_else(CommandError::out_of_range)?;
    // Reproduces the source's index formula rather than the corrected
    // Redis one: a negative index resolves to `len - 1 + index`, so `-1`
    // names the *second*-to-last element. See `SPEC_FULL.md` §3.
    let resolved = if index < 0 { list.len() as i64 - 1 + index } else { index };
    if resolved < 0 || resolved as usize >= list.len() {
        return Err(CommandError::out_of_range());
    }
    list[resolved as usize] = args[2].clone();
    Ok(Reply::ok())
}

pub fn linsert(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 4 {
        return Err(CommandError::wrong_arity("linsert"));
    }
    let before = match args[1].to_ascii_uppercase().as_slice() {
        b"BEFORE" => true,
        b"AFTER" => false,
        _ => return Err(CommandError::syntax()),
    };
    match store.list_mut(&args[0])? {
        None => Ok(Reply::Integer(0)),
        Some(list) => match list.iter().position(|v| v == &args[2]) {
            None => Ok(Reply::Integer(-1)),
            Some(pos) => {
                let insert_at = if before { pos } else { pos + 1 };
                list.insert(insert_at, args[3].clone());
                Ok(Reply::Integer(list.len() as i64))
            }
        },
    }
}

pub fn lrem(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 3 {
        return Err(CommandError::wrong_arity("lrem"));
    }
    let count = parse_i64(&args[1])?;
    let target = &args[2];
    let list = match store.list_mut(&args[0])? {
        Some(list) => list,
        None => return Ok(Reply::Integer(0)),
    };

    let mut removed = 0i64;
    if count >= 0 {
        let limit = if count == 0 { usize::MAX } else { count as usize };
        let mut kept = VecDeque::with_capacity(list.len());
        for value in list.drain(..) {
            if removed < limit as i64 && &value == target {
                removed += 1;
            } else {
                kept.push_back(value);
            }
        }
        *list = kept;
    } else {
        let limit = (-count) as usize;
        let mut kept: VecDeque<Vec<u8>> = VecDeque::with_capacity(list.len());
        for value in list.drain(..).rev() {
            if (removed as usize) < limit && &value == target {
                removed += 1;
            } else {
                kept.push_front(value);
            }
        }
        *list = kept;
    }
    store.remove_list_if_empty(&args[0]);
    Ok(Reply::Integer(removed))
}

pub fn ltrim(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 3 {
        return Err(CommandError::wrong_arity("ltrim"));
    }
    let start = parse_i64(&args[1])?;
    let stop = parse_i64(&args[2])?;
    if let Some(list) = store.list_mut(&args[0])? {
        match normalize_range(list.len(), start, stop) {
            Some((s, e)) => {
                let trimmed: VecDeque<Vec<u8>> = list.iter().skip(s).take(e - s + 1).cloned().collect();
                *list = trimmed;
            }
            None => list.clear(),
        }
    }
    store.remove_list_if_empty(&args[0]);
    Ok(Reply::ok())
}

fn pop_n(list: &mut VecDeque<Vec<u8>>, count: usize, from_left: bool) -> Vec<Vec<u8>> {
    let take = count.min(list.len());
    (0..take)
        .filter_map(|_| if from_left { list.pop_front() } else { list.pop_back() })
        .collect()
}

fn pop_generic(store: &mut Store, args: Args, from_left: bool, name: &str) -> HandlerResult {
    if args.is_empty() || args.len() > 2 {
        return Err(CommandError::wrong_arity(name));
    }
    let key = &args[0];
    let list = match store.list_mut(key)? {
        Some(list) => list,
        None => {
            return match args.get(1) {
                None => Ok(Reply::NullBulk),
                Some(_) => Ok(Reply::NullArray),
            }
        }
    };
    let result = match args.get(1) {
        None => {
            let value = if from_left { list.pop_front() } else { list.pop_back() };
            store.remove_list_if_empty(key);
            return Ok(value.map(Reply::bulk).unwrap_or(Reply::NullBulk));
        }
        Some(count_token) => {
            let count = parse_usize(count_token)?;
            pop_n(list, count, from_left)
        }
    };
    store.remove_list_if_empty(key);
    Ok(Reply::bulk_array(result))
}

pub fn lpop(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    pop_generic(store, args, true, "lpop")
}

pub fn rpop(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    pop_generic(store, args, false, "rpop")
}

fn move_one(store: &mut Store, src: &[u8], dst: &[u8], src_left: bool, dst_left: bool) -> Result<Option<Vec<u8>>, CommandError> {
    store.check_kind(dst, crate::store::Kind::List)?;
    let value = match store.list_mut(src)? {
        Some(list) => {
            if src_left {
                list.pop_front()
            } else {
                list.pop_back()
            }
        }
        None => None,
    };
    store.remove_list_if_empty(src);
    let Some(value) = value else {
        return Ok(None);
    };
    let dst_list = store.list_entry(dst)?;
    if dst_left {
        dst_list.push_front(value.clone());
    } else {
        dst_list.push_back(value.clone());
    }
    Ok(Some(value))
}

pub fn rpoplpush(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 2 {
        return Err(CommandError::wrong_arity("rpoplpush"));
    }
    match move_one(store, &args[0], &args[1], false, true)? {
        Some(value) => Ok(Reply::bulk(value)),
        None => Ok(Reply::NullBulk),
    }
}

fn parse_side(token: &[u8]) -> Result<bool, CommandError> {
    match token.to_ascii_uppercase().as_slice() {
        b"LEFT" => Ok(true),
        b"RIGHT" => Ok(false),
        _ => Err(CommandError::syntax()),
    }
}

pub fn lmove(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() != 4 {
        return Err(CommandError::wrong_arity("lmove"));
    }
    let src_left = parse_side(&args[2])?;
    let dst_left = parse_side(&args[3])?;
    match move_one(store, &args[0], &args[1], src_left, dst_left)? {
        Some(value) => Ok(Reply::bulk(value)),
        None => Ok(Reply::NullBulk),
    }
}

pub fn lpos(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() < 2 {
        return Err(CommandError::wrong_arity("lpos"));
    }
    let element = &args[1];
    let mut rank: i64 = 1;
    let mut count: Option<usize> = None;
    let mut maxlen: usize = 0;

    let mut i = 2;
    while i < args.len() {
        match args[i].to_ascii_uppercase().as_slice() {
            b"RANK" => {
                rank = parse_i64(args.get(i + 1).ok_or_else(CommandError::syntax)?)?;
                if rank == 0 {
                    return Err(CommandError::syntax());
                }
                i += 2;
            }
            b"COUNT" => {
                count = Some(parse_usize(args.get(i + 1).ok_or_else(CommandError::syntax)?)?);
                i += 2;
            }
            b"MAXLEN" => {
                maxlen = parse_usize(args.get(i + 1).ok_or_else(CommandError::syntax)?)?;
                i += 2;
            }
            _ => return Err(CommandError::syntax()),
        }
    }

    let list = match store.get_list(&args[0])? {
        Some(list) => list,
        None => {
            return match count {
                Some(_) => Ok(Reply::array(Vec::new())),
                None => Ok(Reply::NullBulk),
            }
        }
    };

    let len = list.len();
    let window = if maxlen == 0 { len } else { maxlen.min(len) };
    let mut matches = Vec::new();
    let mut seen = 0usize;
    let mut skip = (rank.unsigned_abs() as usize).saturating_sub(1);

    if rank > 0 {
        for (idx, value) in list.iter().enumerate() {
            if seen >= window {
                break;
            }
            seen += 1;
            if value == element {
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                matches.push(idx as i64);
                if count.map(|c| c != 0 && matches.len() >= c).unwrap_or(true) {
                    break;
                }
            }
        }
    } else {
        for (idx, value) in list.iter().enumerate().rev() {
            if seen >= window {
                break;
            }
            seen += 1;
            if value == element {
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                matches.push(idx as i64);
                if count.map(|c| c != 0 && matches.len() >= c).unwrap_or(true) {
                    break;
                }
            }
        }
    }

    match count {
        Some(_) => Ok(Reply::array(matches.into_iter().map(Reply::Integer).collect())),
        None => Ok(matches.first().map(|&i| Reply::Integer(i)).unwrap_or(Reply::NullBulk)),
    }
}

// -- blocking handlers (C7) -------------------------------------------------

/// Shared body for `BLPOP`/`BRPOP`: fairness picks the first key,
/// left-to-right, whose list is non-empty (`spec.md` §4.7 clause 3).
///
/// `args` is the key list only — `blocking::run_blocking` has already
/// extracted and stripped the trailing timeout before calling a blocking
/// handler.
fn blocking_pop(store: &mut Store, args: Args, from_left: bool) -> Result<Option<Reply>, CommandError> {
    if args.is_empty() {
        return Err(CommandError::wrong_arity(if from_left { "blpop" } else { "brpop" }));
    }
    for key in args {
        if let Some(list) = store.list_mut(key)? {
            let value = if from_left { list.pop_front() } else { list.pop_back() };
            if let Some(value) = value {
                store.remove_list_if_empty(key);
                return Ok(Some(Reply::array(vec![Reply::bulk(key.clone()), Reply::bulk(value)])));
            }
        }
    }
    Ok(None)
}

pub fn blpop(store: &mut Store, _rand: &mut RandomPick, args: Args) -> Result<Option<Reply>, CommandError> {
    blocking_pop(store, args, true)
}

pub fn brpop(store: &mut Store, _rand: &mut RandomPick, args: Args) -> Result<Option<Reply>, CommandError> {
    blocking_pop(store, args, false)
}

pub fn brpoplpush(store: &mut Store, _rand: &mut RandomPick, args: Args) -> Result<Option<Reply>, CommandError> {
    if args.len() != 2 {
        return Err(CommandError::wrong_arity("brpoplpush"));
    }
    Ok(move_one(store, &args[0], &args[1], false, true)?.map(Reply::bulk))
}

pub fn blmove(store: &mut Store, _rand: &mut RandomPick, args: Args) -> Result<Option<Reply>, CommandError> {
    if args.len() != 4 {
        return Err(CommandError::wrong_arity("blmove"));
    }
    let src_left = parse_side(&args[2])?;
    let dst_left = parse_side(&args[3])?;
    Ok(move_one(store, &args[0], &args[1], src_left, dst_left)?.map(Reply::bulk))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rand() -> RandomPick {
        RandomPick::from_seed(Some(1))
    }

    #[test]
    fn lpush_then_lrange_reverses_push_order() {
        let mut store = Store::new();
        let mut r = rand();
        let args = vec![b"k".to_vec(), b"a".to_vec(), b"b".to_vec(), b"c".to_vec()];
        lpush(&mut store, &mut r, &args).unwrap();
        let range_args = vec![b"k".to_vec(), b"0".to_vec(), b"-1".to_vec()];
        let expect = Reply::bulk_array(vec![b"c".to_vec(), b"b".to_vec(), b"a".to_vec()]);
        assert_eq!(lrange(&mut store, &mut r, &range_args).unwrap(), expect);
    }

    #[test]
    fn lindex_and_lrange_on_missing_key_are_empty() {
        let mut store = Store::new();
        let mut r = rand();
        assert_eq!(lindex(&mut store, &mut r, &[b"missing".to_vec(), b"0".to_vec()]).unwrap(), Reply::NullBulk);
        let range_args = vec![b"missing".to_vec(), b"0".to_vec(), b"-1".to_vec()];
        assert_eq!(lrange(&mut store, &mut r, &range_args).unwrap(), Reply::array(Vec::new()));
    }

    #[test]
    fn lset_out_of_range_errors() {
        let mut store = Store::new();
        let mut r = rand();
        rpush(&mut store, &mut r, &[b"k".to_vec(), b"a".to_vec(), b"b".to_vec()]).unwrap();
        let args = vec![b"k".to_vec(), b"99".to_vec(), b"x".to_vec()];
        assert_eq!(lset(&mut store, &mut r, &args).unwrap_err(), CommandError::out_of_range());
    }

    #[test]
    fn lset_negative_index_uses_source_formula() {
        let mut store = Store::new();
        let mut r = rand();
        rpush(&mut store, &mut r, &[b"k".to_vec(), b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]).unwrap();
        // len=3, index=-1 -> resolved = 3 - 1 + (-1) = 1, i.e. "b", not "c".
        let args = vec![b"k".to_vec(), b"-1".to_vec(), b"x".to_vec()];
        lset(&mut store, &mut r, &args).unwrap();
        let range_args = vec![b"k".to_vec(), b"0".to_vec(), b"-1".to_vec()];
        assert_eq!(
            lrange(&mut store, &mut r, &range_args).unwrap(),
            Reply::bulk_array(vec![b"a".to_vec(), b"x".to_vec(), b"c".to_vec()])
        );
    }

    #[test]
    fn linsert_before_and_missing_pivot() {
        let mut store = Store::new();
        let mut r = rand();
        rpush(&mut store, &mut r, &[b"l".to_vec(), b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]).unwrap();
        let args = vec![b"l".to_vec(), b"BEFORE".to_vec(), b"2".to_vec(), b"X".to_vec()];
        assert_eq!(linsert(&mut store, &mut r, &args).unwrap(), Reply::Integer(4));
        let missing = vec![b"l".to_vec(), b"BEFORE".to_vec(), b"nope".to_vec(), b"X".to_vec()];
        assert_eq!(linsert(&mut store, &mut r, &missing).unwrap(), Reply::Integer(-1));
    }

    #[test]
    fn rpoplpush_moves_tail_to_head() {
        let mut store = Store::new();
        let mut r = rand();
        rpush(&mut store, &mut r, &[b"src".to_vec(), b"1".to_vec(), b"2".to_vec()]).unwrap();
        rpush(&mut store, &mut r, &[b"dst".to_vec(), b"9".to_vec()]).unwrap();
        let args = vec![b"src".to_vec(), b"dst".to_vec()];
        assert_eq!(rpoplpush(&mut store, &mut r, &args).unwrap(), Reply::bulk(b"2".to_vec()));
        let range_args = vec![b"dst".to_vec(), b"0".to_vec(), b"-1".to_vec()];
        assert_eq!(lrange(&mut store, &mut r, &range_args).unwrap(), Reply::bulk_array(vec![b"2".to_vec(), b"9".to_vec()]));
    }

    #[test]
    fn blpop_pops_from_first_nonempty_key() {
        let mut store = Store::new();
        let mut r = rand();
        rpush(&mut store, &mut r, &[b"b".to_vec(), b"v".to_vec()]).unwrap();
        let args = vec![b"a".to_vec(), b"b".to_vec()];
        let result = blpop(&mut store, &mut r, &args).unwrap();
        assert_eq!(result, Some(Reply::array(vec![Reply::bulk(b"b".to_vec()), Reply::bulk(b"v".to_vec())])));
    }

    #[test]
    fn blpop_on_all_empty_keys_reports_no_data() {
        let mut store = Store::new();
        let mut r = rand();
        let args = vec![b"a".to_vec(), b"b".to_vec()];
        assert_eq!(blpop(&mut store, &mut r, &args).unwrap(), None);
    }
}
