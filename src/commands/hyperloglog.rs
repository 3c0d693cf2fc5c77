//! `spec.md` §4.6 "HyperLogLog" over the `hyperloglogs` namespace.
//!
//! Per `spec.md` §9's design note, cardinality estimation is out of scope:
//! each HLL key is backed by the same exact `BTreeSet<Vec<u8>>` a regular
//! set uses, so `PFCOUNT` reports an exact distinct-element count rather
//! than a probabilistic one. Callers get correct answers, just not the
//! constant-memory trick the name promises.

use std::collections::BTreeSet;

use crate::error::CommandError;
use crate::rand_pick::RandomPick;
use crate::reply::Reply;
use crate::store::Store;

use super::{Args, HandlerResult};

pub fn pfadd(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.is_empty() {
        return Err(CommandError::wrong_arity("pfadd"));
    }
    let hll = store.hll_entry(&args[0])?;
    let mut changed = false;
    for element in &args[1..] {
        if hll.insert(element.clone()) {
            changed = true;
        }
    }
    Ok(Reply::Integer(changed as i64))
}

pub fn pfcount(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.is_empty() {
        return Err(CommandError::wrong_arity("pfcount"));
    }
    let mut union: BTreeSet<Vec<u8>> = BTreeSet::new();
    for key in args {
        if let Some(hll) = store.get_hll(key)? {
            union.extend(hll.iter().cloned());
        }
    }
    Ok(Reply::Integer(union.len() as i64))
}

pub fn pfmerge(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.is_empty() {
        return Err(CommandError::wrong_arity("pfmerge"));
    }
    let dest = &args[0];
    let mut union: BTreeSet<Vec<u8>> = store.get_hll(dest)?.cloned().unwrap_or_default();
    for key in &args[1..] {
        if let Some(hll) = store.get_hll(key)? {
            union.extend(hll.iter().cloned());
        }
    }
    store.put_hll(dest, union)?;
    Ok(Reply::ok())
}
