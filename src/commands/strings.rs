//! `spec.md` §4.6 "Strings": `SET key value [PX ms]`. TTL tokens are
//! parsed (so a malformed TTL still surfaces as an error) but never
//! enforced — see `SPEC_FULL.md` §3.

use crate::args::parse_i64;
use crate::error::CommandError;
use crate::rand_pick::RandomPick;
use crate::reply::Reply;
use crate::store::Store;

use super::{Args, HandlerResult};

pub fn set(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.len() < 2 {
        return Err(CommandError::wrong_arity("set"));
    }
    let key = &args[0];
    let value = args[1].clone();

    let mut i = 2;
    while i < args.len() {
        match args[i].to_ascii_uppercase().as_slice() {
            b"PX" | b"EX" => {
                let ttl_token = args.get(i + 1).ok_or_else(CommandError::syntax)?;
                parse_i64(ttl_token)?;
                i += 2;
            }
            _ => return Err(CommandError::syntax()),
        }
    }

    store.set_string(key, value)?;
    Ok(Reply::ok())
}

pub fn get(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    let key = args.first().ok_or_else(|| CommandError::wrong_arity("get"))?;
    match store.get_string(key)? {
        Some(value) => Ok(Reply::bulk(value.clone())),
        None => Ok(Reply::NullBulk),
    }
}
