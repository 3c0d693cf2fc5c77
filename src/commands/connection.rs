//! Connection-level and keyspace-admin commands (`spec.md` §4.6 "Connection"
//! plus the supplemented `EXISTS`/`DEL`/`TYPE`/`FLUSHALL`/`FLUSHDB` from
//! `SPEC_FULL.md` §4.9).

use crate::error::CommandError;
use crate::rand_pick::RandomPick;
use crate::reply::Reply;
use crate::store::Store;

use super::{Args, HandlerResult};

pub fn ping(_store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    match args.len() {
        0 => Ok(Reply::pong()),
        1 => Ok(Reply::bulk(args[0].clone())),
        _ => Err(CommandError::wrong_arity("ping")),
    }
}

pub fn echo(_store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    match args.first() {
        Some(value) => Ok(Reply::bulk(value.clone())),
        None => Err(CommandError::wrong_arity("echo")),
    }
}

/// `AUTH` always succeeds — there is no password enforcement (`spec.md`
/// §1 Non-goals) — but the arity check on an empty argument vector still
/// applies, per `spec.md` §4.6.
pub fn auth(_store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.is_empty() || args[0].is_empty() {
        return Err(CommandError::wrong_arity("auth"));
    }
    Ok(Reply::ok())
}

/// There is only one logical database in this executor, so `SELECT` is
/// accepted (arity-checked) and otherwise a no-op.
pub fn select(_store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    if args.is_empty() || args[0].is_empty() {
        return Err(CommandError::wrong_arity("select"));
    }
    Ok(Reply::ok())
}

pub fn exists(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    let count = args.iter().filter(|key| store.exists(key)).count();
    Ok(Reply::Integer(count as i64))
}

pub fn del(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    let count = args.iter().filter(|key| store.delete(key)).count();
    Ok(Reply::Integer(count as i64))
}

pub fn type_of(store: &mut Store, _rand: &mut RandomPick, args: Args) -> HandlerResult {
    let key = args.first().ok_or_else(|| CommandError::wrong_arity("type"))?;
    let name = store.kind_of(key).map(|k| k.type_name()).unwrap_or("none");
    Ok(Reply::SimpleString(name.to_string()))
}

pub fn flush(store: &mut Store, _rand: &mut RandomPick, _args: Args) -> HandlerResult {
    store.flush();
    Ok(Reply::ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_without_args_replies_pong() {
        let mut store = Store::new();
        let mut rand = RandomPick::from_seed(Some(1));
        assert_eq!(ping(&mut store, &mut rand, &[]).unwrap(), Reply::pong());
    }

    #[test]
    fn ping_with_arg_echoes_it() {
        let mut store = Store::new();
        let mut rand = RandomPick::from_seed(Some(1));
        let args = vec![b"hi".to_vec()];
        assert_eq!(ping(&mut store, &mut rand, &args).unwrap(), Reply::bulk(b"hi".to_vec()));
    }

    #[test]
    fn auth_requires_a_nonempty_argument() {
        let mut store = Store::new();
        let mut rand = RandomPick::from_seed(Some(1));
        assert!(auth(&mut store, &mut rand, &[]).is_err());
        let args = vec![b"pw".to_vec()];
        assert_eq!(auth(&mut store, &mut rand, &args).unwrap(), Reply::ok());
    }

    #[test]
    fn type_of_reports_none_for_missing_key() {
        let mut store = Store::new();
        let mut rand = RandomPick::from_seed(Some(1));
        let args = vec![b"missing".to_vec()];
        assert_eq!(type_of(&mut store, &mut rand, &args).unwrap(), Reply::SimpleString("none".to_string()));
    }
}
