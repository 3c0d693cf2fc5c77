//! C5: the command table and top-level dispatch.
//!
//! Mirrors the teacher's `cmd.rs` `CMD_TABLE`: a `once_cell::sync::Lazy`
//! static map from lowercased opcode name to a `RedisCommand`-like entry
//! carrying an `arity` in the same signed convention the teacher uses
//! (positive = exact argc including the opcode itself, negative = minimum
//! argc). The six blocking opcodes are intercepted by `executor::Executor`
//! before reaching `dispatch` — see `SPEC_FULL.md` §4.10 — so they are not
//! present in `COMMAND_TABLE`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::commands::{self, Args, Handler};
use crate::error::CommandError;
use crate::rand_pick::RandomPick;
use crate::reply::Reply;
use crate::store::Store;

struct CommandSpec {
    handler: Handler,
    arity: i32,
}

fn table() -> HashMap<&'static str, CommandSpec> {
    let mut t = HashMap::new();
    macro_rules! cmd {
        ($name:literal, $handler:expr, $arity:literal) => {
            t.insert($name, CommandSpec { handler: $handler, arity: $arity });
        };
    }

    // -- connection / admin (spec.md §4.6 "Connection", SPEC_FULL.md §4.9) --
    cmd!("ping", commands::connection::ping, -1);
    cmd!("echo", commands::connection::echo, 2);
    cmd!("auth", commands::connection::auth, 2);
    cmd!("select", commands::connection::select, 2);
    cmd!("exists", commands::connection::exists, -2);
    cmd!("del", commands::connection::del, -2);
    cmd!("type", commands::connection::type_of, 2);
    cmd!("flushall", commands::connection::flush, 1);
    cmd!("flushdb", commands::connection::flush, 1);

    // -- strings --
    cmd!("set", commands::strings::set, -3);
    cmd!("get", commands::strings::get, 2);

    // -- sets --
    cmd!("sadd", commands::sets::sadd, -3);
    cmd!("srem", commands::sets::srem, -3);
    cmd!("scard", commands::sets::scard, 2);
    cmd!("sismember", commands::sets::sismember, 3);
    cmd!("smembers", commands::sets::smembers, 2);
    cmd!("sdiff", commands::sets::sdiff, -2);
    cmd!("sinter", commands::sets::sinter, -2);
    cmd!("sunion", commands::sets::sunion, -2);
    cmd!("sdiffstore", commands::sets::sdiffstore, -3);
    cmd!("sinterstore", commands::sets::sinterstore, -3);
    cmd!("sunionstore", commands::sets::sunionstore, -3);
    cmd!("smove", commands::sets::smove, 4);
    cmd!("spop", commands::sets::spop, -2);
    cmd!("srandmember", commands::sets::srandmember, -2);
    cmd!("sscan", commands::sets::sscan, -3);

    // -- lists --
    cmd!("lpush", commands::lists::lpush, -3);
    cmd!("rpush", commands::lists::rpush, -3);
    cmd!("lpushx", commands::lists::lpushx, -3);
    cmd!("rpushx", commands::lists::rpushx, -3);
    cmd!("llen", commands::lists::llen, 2);
    cmd!("lrange", commands::lists::lrange, 4);
    cmd!("lindex", commands::lists::lindex, 3);
    cmd!("lset", commands::lists::lset, 4);
    cmd!("linsert", commands::lists::linsert, 5);
    cmd!("lrem", commands::lists::lrem, 4);
    cmd!("ltrim", commands::lists::ltrim, 4);
    cmd!("lpop", commands::lists::lpop, -2);
    cmd!("rpop", commands::lists::rpop, -2);
    cmd!("rpoplpush", commands::lists::rpoplpush, 3);
    cmd!("lmove", commands::lists::lmove, 5);
    cmd!("lpos", commands::lists::lpos, -3);

    // -- hashes --
    cmd!("hset", commands::hashes::hset, -4);
    cmd!("hmset", commands::hashes::hmset, -4);
    cmd!("hsetnx", commands::hashes::hsetnx, 4);
    cmd!("hget", commands::hashes::hget, 3);
    cmd!("hmget", commands::hashes::hmget, -3);
    cmd!("hdel", commands::hashes::hdel, -3);
    cmd!("hexists", commands::hashes::hexists, 3);
    cmd!("hkeys", commands::hashes::hkeys, 2);
    cmd!("hvals", commands::hashes::hvals, 2);
    cmd!("hlen", commands::hashes::hlen, 2);
    cmd!("hgetall", commands::hashes::hgetall, 2);
    cmd!("hstrlen", commands::hashes::hstrlen, 3);
    cmd!("hincrby", commands::hashes::hincrby, 4);
    cmd!("hincrbyfloat", commands::hashes::hincrbyfloat, 4);
    cmd!("hrandfield", commands::hashes::hrandfield, -2);
    cmd!("hscan", commands::hashes::hscan, -3);

    // -- sorted sets --
    cmd!("zadd", commands::zsets::zadd, -4);
    cmd!("zcard", commands::zsets::zcard, 2);
    cmd!("zscore", commands::zsets::zscore, 3);
    cmd!("zmscore", commands::zsets::zmscore, -3);
    cmd!("zrank", commands::zsets::zrank, 3);
    cmd!("zrevrank", commands::zsets::zrevrank, 3);
    cmd!("zincrby", commands::zsets::zincrby, 4);
    cmd!("zrange", commands::zsets::zrange, -4);
    cmd!("zrevrange", commands::zsets::zrevrange, -4);
    cmd!("zrangebyscore", commands::zsets::zrangebyscore, -4);
    cmd!("zrevrangebyscore", commands::zsets::zrevrangebyscore, -4);
    cmd!("zrangebylex", commands::zsets::zrangebylex, -4);
    cmd!("zrevrangebylex", commands::zsets::zrevrangebylex, -4);
    cmd!("zlexcount", commands::zsets::zlexcount, 4);
    cmd!("zcount", commands::zsets::zcount, 4);
    cmd!("zremrangebyrank", commands::zsets::zremrangebyrank, 4);
    cmd!("zremrangebyscore", commands::zsets::zremrangebyscore, 4);
    cmd!("zremrangebylex", commands::zsets::zremrangebylex, 4);
    cmd!("zpopmin", commands::zsets::zpopmin, -2);
    cmd!("zpopmax", commands::zsets::zpopmax, -2);
    cmd!("zrandmember", commands::zsets::zrandmember, -2);
    cmd!("zscan", commands::zsets::zscan, -3);
    cmd!("zdiff", commands::zsets::zdiff, -3);
    cmd!("zdiffstore", commands::zsets::zdiffstore, -4);
    cmd!("zinter", commands::zsets::zinter, -3);
    cmd!("zinterstore", commands::zsets::zinterstore, -4);
    cmd!("zunion", commands::zsets::zunion, -3);
    cmd!("zunionstore", commands::zsets::zunionstore, -4);

    // -- HyperLogLog --
    cmd!("pfadd", commands::hyperloglog::pfadd, -2);
    cmd!("pfcount", commands::hyperloglog::pfcount, -2);
    cmd!("pfmerge", commands::hyperloglog::pfmerge, -2);

    t
}

static COMMAND_TABLE: Lazy<HashMap<&'static str, CommandSpec>> = Lazy::new(table);

/// The six blocking opcodes, handled entirely by `blocking::run_blocking`
/// before `dispatch` ever sees them.
pub fn is_blocking_opcode(name: &str) -> bool {
    matches!(name.to_ascii_lowercase().as_str(), "blpop" | "brpop" | "brpoplpush" | "blmove" | "bzpopmin" | "bzpopmax")
}

fn arity_ok(arity: i32, argc: i32) -> bool {
    if arity >= 0 {
        argc == arity
    } else {
        argc >= -arity
    }
}

pub fn dispatch(store: &mut Store, rand: &mut RandomPick, name: &str, args: Args) -> Result<Reply, CommandError> {
    let lowered = name.to_ascii_lowercase();
    let spec = COMMAND_TABLE.get(lowered.as_str()).ok_or_else(|| CommandError::unknown_command(name))?;
    if !arity_ok(spec.arity, args.len() as i32 + 1) {
        return Err(CommandError::wrong_arity(&lowered));
    }
    (spec.handler)(store, rand, args)
}
