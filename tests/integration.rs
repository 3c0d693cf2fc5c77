//! End-to-end scenarios driven entirely through `Executor::execute`, the
//! crate's only public entry point. These exercise cross-command behavior
//! that a single module's unit tests can't: type exclusivity across
//! namespaces, multi-command round trips, and real concurrent blocking.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rudis_core::{Executor, Reply};

fn argv(parts: &[&[u8]]) -> Vec<Vec<u8>> {
    parts.iter().map(|p| p.to_vec()).collect()
}

fn bulk(s: &str) -> Reply {
    Reply::bulk(s.as_bytes().to_vec())
}

#[test]
fn scenario_sadd_scard_srem_smembers() {
    let exec = Executor::new();
    assert_eq!(exec.execute(argv(&[b"SADD", b"s", b"a", b"b", b"c"])), Reply::Integer(3));
    assert_eq!(exec.execute(argv(&[b"SCARD", b"s"])), Reply::Integer(3));
    assert_eq!(exec.execute(argv(&[b"SREM", b"s", b"a", b"z"])), Reply::Integer(1));
    match exec.execute(argv(&[b"SMEMBERS", b"s"])) {
        Reply::Array(items) => {
            let mut members: Vec<Vec<u8>> = items
                .into_iter()
                .map(|r| match r {
                    Reply::BulkString(b) => b,
                    other => panic!("expected bulk string, got {other:?}"),
                })
                .collect();
            members.sort();
            assert_eq!(members, vec![b"b".to_vec(), b"c".to_vec()]);
        }
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn scenario_hash_field_increment_round_trip() {
    let exec = Executor::new();
    assert_eq!(exec.execute(argv(&[b"HSET", b"h", b"f1", b"v1", b"f2", b"v2"])), Reply::Integer(2));
    assert_eq!(exec.execute(argv(&[b"HINCRBY", b"h", b"n", b"5"])), Reply::Integer(5));
    assert_eq!(exec.execute(argv(&[b"HINCRBY", b"h", b"n", b"2"])), Reply::Integer(7));
    match exec.execute(argv(&[b"HGETALL", b"h"])) {
        Reply::Array(items) => assert_eq!(items.len(), 6),
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn scenario_zset_range_and_trim() {
    let exec = Executor::new();
    let add = argv(&[b"ZADD", b"z", b"1", b"a", b"2", b"b", b"3", b"c"]);
    assert_eq!(exec.execute(add), Reply::Integer(3));
    let rbs = argv(&[b"ZRANGEBYSCORE", b"z", b"(1", b"+inf", b"WITHSCORES"]);
    assert_eq!(exec.execute(rbs), Reply::array(vec![bulk("b"), bulk("2"), bulk("c"), bulk("3")]));
    let rmrs = argv(&[b"ZREMRANGEBYSCORE", b"z", b"-inf", b"2"]);
    assert_eq!(exec.execute(rmrs), Reply::Integer(2));
    let range = argv(&[b"ZRANGE", b"z", b"0", b"-1"]);
    assert_eq!(exec.execute(range), Reply::bulk_array(vec![b"c".to_vec()]));
}

#[test]
fn scenario_list_push_insert_range() {
    let exec = Executor::new();
    exec.execute(argv(&[b"LPUSH", b"L", b"1", b"2", b"3"]));
    exec.execute(argv(&[b"LINSERT", b"L", b"BEFORE", b"2", b"X"]));
    let range = argv(&[b"LRANGE", b"L", b"0", b"-1"]);
    assert_eq!(exec.execute(range), Reply::bulk_array(vec![b"3".to_vec(), b"X".to_vec(), b"2".to_vec(), b"1".to_vec()]));
}

#[test]
fn scenario_type_exclusivity_across_commands() {
    let exec = Executor::new();
    exec.execute(argv(&[b"SET", b"x", b"hi"]));
    match exec.execute(argv(&[b"SADD", b"x", b"y"])) {
        Reply::Error(msg) => assert!(msg.starts_with("WRONGTYPE")),
        other => panic!("expected WRONGTYPE error, got {other:?}"),
    }
}

#[test]
fn scenario_zunionstore_with_weights() {
    let exec = Executor::new();
    exec.execute(argv(&[b"ZADD", b"z", b"1", b"a", b"2", b"b"]));
    let store_args = argv(&[b"ZUNIONSTORE", b"out", b"2", b"z", b"z", b"WEIGHTS", b"1", b"2", b"AGGREGATE", b"SUM"]);
    assert_eq!(exec.execute(store_args), Reply::Integer(2));
    assert_eq!(exec.execute(argv(&[b"ZSCORE", b"out", b"a"])), bulk("3"));
}

#[test]
fn universal_invariant_last_write_wins_for_strings() {
    let exec = Executor::new();
    exec.execute(argv(&[b"SET", b"k", b"first"]));
    exec.execute(argv(&[b"SET", b"k", b"second"]));
    assert_eq!(exec.execute(argv(&[b"GET", b"k"])), bulk("second"));
}

#[test]
fn universal_invariant_zadd_nx_keeps_first_write() {
    let exec = Executor::new();
    exec.execute(argv(&[b"ZADD", b"k", b"NX", b"1", b"a"]));
    exec.execute(argv(&[b"ZADD", b"k", b"NX", b"2", b"a"]));
    assert_eq!(exec.execute(argv(&[b"ZSCORE", b"k", b"a"])), bulk("1"));
}

#[test]
fn boundary_lindex_and_lrange_on_empty_key() {
    let exec = Executor::new();
    assert_eq!(exec.execute(argv(&[b"LINDEX", b"empty", b"0"])), Reply::NullBulk);
    assert_eq!(exec.execute(argv(&[b"LRANGE", b"empty", b"0", b"-1"])), Reply::array(Vec::new()));
}

#[test]
fn boundary_lset_out_of_range_reports_error() {
    let exec = Executor::new();
    exec.execute(argv(&[b"RPUSH", b"k", b"a", b"b"]));
    match exec.execute(argv(&[b"LSET", b"k", b"99", b"x"])) {
        Reply::Error(msg) => assert_eq!(msg, "ERR index out of range"),
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn blocking_scenario_times_out_on_truly_empty_key() {
    let exec = Executor::new();
    let started = Instant::now();
    let reply = exec.execute(argv(&[b"BLPOP", b"k", b"1"]));
    assert_eq!(reply, Reply::NullArray);
    assert!(started.elapsed() >= Duration::from_millis(900));
}

#[test]
fn blocking_scenario_one_client_wakes_another() {
    let exec = Arc::new(Executor::new());
    let waiter = {
        let exec = Arc::clone(&exec);
        thread::spawn(move || exec.execute(argv(&[b"BLPOP", b"k", b"0"])))
    };
    thread::sleep(Duration::from_millis(50));
    exec.execute(argv(&[b"RPUSH", b"k", b"v"]));
    let reply = waiter.join().unwrap();
    assert_eq!(reply, Reply::array(vec![Reply::bulk(b"k".to_vec()), Reply::bulk(b"v".to_vec())]));
}
