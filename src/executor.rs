//! C8: the atomicity core.
//!
//! A single `Mutex` around everything mutable — the typed store and the
//! random-pick source — serializes every command, blocking and
//! non-blocking alike (`spec.md` §5 CONCURRENCY & RESOURCE MODEL,
//! invariant 1: "the whole store is one atomic unit"). This stands in for
//! the teacher's single-threaded event loop (`server.rs`'s `ae_main`):
//! the teacher gets serialization for free by never running two commands
//! concurrently in the first place, while this executor is meant to be
//! called from multiple threads, so the same guarantee is rebuilt with a
//! lock instead of an event loop.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::blocking;
use crate::config::ExecutorConfig;
use crate::dispatch;
use crate::error::CommandError;
use crate::rand_pick::RandomPick;
use crate::reply::Reply;
use crate::store::Store;
use crate::util::{log, LogLevel};

pub struct Inner {
    pub store: Store,
    pub rand: RandomPick,
}

/// The public entry point: one `Executor` is shared across every caller
/// (analogous to one `redis-server` process). `execute` is safe to call
/// from multiple threads concurrently.
pub struct Executor {
    inner: Mutex<Inner>,
    signal: Condvar,
    config: ExecutorConfig,
}

impl Executor {
    pub fn new() -> Executor {
        Executor::with_config(ExecutorConfig::default())
    }

    pub fn with_config(config: ExecutorConfig) -> Executor {
        let rand = RandomPick::from_seed(config.random_seed);
        Executor { inner: Mutex::new(Inner { store: Store::new(), rand }), signal: Condvar::new(), config }
    }

    /// Runs one command to completion and returns its reply. `argv[0]` is
    /// the opcode; the rest are its arguments. An empty `argv` is a
    /// protocol error, not a command.
    pub fn execute(&self, argv: Vec<Vec<u8>>) -> Reply {
        let Some((opcode, args)) = argv.split_first() else {
            return CommandError::protocol("Malformed command.").into_reply();
        };
        let name = match std::str::from_utf8(opcode) {
            Ok(s) => s.to_string(),
            Err(_) => return CommandError::protocol("Malformed command.").into_reply(),
        };
        log(self.config.verbosity, LogLevel::Debug, &format!("dispatching {name}"));

        let reply = if dispatch::is_blocking_opcode(&name) {
            self.execute_blocking(&name, args)
        } else {
            let mut guard = self.inner.lock().unwrap();
            match dispatch::dispatch(&mut guard.store, &mut guard.rand, &name, args) {
                Ok(reply) => reply,
                Err(err) => err.into_reply(),
            }
        };

        // Any command might have changed store state a blocked waiter
        // cares about (a push, a delete, a zadd); waking every blocked
        // waiter on every command is the same trade-off the teacher's
        // design notes make for AOF fsync batching — simplicity over a
        // precise per-key wakeup list.
        self.signal.notify_all();
        reply
    }

    fn execute_blocking(&self, name: &str, args: &[Vec<u8>]) -> Reply {
        use crate::commands::{lists, zsets};
        let handler = match name.to_ascii_lowercase().as_str() {
            "blpop" => lists::blpop,
            "brpop" => lists::brpop,
            "brpoplpush" => lists::brpoplpush,
            "blmove" => lists::blmove,
            "bzpopmin" => zsets::bzpopmin,
            "bzpopmax" => zsets::bzpopmax,
            _ => unreachable!("is_blocking_opcode only admits the six names matched above"),
        };
        blocking::run_blocking(&self.inner, &self.signal, self.config.blocking_poll, handler, args)
    }
}

impl Default for Executor {
    fn default() -> Executor {
        Executor::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&[u8]]) -> Vec<Vec<u8>> {
        parts.iter().map(|p| p.to_vec()).collect()
    }

    #[test]
    fn set_then_get_round_trips_through_execute() {
        let exec = Executor::new();
        assert_eq!(exec.execute(argv(&[b"SET", b"k", b"v"])), Reply::ok());
        assert_eq!(exec.execute(argv(&[b"GET", b"k"])), Reply::bulk(b"v".to_vec()));
    }

    #[test]
    fn unknown_command_reports_an_error() {
        let exec = Executor::new();
        match exec.execute(argv(&[b"NOPE"])) {
            Reply::Error(msg) => assert!(msg.contains("unknown command")),
            other => panic!("expected error reply, got {other:?}"),
        }
    }

    #[test]
    fn empty_argv_is_a_protocol_error() {
        let exec = Executor::new();
        match exec.execute(Vec::new()) {
            Reply::Error(msg) => assert_eq!(msg, "ProtocolError(\"Malformed command.\")"),
            other => panic!("expected error reply, got {other:?}"),
        }
    }

    #[test]
    fn blocking_command_is_routed_around_dispatch() {
        let exec = Executor::new();
        exec.execute(argv(&[b"RPUSH", b"k", b"v"]));
        let reply = exec.execute(argv(&[b"BLPOP", b"k", b"0"]));
        assert_eq!(reply, Reply::array(vec![Reply::bulk(b"k".to_vec()), Reply::bulk(b"v".to_vec())]));
    }

    #[test]
    fn is_usable_across_threads() {
        use std::sync::Arc;
        use std::thread;

        let exec = Arc::new(Executor::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let exec = Arc::clone(&exec);
            handles.push(thread::spawn(move || {
                exec.execute(argv(&[b"RPUSH", b"shared", i.to_string().as_bytes()]));
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        match exec.execute(argv(&[b"LLEN", b"shared"])) {
            Reply::Integer(n) => assert_eq!(n, 8),
            other => panic!("expected integer reply, got {other:?}"),
        }
    }
}
