//! C7: the blocking-command runner.
//!
//! The teacher has no blocking commands at all — `BLPOP`/`BZPOPMIN` and
//! friends are new to this executor (`SPEC_FULL.md` §4.10) — so this is
//! built from `spec.md` §4.7 directly rather than adapted from teacher
//! code. The shape (poll a condition under the held lock, bounded by a
//! wall-clock deadline) is the standard pattern for emulating a blocking
//! wait over a single shared mutex without a dedicated wait-queue per key.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::args::parse_i64;
use crate::commands::{Args, BlockingHandler};
use crate::error::CommandError;
use crate::executor::Inner;
use crate::reply::Reply;

/// Parses and strips the trailing timeout argument, then repeatedly calls
/// `handler` under `lock` until it returns data, errors, or the deadline
/// passes. Between attempts this sleeps on `signal` for up to `poll`,
/// woken early by any mutating command via `signal.notify_all()`.
///
/// A timeout of `0` blocks indefinitely. Every blocking opcode replies
/// `NullArray` on timeout (`spec.md` §9's `BZPOPMIN`/`BZPOPMAX` divergence
/// generalized to the whole family — see `SPEC_FULL.md` §3).
pub fn run_blocking(lock: &Mutex<Inner>, signal: &Condvar, poll: Duration, handler: BlockingHandler, args: Args) -> Reply {
    if args.is_empty() {
        return CommandError::wrong_arity("blocking command").into_reply();
    }
    let (keys, timeout_token) = args.split_at(args.len() - 1);
    let timeout_secs = match parse_i64(&timeout_token[0]) {
        Err(_) => return CommandError::generic("timeout is not an integer or out of range").into_reply(),
        Ok(t) if t < 0 => return CommandError::generic("timeout is negative").into_reply(),
        Ok(t) => t,
    };
    let deadline = if timeout_secs == 0 { None } else { Some(Instant::now() + Duration::from_secs(timeout_secs as u64)) };

    let mut guard = lock.lock().unwrap();
    loop {
        match handler(&mut guard.store, &mut guard.rand, keys) {
            Ok(Some(reply)) => return reply,
            Err(err) => return err.into_reply(),
            Ok(None) => {}
        }

        let wait_for = match deadline {
            Some(d) => {
                let now = Instant::now();
                if now >= d {
                    return Reply::NullArray;
                }
                (d - now).min(poll)
            }
            None => poll,
        };
        let (next_guard, _timed_out) = signal.wait_timeout(guard, wait_for).unwrap();
        guard = next_guard;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::lists::{blpop, lpush};
    use crate::rand_pick::RandomPick;
    use crate::store::Store;
    use std::sync::Arc;
    use std::thread;

    fn new_inner() -> (Arc<Mutex<Inner>>, Arc<Condvar>) {
        (Arc::new(Mutex::new(Inner { store: Store::new(), rand: RandomPick::from_seed(Some(1)) })), Arc::new(Condvar::new()))
    }

    #[test]
    fn returns_immediately_when_data_is_already_present() {
        let (lock, signal) = new_inner();
        {
            let mut guard = lock.lock().unwrap();
            lpush(&mut guard.store, &mut guard.rand, &[b"k".to_vec(), b"v".to_vec()]).unwrap();
        }
        let args = vec![b"k".to_vec(), b"0".to_vec()];
        let reply = run_blocking(&lock, &signal, Duration::from_millis(10), blpop, &args);
        assert_eq!(reply, Reply::array(vec![Reply::bulk(b"k".to_vec()), Reply::bulk(b"v".to_vec())]));
    }

    #[test]
    fn times_out_with_null_array_when_nothing_arrives() {
        let (lock, signal) = new_inner();
        let args = vec![b"missing".to_vec(), b"1".to_vec()];
        let reply = run_blocking(&lock, &signal, Duration::from_millis(5), blpop, &args);
        assert_eq!(reply, Reply::NullArray);
    }

    #[test]
    fn negative_timeout_is_rejected() {
        let (lock, signal) = new_inner();
        let args = vec![b"k".to_vec(), b"-1".to_vec()];
        match run_blocking(&lock, &signal, Duration::from_millis(5), blpop, &args) {
            Reply::Error(msg) => assert!(msg.contains("negative")),
            other => panic!("expected error reply, got {other:?}"),
        }
    }

    #[test]
    fn wakes_up_once_another_thread_pushes_and_signals() {
        let (lock, signal) = new_inner();
        let lock2 = Arc::clone(&lock);
        let signal2 = Arc::clone(&signal);
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            let mut guard = lock2.lock().unwrap();
            lpush(&mut guard.store, &mut guard.rand, &[b"k".to_vec(), b"v".to_vec()]).unwrap();
            signal2.notify_all();
        });
        let args = vec![b"k".to_vec(), b"1".to_vec()];
        let reply = run_blocking(&lock, &signal, Duration::from_millis(10), blpop, &args);
        producer.join().unwrap();
        assert_eq!(reply, Reply::array(vec![Reply::bulk(b"k".to_vec()), Reply::bulk(b"v".to_vec())]));
    }
}
