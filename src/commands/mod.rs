//! C6: handlers, one per opcode, grouped by the data-type namespace they
//! operate over.

pub mod connection;
pub mod hashes;
pub mod hyperloglog;
pub mod lists;
pub mod sets;
pub mod strings;
pub mod zsets;

use crate::error::CommandError;
use crate::rand_pick::RandomPick;
use crate::reply::Reply;
use crate::store::Store;

/// The argument vector handed to a handler: everything after the opcode.
pub type Args<'a> = &'a [Vec<u8>];

pub type HandlerResult = Result<Reply, CommandError>;

/// Non-blocking handlers run to completion under the store lock and always
/// produce a reply.
pub type Handler = fn(&mut Store, &mut RandomPick, Args) -> HandlerResult;

/// Blocking handlers (C7) report `Ok(None)` to mean "no data yet" instead
/// of producing a reply; the blocking runner interprets that as a signal
/// to retry rather than commit.
pub type BlockingHandler = fn(&mut Store, &mut RandomPick, Args) -> Result<Option<Reply>, CommandError>;
