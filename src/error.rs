//! A3: internal error propagation.
//!
//! Handlers return `Result<Reply, CommandError>` instead of writing directly
//! into a shared reply buffer the way the teacher's `RedisClient::add_reply`
//! does — there is no per-connection object here, so the reply is the
//! return value. `CommandError` is flattened to a `Reply::Error` (or, for
//! `WrongNumberOfArgs`, the exact wording real clients expect) at the
//! dispatch boundary in `dispatch::dispatch`.

use crate::reply::Reply;

#[derive(Clone, Debug, PartialEq)]
pub enum CommandError {
    Protocol(String),
    WrongType,
    WrongNumberOfArgs(String),
    NotAnInteger,
    NotAFloat,
    Syntax,
    OutOfRange,
    UnknownCommand(String),
    Generic(String),
}

impl CommandError {
    pub fn protocol(msg: impl Into<String>) -> CommandError {
        CommandError::Protocol(msg.into())
    }

    pub fn wrong_type() -> CommandError {
        CommandError::WrongType
    }

    pub fn wrong_arity(command: &str) -> CommandError {
        CommandError::WrongNumberOfArgs(command.to_string())
    }

    pub fn not_an_integer() -> CommandError {
        CommandError::NotAnInteger
    }

    pub fn not_a_float() -> CommandError {
        CommandError::NotAFloat
    }

    pub fn syntax() -> CommandError {
        CommandError::Syntax
    }

    pub fn out_of_range() -> CommandError {
        CommandError::OutOfRange
    }

    pub fn unknown_command(name: &str) -> CommandError {
        CommandError::UnknownCommand(name.to_string())
    }

    pub fn generic(msg: impl Into<String>) -> CommandError {
        CommandError::Generic(msg.into())
    }

    pub fn into_reply(self) -> Reply {
        match self {
            CommandError::Protocol(msg) => Reply::Error(format!("ProtocolError(\"{msg}\")")),
            CommandError::WrongType => Reply::Error("WRONGTYPE Operation against a key holding the wrong kind of value".to_string()),
            CommandError::WrongNumberOfArgs(cmd) => {
                Reply::Error(format!("ERR wrong number of arguments for '{}' command", cmd.to_lowercase()))
            }
            CommandError::NotAnInteger => Reply::Error("ERR value is not an integer or out of range".to_string()),
            CommandError::NotAFloat => Reply::Error("ERR value is not a valid float".to_string()),
            CommandError::Syntax => Reply::Error("ERR syntax error".to_string()),
            CommandError::OutOfRange => Reply::Error("ERR index out of range".to_string()),
            CommandError::UnknownCommand(name) => Reply::Error(format!("ERR unknown command '{name}'")),
            CommandError::Generic(msg) => Reply::Error(format!("ERR {msg}")),
        }
    }
}
