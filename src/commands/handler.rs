//! Command Handler Module
//!
//! This module turns one request frame into one reply. A request is an array
//! of string arguments (or an inline command line tokenised into the same
//! shape). The first argument names the command; the rest are handed to the
//! operation positionally.
//!
//! ## Supported Commands
//!
//! - `SET key value` - Set a key
//! - `GET key` - Get a key's value
//! - `DEL key [key ...]` - Delete keys
//! - `EXISTS key` - Check if a key exists
//! - `KEYS [pattern]` - List keys, optionally filtered by a glob
//! - `FLUSH` / `FLUSHDB` / `FLUSHALL` - Clear the keyspace
//! - `INFO [section]` - Server banner and lifecycle state
//! - `PING [message]` - Test connection
//! - `DBSIZE` - Number of keys
//! - `SAVE` - Write a snapshot now
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐      │
//! │  │  process()  │───>│  resolve()  │───>│ Operation   │      │
//! │  │ decode/line │    │ alias + map │    │ fn pointer  │      │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘      │
//! │                                               │             │
//! │                                               ▼             │
//! │                                      StorageEngine          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Surface names go through [`ALIASES`] first, so `DEL` runs the `delete`
//! operation and `SAVE` runs `dump`. The operation names themselves are
//! also accepted.

use crate::commands::error::CommandError;
use crate::protocol::types::prefix;
use crate::protocol::{decode, parse_inline, ParseError, RespValue};
use crate::storage::{StorageEngine, Value};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// One resolved invocation: the command name as the client sent it
/// (lowercased) and its positional arguments.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    pub name: &'a str,
    pub args: &'a [String],
}

impl Call<'_> {
    fn wrong_arity(&self) -> CommandError {
        CommandError::WrongArity(self.name.to_string())
    }

    /// Fails unless exactly `n` arguments were given.
    fn exactly(&self, n: usize) -> Result<(), CommandError> {
        if self.args.len() == n {
            Ok(())
        } else {
            Err(self.wrong_arity())
        }
    }

    /// Returns the single optional argument, failing on more than one.
    fn optional(&self) -> Result<Option<&str>, CommandError> {
        match self.args {
            [] => Ok(None),
            [arg] => Ok(Some(arg.as_str())),
            _ => Err(self.wrong_arity()),
        }
    }
}

/// A store operation.
pub type Operation = fn(&StorageEngine, &Call<'_>) -> Result<Value, CommandError>;

/// Surface command name -> operation name.
pub const ALIASES: &[(&str, &str)] = &[
    ("del", "delete"),
    ("save", "dump"),
    ("flushdb", "flush"),
    ("flushall", "flush"),
];

const OPERATIONS: &[(&str, Operation)] = &[
    ("set", op_set),
    ("get", op_get),
    ("delete", op_delete),
    ("exists", op_exists),
    ("keys", op_keys),
    ("flush", op_flush),
    ("info", op_info),
    ("ping", op_ping),
    ("dbsize", op_dbsize),
    ("dump", op_dump),
];

fn registry() -> &'static HashMap<&'static str, Operation> {
    static REGISTRY: OnceLock<HashMap<&'static str, Operation>> = OnceLock::new();
    REGISTRY.get_or_init(|| OPERATIONS.iter().copied().collect())
}

/// Looks up the operation for a surface command name, case-insensitively.
pub fn resolve(name: &str) -> Option<Operation> {
    let name = name.to_ascii_lowercase();
    let target = ALIASES
        .iter()
        .find(|(surface, _)| *surface == name)
        .map_or(name.as_str(), |(_, op)| *op);
    registry().get(target).copied()
}

/// Dispatches requests to store operations.
#[derive(Clone)]
pub struct CommandHandler {
    /// The storage engine
    storage: Arc<StorageEngine>,
}

impl CommandHandler {
    /// Creates a new command handler with the given storage engine.
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self { storage }
    }

    /// Returns the storage engine this handler dispatches to.
    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    /// Decodes a raw request and executes it.
    ///
    /// Frames starting with `*` are decoded as arrays; anything else is
    /// treated as an inline command line.
    pub fn process(&self, raw: &[u8]) -> RespValue {
        let request = if raw.first() == Some(&prefix::ARRAY) {
            decode(raw)
        } else {
            parse_inline(raw)
        };

        match request {
            Ok(request) => self.execute(request),
            Err(e) => self.reject(e),
        }
    }

    /// Executes a decoded request and returns the reply.
    ///
    /// Never fails: every error becomes a `-ERR` reply.
    pub fn execute(&self, request: RespValue) -> RespValue {
        match self.try_execute(request) {
            Ok(value) => RespValue::from(value),
            Err(e) => {
                warn!(error = %e, "Command failed");
                e.to_resp()
            }
        }
    }

    /// The reply for a frame that could not be decoded.
    pub fn reject(&self, error: ParseError) -> RespValue {
        warn!(error = %error, "Rejected malformed request");
        CommandError::from(error).to_resp()
    }

    fn try_execute(&self, request: RespValue) -> Result<Value, CommandError> {
        let args = arguments(request)?;
        let (name, rest) = args
            .split_first()
            .ok_or(CommandError::InvalidRequest("empty command"))?;

        // The lifecycle state is held for the whole operation.
        self.storage
            .while_running(|| {
                let operation =
                    resolve(name).ok_or_else(|| CommandError::UnknownCommand(name.clone()))?;

                let name = name.to_ascii_lowercase();
                debug!(command = %name, args = ?rest, "Dispatching");

                operation(&self.storage, &Call { name: &name, args: rest })
            })
            .map_err(CommandError::NotRunning)?
    }
}

/// Flattens a request array into its string arguments.
fn arguments(request: RespValue) -> Result<Vec<String>, CommandError> {
    let elements = request
        .into_array()
        .ok_or(CommandError::InvalidRequest("invalid command format"))?;

    elements
        .into_iter()
        .map(|element| match element {
            RespValue::SimpleString(s) => Ok(s),
            RespValue::BulkString(Some(b)) => String::from_utf8(b.to_vec())
                .map_err(|_| CommandError::InvalidRequest("arguments must be valid UTF-8")),
            _ => Err(CommandError::InvalidRequest(
                "arguments must be strings",
            )),
        })
        .collect()
}

// ============================================================================
// Operations
// ============================================================================

/// SET key value
fn op_set(storage: &StorageEngine, call: &Call<'_>) -> Result<Value, CommandError> {
    call.exactly(2)?;
    storage.set(call.args[0].clone(), Value::Text(call.args[1].clone()));
    Ok(Value::ok())
}

/// GET key
fn op_get(storage: &StorageEngine, call: &Call<'_>) -> Result<Value, CommandError> {
    call.exactly(1)?;
    Ok(storage.get(&call.args[0]).unwrap_or(Value::Nil))
}

/// DEL key [key ...]
fn op_delete(storage: &StorageEngine, call: &Call<'_>) -> Result<Value, CommandError> {
    let deleted = storage.delete(call.args);
    Ok(Value::Int(deleted as i64))
}

/// EXISTS key
fn op_exists(storage: &StorageEngine, call: &Call<'_>) -> Result<Value, CommandError> {
    call.exactly(1)?;
    Ok(Value::Bool(storage.exists(&call.args[0])))
}

/// KEYS [pattern]
fn op_keys(storage: &StorageEngine, call: &Call<'_>) -> Result<Value, CommandError> {
    let pattern = call.optional()?;
    Ok(Value::from(storage.keys(pattern)))
}

/// FLUSH
fn op_flush(storage: &StorageEngine, call: &Call<'_>) -> Result<Value, CommandError> {
    call.exactly(0)?;
    storage.flush();
    Ok(Value::Nil)
}

/// INFO [section]
fn op_info(storage: &StorageEngine, call: &Call<'_>) -> Result<Value, CommandError> {
    // Sections are not distinguished; everything is always reported.
    call.optional()?;
    let stats = storage.stats();

    let info = format!(
        "# Server\r\n\
         nedis_version:{}\r\n\
         state:{}\r\n\
         \r\n\
         # Keyspace\r\n\
         keys:{}\r\n\
         \r\n\
         # Operations\r\n\
         get_ops:{}\r\n\
         set_ops:{}\r\n\
         del_ops:{}\r\n",
        crate::VERSION,
        storage.state(),
        stats.keys,
        stats.get_ops,
        stats.set_ops,
        stats.del_ops,
    );

    Ok(Value::Text(info))
}

/// PING [message]
fn op_ping(_storage: &StorageEngine, call: &Call<'_>) -> Result<Value, CommandError> {
    Ok(match call.optional()? {
        None => Value::Status("PONG".to_string()),
        Some(msg) => Value::from(msg),
    })
}

/// DBSIZE
fn op_dbsize(storage: &StorageEngine, call: &Call<'_>) -> Result<Value, CommandError> {
    call.exactly(0)?;
    Ok(Value::Int(storage.len() as i64))
}

/// SAVE
fn op_dump(storage: &StorageEngine, call: &Call<'_>) -> Result<Value, CommandError> {
    call.exactly(0)?;
    storage.dump()?;
    Ok(Value::ok())
}
