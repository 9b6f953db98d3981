//! Command dispatch: maps parsed request lines onto engine operations and
//! renders their results as response bytes. Errors bubble up as
//! [`GcdbError`]; the connection layer turns them into wire text.

pub mod command;

pub use command::Command;

use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::*;
use crate::core::engine::Engine;
use crate::error::{GcdbError, Result};

/// Every verb the front end answers, in the order `help` lists them.
pub const VERBS: &[&str] = &[
    "deleteid", "findall", "findid", "flush", "getmore", "help", "hi", "index", "insert", "stats",
    "updateid",
];

/// Execute one command against the engine.
pub fn handle(engine: &Engine, command: &Command) -> Result<Bytes> {
    match command.verb.as_str() {
        "hi" => Ok(Bytes::from_static(GREETING.as_bytes())),
        "help" => Ok(Bytes::from(VERBS.join("\n"))),
        "insert" => insert(engine, command),
        "findid" => find_id(engine, command),
        "findall" => Ok(Bytes::from(engine.find_all().to_string())),
        "getmore" => get_more(engine, command),
        "deleteid" => delete_id(engine, command),
        "updateid" => update_id(engine, command),
        "index" => index_toggle(engine, command),
        "flush" => {
            engine.flush()?;
            Ok(ok())
        }
        "stats" => Ok(Bytes::from(format!(
            "Documents: {}",
            engine.document_count()
        ))),
        _ => Err(GcdbError::BadRequest(UNRECOGNIZED.to_string())),
    }
}

fn ok() -> Bytes {
    Bytes::from_static(RESPONSE_OK.as_bytes())
}

fn insert(engine: &Engine, command: &Command) -> Result<Bytes> {
    let body = required_body(command, "insert takes a JSON object as its command body")?;
    engine.insert(body)?;
    Ok(ok())
}

fn find_id(engine: &Engine, command: &Command) -> Result<Bytes> {
    let id = int_body(command, "findid takes an integer ID as its command body")?;
    engine.find_by_id(id)
}

fn get_more(engine: &Engine, command: &Command) -> Result<Bytes> {
    let cursor = int_body(command, "getmore takes an integer cursor ID as its command body")?;
    let cursor = u64::try_from(cursor)
        .map_err(|_| GcdbError::BadRequest(format!("invalid cursor id {}", cursor)))?;
    let page = engine.get_more(cursor)?;

    let mut joined = BytesMut::with_capacity(page.iter().map(|p| p.len() + 1).sum());
    for (n, payload) in page.iter().enumerate() {
        if n > 0 {
            joined.put_u8(b'\n');
        }
        joined.put_slice(payload);
    }
    Ok(joined.freeze())
}

fn delete_id(engine: &Engine, command: &Command) -> Result<Bytes> {
    let id = int_body(command, "deleteid takes an integer ID as its command body")?;
    engine.delete(id)?;
    Ok(ok())
}

fn update_id(engine: &Engine, command: &Command) -> Result<Bytes> {
    const USAGE: &str = "updateid takes an integer ID and a JSON object as its command body";
    let body = required_body(command, USAGE)?;
    let space = body
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| GcdbError::BadRequest(USAGE.to_string()))?;
    let id = parse_int(&body[..space])?;
    engine.update(id, &body[space + 1..])?;
    Ok(ok())
}

fn index_toggle(engine: &Engine, command: &Command) -> Result<Bytes> {
    match command.body.as_deref() {
        Some(body) if body == b"on" => {
            engine.set_indexed_reads(true);
            Ok(Bytes::from_static(b"INDICES ON"))
        }
        Some(body) if body == b"off" => {
            engine.set_indexed_reads(false);
            Ok(Bytes::from_static(b"INDICES OFF"))
        }
        _ => Err(GcdbError::BadRequest(
            "index takes 'on' or 'off' as its command body".to_string(),
        )),
    }
}

fn required_body<'a>(command: &'a Command, usage: &str) -> Result<&'a [u8]> {
    command
        .body
        .as_deref()
        .ok_or_else(|| GcdbError::BadRequest(usage.to_string()))
}

fn int_body(command: &Command, usage: &str) -> Result<i64> {
    parse_int(required_body(command, usage)?)
}

fn parse_int(body: &[u8]) -> Result<i64> {
    let text = std::str::from_utf8(body)
        .map_err(|_| GcdbError::BadRequest("expected a decimal integer".to_string()))?;
    text.trim()
        .parse()
        .map_err(|err| GcdbError::BadRequest(format!("invalid integer {:?}: {}", text, err)))
}
