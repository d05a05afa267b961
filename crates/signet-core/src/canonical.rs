//! Canonical CBOR encoding for signed calls.
//!
//! Implements the subset of RFC 8949 Core Deterministic Encoding that calls
//! need:
//! - Map keys are small integers, sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - Amounts are 16-byte big-endian byte strings (no bignums, no floats)
//!
//! The same call must produce identical bytes everywhere, since the bytes
//! are what the caller signs.

use ciborium::value::Value;

use crate::call::{Call, SignedCall};
use crate::content::Registration;
use crate::crypto::{Blake3Hash, Identity, Signature};
use crate::error::CoreError;
use crate::record::CreationType;
use crate::types::{Amount, ContentId};

/// Prefix of every signed message.
pub const SIGN_DOMAIN: &[u8] = b"signet/call/v1";

/// Prefix hashed into call ids.
pub const ID_DOMAIN: &[u8] = b"signet/call-id/v1";

/// Envelope keys.
mod keys {
    pub const CALLER: u64 = 0;
    pub const NONCE: u64 = 1;
    pub const CALL: u64 = 2;
    pub const SIGNATURE: u64 = 3;
    pub const VALUE: u64 = 4;
}

/// Call body keys. Only the fields an operation uses are present.
mod call_keys {
    pub const OP: u64 = 0;
    pub const CONTENT_ID: u64 = 1;
    pub const LOCATOR: u64 = 2;
    pub const CREATION_TYPE: u64 = 3;
    pub const PLATFORM_SOURCE: u64 = 4;
    pub const CONTEXT: u64 = 5;
    pub const IDENTITY: u64 = 6;
    pub const AMOUNT: u64 = 7;
    pub const THRESHOLD: u64 = 8;
}

/// The bytes a caller signs: `SIGN_DOMAIN || cbor{caller, nonce, call, value}`.
pub fn signing_bytes(caller: &Identity, nonce: u64, value: Amount, call: &Call) -> Vec<u8> {
    let envelope = Value::Map(vec![
        (key(keys::CALLER), Value::Bytes(caller.0.to_vec())),
        (key(keys::NONCE), uint(nonce)),
        (key(keys::CALL), call_to_cbor_value(call)),
        (key(keys::VALUE), amount(value)),
    ]);

    let mut buf = SIGN_DOMAIN.to_vec();
    encode_value_to(&mut buf, &envelope);
    buf
}

/// Encode a signed call: `cbor{caller, nonce, call, signature, value}`.
pub fn encode_signed_call(signed: &SignedCall) -> Vec<u8> {
    let value = Value::Map(vec![
        (key(keys::CALLER), Value::Bytes(signed.caller.0.to_vec())),
        (key(keys::NONCE), uint(signed.nonce)),
        (key(keys::CALL), call_to_cbor_value(&signed.call)),
        (key(keys::SIGNATURE), Value::Bytes(signed.signature.0.to_vec())),
        (key(keys::VALUE), amount(signed.value)),
    ]);

    let mut buf = Vec::new();
    encode_value_to(&mut buf, &value);
    buf
}

/// Blake3 over `ID_DOMAIN || encode_signed_call(signed)`.
pub fn call_id(signed: &SignedCall) -> Blake3Hash {
    Blake3Hash::hash_with_domain(ID_DOMAIN, &encode_signed_call(signed))
}

/// Decode a signed call, rejecting any non-canonical encoding.
pub fn decode_signed_call(bytes: &[u8]) -> Result<SignedCall, CoreError> {
    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let map = match &value {
        Value::Map(m) => m,
        _ => return Err(malformed("expected envelope map")),
    };

    let caller = Identity(fixed_bytes::<32>(field(map, keys::CALLER), "caller")?);
    let nonce = field(map, keys::NONCE)
        .and_then(as_u64)
        .ok_or_else(|| malformed("missing nonce"))?;
    let call = cbor_value_to_call(field(map, keys::CALL).ok_or_else(|| malformed("missing call"))?)?;
    let signature = Signature(fixed_bytes::<64>(field(map, keys::SIGNATURE), "signature")?);
    let value = Amount::from_be_bytes(fixed_bytes::<16>(field(map, keys::VALUE), "value")?);

    let signed = SignedCall {
        caller,
        nonce,
        value,
        call,
        signature,
    };

    // Re-encoding must reproduce the input exactly.
    if encode_signed_call(&signed) != bytes {
        return Err(malformed("non-canonical encoding"));
    }

    Ok(signed)
}

/// Convert a call to a CBOR map with integer keys.
fn call_to_cbor_value(call: &Call) -> Value {
    let mut entries = vec![(key(call_keys::OP), uint(call.op_code() as u64))];

    match call {
        Call::Register(r) => {
            entries.push((key(call_keys::CONTENT_ID), text(r.content_id.as_str())));
            entries.push((key(call_keys::LOCATOR), text(&r.content_locator)));
            entries.push((key(call_keys::CREATION_TYPE), uint(r.creation_type.to_u8() as u64)));
            entries.push((key(call_keys::PLATFORM_SOURCE), text(&r.platform_source)));
            entries.push((key(call_keys::CONTEXT), text(&r.context)));
        }
        Call::RegisterBatch {
            content_id,
            content_locator,
            creation_type,
        } => {
            entries.push((key(call_keys::CONTENT_ID), text(content_id.as_str())));
            entries.push((key(call_keys::LOCATOR), text(content_locator)));
            entries.push((key(call_keys::CREATION_TYPE), uint(creation_type.to_u8() as u64)));
        }
        Call::Vouch { content_id } => {
            entries.push((key(call_keys::CONTENT_ID), text(content_id.as_str())));
        }
        Call::UpdateCreationType {
            content_id,
            creation_type,
        } => {
            entries.push((key(call_keys::CONTENT_ID), text(content_id.as_str())));
            entries.push((key(call_keys::CREATION_TYPE), uint(creation_type.to_u8() as u64)));
        }
        Call::SetFeeCollector { collector } => {
            entries.push((key(call_keys::IDENTITY), Value::Bytes(collector.0.to_vec())));
        }
        Call::SetRegistrationFee { fee } => {
            entries.push((key(call_keys::AMOUNT), amount(*fee)));
        }
        Call::SetVouchThreshold { threshold } => {
            entries.push((key(call_keys::THRESHOLD), uint(*threshold)));
        }
        Call::TransferAdmin { admin } => {
            entries.push((key(call_keys::IDENTITY), Value::Bytes(admin.0.to_vec())));
        }
    }

    Value::Map(entries)
}

/// Convert a CBOR map back to a call.
fn cbor_value_to_call(value: &Value) -> Result<Call, CoreError> {
    let map = match value {
        Value::Map(m) => m,
        _ => return Err(malformed("expected call map")),
    };

    let op = field(map, call_keys::OP)
        .and_then(as_u64)
        .ok_or_else(|| malformed("missing op"))?;

    let content_id = || -> Result<ContentId, CoreError> {
        get_text(map, call_keys::CONTENT_ID, "content_id").map(ContentId::from)
    };
    let creation_type = || -> Result<CreationType, CoreError> {
        field(map, call_keys::CREATION_TYPE)
            .and_then(as_u64)
            .and_then(|n| u8::try_from(n).ok())
            .and_then(CreationType::from_u8)
            .ok_or_else(|| malformed("invalid creation_type"))
    };
    let identity = || -> Result<Identity, CoreError> {
        fixed_bytes::<32>(field(map, call_keys::IDENTITY), "identity").map(Identity)
    };

    let call = match op {
        1 => Call::Register(Registration {
            content_id: content_id()?,
            content_locator: get_text(map, call_keys::LOCATOR, "content_locator")?,
            creation_type: creation_type()?,
            platform_source: get_text(map, call_keys::PLATFORM_SOURCE, "platform_source")?,
            context: get_text(map, call_keys::CONTEXT, "context")?,
        }),
        2 => Call::RegisterBatch {
            content_id: content_id()?,
            content_locator: get_text(map, call_keys::LOCATOR, "content_locator")?,
            creation_type: creation_type()?,
        },
        3 => Call::Vouch {
            content_id: content_id()?,
        },
        4 => Call::UpdateCreationType {
            content_id: content_id()?,
            creation_type: creation_type()?,
        },
        5 => Call::SetFeeCollector {
            collector: identity()?,
        },
        6 => Call::SetRegistrationFee {
            fee: Amount::from_be_bytes(fixed_bytes::<16>(field(map, call_keys::AMOUNT), "fee")?),
        },
        7 => Call::SetVouchThreshold {
            threshold: field(map, call_keys::THRESHOLD)
                .and_then(as_u64)
                .ok_or_else(|| malformed("missing threshold"))?,
        },
        8 => Call::TransferAdmin { admin: identity()? },
        other => return Err(malformed(&format!("unknown op: {}", other))),
    };

    Ok(call)
}

fn key(k: u64) -> Value {
    Value::Integer(k.into())
}

fn uint(n: u64) -> Value {
    Value::Integer(n.into())
}

fn amount(a: Amount) -> Value {
    Value::Bytes(a.to_be_bytes().to_vec())
}

fn text(s: &str) -> Value {
    Value::Text(s.to_owned())
}

fn malformed(msg: &str) -> CoreError {
    CoreError::MalformedCall(msg.to_owned())
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Integer(i) => u64::try_from(*i).ok(),
        _ => None,
    }
}

fn field(map: &[(Value, Value)], wanted: u64) -> Option<&Value> {
    map.iter()
        .find(|(k, _)| as_u64(k) == Some(wanted))
        .map(|(_, v)| v)
}

fn get_text(map: &[(Value, Value)], wanted: u64, name: &str) -> Result<String, CoreError> {
    match field(map, wanted) {
        Some(Value::Text(s)) => Ok(s.clone()),
        _ => Err(malformed(&format!("invalid {}", name))),
    }
}

fn fixed_bytes<const N: usize>(value: Option<&Value>, name: &str) -> Result<[u8; N], CoreError> {
    match value {
        Some(Value::Bytes(b)) => b
            .as_slice()
            .try_into()
            .map_err(|_| malformed(&format!("invalid {} length", name))),
        _ => Err(malformed(&format!("invalid {}", name))),
    }
}

/// Recursively encode a CBOR value.
///
/// Only integers, byte strings, text and maps are ever produced here.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => {
            let n: i128 = (*i).into();
            if n >= 0 {
                encode_uint(buf, 0, n as u64);
            } else {
                encode_uint(buf, 1, (-1 - n) as u64);
            }
        }
        Value::Bytes(b) => {
            encode_uint(buf, 2, b.len() as u64);
            buf.extend_from_slice(b);
        }
        Value::Text(s) => {
            encode_uint(buf, 3, s.len() as u64);
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Map(entries) => encode_map_canonical(buf, entries),
        _ => unreachable!("call encoding produces only integers, bytes, text and maps"),
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut pairs: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_value_to(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}
