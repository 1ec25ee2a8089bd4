//! # YAML 1.1 Safe Loading
//!
//! Builds a JSON value tree from the `yaml-rust2` event stream, resolving
//! plain scalars with the YAML 1.1 core rules of the safe loader:
//!
//! - `~`, `null`, `Null`, `NULL` and the empty scalar are null;
//! - `yes`/`no`, `true`/`false` and `on`/`off` (lower, title or upper case)
//!   are booleans;
//! - integers accept `0b` binary, leading-`0` octal, `0x` hex, `_`
//!   separators and base-60 (`190:20:30`);
//! - floats need a `.` (`1.5`, `.5`, `1.0e+3`); `.inf` and `.nan` resolve
//!   but have no JSON form.
//!
//! Quoted and block scalars are always strings. Only the standard `!!`
//! tags are constructed; anything else is rejected.

use std::collections::HashMap;

use serde_json::{Map, Number, Value};
use thiserror::Error;
use yaml_rust2::parser::{Event, EventReceiver, Parser, Tag};
use yaml_rust2::scanner::{ScanError, TScalarStyle};

/// Failure while loading a YAML stream.
#[derive(Error, Debug)]
pub enum YamlError {
    /// The text is not well-formed YAML.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Well-formed YAML that has no JSON value.
    #[error("{0}")]
    Construct(String),
}

/// Parse a single-document YAML stream into a JSON value.
///
/// An empty stream yields `null`.
pub fn from_str(content: &str) -> Result<Value, YamlError> {
    let mut builder = Builder::default();
    let mut parser = Parser::new(content.chars());
    parser.load(&mut builder, true)?;
    builder.finish()
}

enum Key {
    Name(String),
    Merge,
}

enum Frame {
    Sequence {
        anchor: usize,
        items: Vec<Value>,
    },
    Mapping {
        anchor: usize,
        entries: Map<String, Value>,
        key: Option<Key>,
        merged: Vec<Map<String, Value>>,
    },
}

#[derive(Default)]
struct Builder {
    stack: Vec<Frame>,
    anchors: HashMap<usize, Value>,
    documents: Vec<Value>,
    error: Option<String>,
}

impl EventReceiver for Builder {
    fn on_event(&mut self, ev: Event) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.apply(ev) {
            self.error = Some(e);
        }
    }
}

impl Builder {
    fn apply(&mut self, ev: Event) -> Result<(), String> {
        match ev {
            Event::Scalar(raw, style, anchor, tag) => {
                let plain = matches!(style, TScalarStyle::Plain);
                let tag = tag_parts(&tag);
                if plain && tag.is_none() && raw == "<<" && self.expecting_key() {
                    self.set_key(Key::Merge);
                    return Ok(());
                }
                let value = construct_scalar(&raw, plain, tag)?;
                self.remember(anchor, &value);
                self.push(value)
            }
            Event::SequenceStart(anchor, tag) => {
                check_collection_tag(tag_parts(&tag), "seq")?;
                self.stack.push(Frame::Sequence {
                    anchor,
                    items: Vec::new(),
                });
                Ok(())
            }
            Event::MappingStart(anchor, tag) => {
                check_collection_tag(tag_parts(&tag), "map")?;
                self.stack.push(Frame::Mapping {
                    anchor,
                    entries: Map::new(),
                    key: None,
                    merged: Vec::new(),
                });
                Ok(())
            }
            Event::SequenceEnd => match self.stack.pop() {
                Some(Frame::Sequence { anchor, items }) => {
                    let value = Value::Array(items);
                    self.remember(anchor, &value);
                    self.push(value)
                }
                _ => Err("unbalanced end of sequence".to_string()),
            },
            Event::MappingEnd => match self.stack.pop() {
                Some(Frame::Mapping {
                    anchor,
                    mut entries,
                    key: None,
                    merged,
                }) => {
                    // Explicit keys win over merged ones; earlier merges win
                    // over later ones.
                    for map in merged {
                        for (k, v) in map {
                            entries.entry(k).or_insert(v);
                        }
                    }
                    let value = Value::Object(entries);
                    self.remember(anchor, &value);
                    self.push(value)
                }
                _ => Err("unbalanced end of mapping".to_string()),
            },
            Event::Alias(id) => {
                let value = self
                    .anchors
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| "found undefined alias".to_string())?;
                self.push(value)
            }
            _ => Ok(()),
        }
    }

    fn expecting_key(&self) -> bool {
        matches!(self.stack.last(), Some(Frame::Mapping { key: None, .. }))
    }

    fn set_key(&mut self, next: Key) {
        if let Some(Frame::Mapping { key, .. }) = self.stack.last_mut() {
            *key = Some(next);
        }
    }

    fn remember(&mut self, anchor: usize, value: &Value) {
        if anchor > 0 {
            self.anchors.insert(anchor, value.clone());
        }
    }

    fn push(&mut self, value: Value) -> Result<(), String> {
        match self.stack.last_mut() {
            None => self.documents.push(value),
            Some(Frame::Sequence { items, .. }) => items.push(value),
            Some(Frame::Mapping {
                entries,
                key,
                merged,
                ..
            }) => match key.take() {
                None => *key = Some(Key::Name(key_name(value)?)),
                Some(Key::Name(name)) => {
                    entries.insert(name, value);
                }
                Some(Key::Merge) => match value {
                    Value::Object(map) => merged.push(map),
                    Value::Array(items) => {
                        for item in items {
                            match item {
                                Value::Object(map) => merged.push(map),
                                _ => return Err(MERGE_ERROR.to_string()),
                            }
                        }
                    }
                    _ => return Err(MERGE_ERROR.to_string()),
                },
            },
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Value, YamlError> {
        if let Some(e) = self.error {
            return Err(YamlError::Construct(e));
        }
        if self.documents.len() > 1 {
            return Err(YamlError::Construct(
                "expected a single document in the stream".to_string(),
            ));
        }
        Ok(self.documents.pop().unwrap_or(Value::Null))
    }
}

const MERGE_ERROR: &str = "expected a mapping or list of mappings for merging";

fn key_name(value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Array(_) | Value::Object(_) => {
            Err("found unacceptable mapping key: collections cannot be keys".to_string())
        }
    }
}

fn tag_parts(tag: &Option<Tag>) -> Option<(&str, &str)> {
    tag.as_ref()
        .map(|t| (t.handle.as_str(), t.suffix.as_str()))
}

/// `Some(suffix)` for tags in the `tag:yaml.org,2002:` namespace.
fn core_suffix<'a>((handle, suffix): (&'a str, &'a str)) -> Option<&'a str> {
    (handle == "!!" || handle == "tag:yaml.org,2002:").then_some(suffix)
}

fn unknown_tag((handle, suffix): (&str, &str)) -> String {
    format!("could not determine a constructor for the tag {handle}{suffix}")
}

fn check_collection_tag(tag: Option<(&str, &str)>, expected: &str) -> Result<(), String> {
    match tag {
        None => Ok(()),
        Some(tag) if core_suffix(tag) == Some(expected) => Ok(()),
        Some(tag) => Err(unknown_tag(tag)),
    }
}

fn construct_scalar(raw: &str, plain: bool, tag: Option<(&str, &str)>) -> Result<Value, String> {
    let Some(tag) = tag else {
        return if plain {
            resolve_plain(raw)
        } else {
            Ok(Value::String(raw.to_owned()))
        };
    };
    let kind = match core_suffix(tag) {
        Some("str") => return Ok(Value::String(raw.to_owned())),
        Some(kind @ ("null" | "bool" | "int" | "float")) => kind,
        _ => return Err(unknown_tag(tag)),
    };
    let constructed = match (kind, resolve_plain(raw)?) {
        ("null", v @ Value::Null) | ("bool", v @ Value::Bool(_)) => Some(v),
        ("int", Value::Number(n)) if !n.is_f64() => Some(Value::Number(n)),
        ("float", Value::Number(n)) => n.as_f64().and_then(Number::from_f64).map(Value::Number),
        _ => None,
    };
    constructed.ok_or_else(|| format!("cannot construct !!{kind} from {raw:?}"))
}

fn resolve_plain(raw: &str) -> Result<Value, String> {
    if matches!(raw, "" | "~" | "null" | "Null" | "NULL") {
        return Ok(Value::Null);
    }
    if let Some(b) = resolve_bool(raw) {
        return Ok(Value::Bool(b));
    }
    if let Some(int) = resolve_int(raw) {
        let n = int
            .and_then(|i| {
                i64::try_from(i)
                    .map(Number::from)
                    .or_else(|_| u64::try_from(i).map(Number::from))
                    .ok()
            })
            .ok_or_else(|| format!("integer {raw} is out of range"))?;
        return Ok(Value::Number(n));
    }
    if let Some(f) = resolve_float(raw) {
        return Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| format!("cannot represent float {raw} in JSON"));
    }
    Ok(Value::String(raw.to_owned()))
}

fn resolve_bool(raw: &str) -> Option<bool> {
    match raw {
        "yes" | "Yes" | "YES" | "true" | "True" | "TRUE" | "on" | "On" | "ON" => Some(true),
        "no" | "No" | "NO" | "false" | "False" | "FALSE" | "off" | "Off" | "OFF" => Some(false),
        _ => None,
    }
}

fn split_sign(raw: &str) -> (bool, &str) {
    if let Some(rest) = raw.strip_prefix('-') {
        (true, rest)
    } else {
        (false, raw.strip_prefix('+').unwrap_or(raw))
    }
}

fn decimal_chars(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit() || c == '_')
}

fn starts_with_digit(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_digit())
}

/// Outer `None`: not an integer. Inner `None`: an integer that overflows.
fn resolve_int(raw: &str) -> Option<Option<i128>> {
    let (negative, body) = split_sign(raw);
    let magnitude = if let Some(bin) = body.strip_prefix("0b") {
        radix_digits(bin, 2)?
    } else if let Some(hex) = body.strip_prefix("0x") {
        radix_digits(hex, 16)?
    } else if body == "0" {
        Some(0)
    } else if let Some(oct) = body.strip_prefix('0') {
        radix_digits(oct, 8)?
    } else if body.starts_with(|c: char| matches!(c, '1'..='9')) {
        if body.contains(':') {
            sexagesimal_int(body)?
        } else {
            radix_digits(body, 10)?
        }
    } else {
        return None;
    };
    Some(magnitude.map(|m| if negative { -m } else { m }))
}

fn radix_digits(digits: &str, radix: u32) -> Option<Option<i128>> {
    if digits.is_empty() || !digits.chars().all(|c| c == '_' || c.is_digit(radix)) {
        return None;
    }
    let mut acc = Some(0i128);
    for c in digits.chars().filter(|c| *c != '_') {
        let d = c.to_digit(radix)?;
        acc = acc
            .and_then(|a| a.checked_mul(i128::from(radix)))
            .and_then(|a| a.checked_add(i128::from(d)));
    }
    Some(acc)
}

fn sexagesimal_int(body: &str) -> Option<Option<i128>> {
    let mut parts = body.split(':');
    let mut acc = radix_digits(parts.next()?, 10)?;
    for part in parts {
        let segment = sexagesimal_segment(part)?;
        acc = acc
            .and_then(|a| a.checked_mul(60))
            .and_then(|a| a.checked_add(i128::from(segment)));
    }
    Some(acc)
}

/// One base-60 digit group: `[0-5]?[0-9]`.
fn sexagesimal_segment(part: &str) -> Option<u8> {
    let valid = match part.as_bytes() {
        [d] => d.is_ascii_digit(),
        [t, d] => (b'0'..=b'5').contains(t) && d.is_ascii_digit(),
        _ => false,
    };
    if valid {
        part.parse().ok()
    } else {
        None
    }
}

fn resolve_float(raw: &str) -> Option<f64> {
    if matches!(raw, ".nan" | ".NaN" | ".NAN") {
        return Some(f64::NAN);
    }
    let (negative, body) = split_sign(raw);
    let sign = if negative { -1.0 } else { 1.0 };
    if matches!(body, ".inf" | ".Inf" | ".INF") {
        return Some(sign * f64::INFINITY);
    }

    if let Some(frac) = body.strip_prefix('.') {
        // A bare fraction takes no sign.
        if body.len() != raw.len() {
            return None;
        }
        let (digits, exponent) = split_exponent(frac)?;
        if !starts_with_digit(digits) || !decimal_chars(digits) {
            return None;
        }
        return parse_decimal(&body[..=digits.len()], exponent);
    }

    if body.contains(':') {
        return sexagesimal_float(body).map(|v| sign * v);
    }

    let (mantissa, exponent) = split_exponent(body)?;
    let (whole, frac) = mantissa.split_once('.')?;
    if !starts_with_digit(whole) || !decimal_chars(whole) || !decimal_chars(frac) {
        return None;
    }
    parse_decimal(mantissa, exponent).map(|v| sign * v)
}

/// Split off a `[eE][-+][0-9]+` exponent. `None` if one is present but
/// malformed.
fn split_exponent(s: &str) -> Option<(&str, Option<&str>)> {
    let Some(at) = s.find(|c: char| c == 'e' || c == 'E') else {
        return Some((s, None));
    };
    let exponent = &s[at + 1..];
    let digits = exponent
        .strip_prefix('+')
        .or_else(|| exponent.strip_prefix('-'))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((&s[..at], Some(exponent)))
}

fn parse_decimal(mantissa: &str, exponent: Option<&str>) -> Option<f64> {
    let mut text: String = mantissa.chars().filter(|c| *c != '_').collect();
    if let Some(exponent) = exponent {
        text.push('e');
        text.push_str(exponent);
    }
    text.parse().ok()
}

fn sexagesimal_float(body: &str) -> Option<f64> {
    let (whole, frac) = body.split_once('.')?;
    if !decimal_chars(frac) {
        return None;
    }
    let mut parts = whole.split(':');
    let head = parts.next()?;
    if !starts_with_digit(head) || !decimal_chars(head) {
        return None;
    }
    let mut acc: f64 = head.replace('_', "").parse().ok()?;
    let mut groups = 0;
    for part in parts {
        acc = acc * 60.0 + f64::from(sexagesimal_segment(part)?);
        groups += 1;
    }
    if groups == 0 {
        return None;
    }
    let fraction: f64 = format!("0.{}", frac.replace('_', "")).parse().ok()?;
    Some(acc + fraction)
}
