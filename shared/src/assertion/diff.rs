//! Order-insensitive structural diff between expected and actual values

use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// One difference found while comparing two values
#[derive(Debug, Clone, PartialEq)]
pub enum DiffEntry {
    ValueChanged {
        path: String,
        expected: Value,
        actual: Value,
    },
    TypeChanged {
        path: String,
        expected: Value,
        actual: Value,
    },
    KeyAdded {
        path: String,
        value: Value,
    },
    KeyRemoved {
        path: String,
        value: Value,
    },
    ItemAdded {
        path: String,
        value: Value,
        count: usize,
    },
    ItemRemoved {
        path: String,
        value: Value,
        count: usize,
    },
    RepetitionChanged {
        path: String,
        value: Value,
        expected_count: usize,
        actual_count: usize,
    },
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffEntry::ValueChanged {
                path,
                expected,
                actual,
            } => write!(f, "value changed at {path}: {expected} -> {actual}"),
            DiffEntry::TypeChanged {
                path,
                expected,
                actual,
            } => write!(f, "type changed at {path}: {expected} -> {actual}"),
            DiffEntry::KeyAdded { path, value } => write!(f, "key added at {path}: {value}"),
            DiffEntry::KeyRemoved { path, value } => write!(f, "key removed at {path}: {value}"),
            DiffEntry::ItemAdded { path, value, count } => {
                write!(f, "item added at {path} ({count}x): {value}")
            }
            DiffEntry::ItemRemoved { path, value, count } => {
                write!(f, "item removed at {path} ({count}x): {value}")
            }
            DiffEntry::RepetitionChanged {
                path,
                value,
                expected_count,
                actual_count,
            } => write!(
                f,
                "repetition changed at {path}: {value} expected {expected_count}x, got {actual_count}x"
            ),
        }
    }
}

/// Differences between an expected and an actual value, ignoring sequence order.
///
/// Arrays are compared as multisets: element order is irrelevant but the
/// number of repetitions of each element is not. Strings holding JSON
/// documents (at the top level or as top-level array elements) are decoded
/// first, so encoded message bodies compare by structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnorderedDiff {
    entries: Vec<DiffEntry>,
}

impl UnorderedDiff {
    pub fn compute(expected: &Value, actual: &Value) -> Self {
        let mut entries = Vec::new();
        compare("root", &normalize(expected), &normalize(actual), &mut entries);
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }
}

impl fmt::Display for UnorderedDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return f.write_str("no differences");
        }
        write!(f, "{} difference(s): ", self.entries.len())?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

/// Decode JSON documents embedded in strings, one level deep
pub fn normalize(value: &Value) -> Value {
    match decode(value) {
        Value::Array(items) => Value::Array(items.iter().map(decode).collect()),
        other => other,
    }
}

fn decode(value: &Value) -> Value {
    if let Value::String(text) = value {
        if let Ok(parsed @ (Value::Object(_) | Value::Array(_))) = serde_json::from_str(text) {
            return parsed;
        }
    }
    value.clone()
}

fn compare(path: &str, expected: &Value, actual: &Value, out: &mut Vec<DiffEntry>) {
    match (expected, actual) {
        (Value::Object(expected_map), Value::Object(actual_map)) => {
            for (key, expected_value) in expected_map {
                let child = format!("{path}['{key}']");
                match actual_map.get(key) {
                    Some(actual_value) => compare(&child, expected_value, actual_value, out),
                    None => out.push(DiffEntry::KeyRemoved {
                        path: child,
                        value: expected_value.clone(),
                    }),
                }
            }
            for (key, actual_value) in actual_map {
                if !expected_map.contains_key(key) {
                    out.push(DiffEntry::KeyAdded {
                        path: format!("{path}['{key}']"),
                        value: actual_value.clone(),
                    });
                }
            }
        }
        (Value::Array(expected_items), Value::Array(actual_items)) => {
            compare_unordered(path, expected_items, actual_items, out);
        }
        (Value::Number(e), Value::Number(a)) => {
            if canonical_number(e) != canonical_number(a) {
                out.push(DiffEntry::ValueChanged {
                    path: path.to_string(),
                    expected: expected.clone(),
                    actual: actual.clone(),
                });
            }
        }
        _ if kind(expected) != kind(actual) => out.push(DiffEntry::TypeChanged {
            path: path.to_string(),
            expected: expected.clone(),
            actual: actual.clone(),
        }),
        _ if expected != actual => out.push(DiffEntry::ValueChanged {
            path: path.to_string(),
            expected: expected.clone(),
            actual: actual.clone(),
        }),
        _ => {}
    }
}

fn compare_unordered(path: &str, expected: &[Value], actual: &[Value], out: &mut Vec<DiffEntry>) {
    let expected_counts = tally(expected);
    let actual_counts = tally(actual);
    let item_path = format!("{path}[*]");

    for (key, (value, expected_count)) in &expected_counts {
        match actual_counts.get(key) {
            None => out.push(DiffEntry::ItemRemoved {
                path: item_path.clone(),
                value: (*value).clone(),
                count: *expected_count,
            }),
            Some((_, actual_count)) if actual_count != expected_count => {
                out.push(DiffEntry::RepetitionChanged {
                    path: item_path.clone(),
                    value: (*value).clone(),
                    expected_count: *expected_count,
                    actual_count: *actual_count,
                });
            }
            Some(_) => {}
        }
    }
    for (key, (value, actual_count)) in &actual_counts {
        if !expected_counts.contains_key(key) {
            out.push(DiffEntry::ItemAdded {
                path: item_path.clone(),
                value: (*value).clone(),
                count: *actual_count,
            });
        }
    }
}

fn tally(items: &[Value]) -> BTreeMap<String, (&Value, usize)> {
    let mut counts: BTreeMap<String, (&Value, usize)> = BTreeMap::new();
    for item in items {
        counts.entry(canonical(item)).or_insert((item, 0)).1 += 1;
    }
    counts
}

/// Order-independent textual form: equal multisets produce equal strings
fn canonical(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let mut parts: Vec<String> = items.iter().map(canonical).collect();
            parts.sort();
            format!("[{}]", parts.join(","))
        }
        Value::Object(map) => {
            let mut parts: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{}:{}", Value::String(key.clone()), canonical(value)))
                .collect();
            parts.sort();
            format!("{{{}}}", parts.join(","))
        }
        Value::Number(number) => canonical_number(number),
        other => other.to_string(),
    }
}

// 1 and 1.0 are the same number for comparison purposes
fn canonical_number(number: &Number) -> String {
    if let Some(i) = number.as_i64() {
        return i.to_string();
    }
    if let Some(u) = number.as_u64() {
        return u.to_string();
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => (f as i64).to_string(),
        Some(f) => f.to_string(),
        None => number.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
