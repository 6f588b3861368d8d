//! Turning deletions into explicit nulls.

use serde_json::{Map, Value};

use super::diff::{Change, Segment, diff};

/// Returns a clone of `new` in which every path that was deleted relative to
/// `old` is explicitly set to `null` instead of being absent.
///
/// Additions and edits in `new` are left untouched, and array shrinkage is
/// not a deletion (see [`Change::ArrayChanged`]), so it produces no nulls.
/// Neither input is mutated, and `synthesize_nulls(cfg, cfg)` returns a plain
/// clone of `cfg`.
pub fn synthesize_nulls(old: &Value, new: &Value) -> Value {
    let mut result = new.clone();
    for change in diff(old, &result) {
        if let Change::Deleted { path, .. } = change {
            write_value(&mut result, &path, Value::Null);
        }
    }
    result
}

/// Writes `value` at `path` inside `target`, materializing intermediate
/// containers as needed: objects for key segments, arrays (padded with
/// nulls) for index segments.
fn write_value(target: &mut Value, path: &[Segment], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *target = value;
        return;
    };

    let mut cursor = target;
    for segment in parents {
        cursor = slot(cursor, segment);
    }
    *slot(cursor, last) = value;
}

/// The child slot of `parent` addressed by `segment`.
fn slot<'a>(parent: &'a mut Value, segment: &Segment) -> &'a mut Value {
    match segment {
        Segment::Key(name) => {
            if !parent.is_object() {
                *parent = Value::Object(Map::new());
            }
            match parent {
                Value::Object(map) => map.entry(name.as_str()).or_insert(Value::Null),
                _ => unreachable!("parent was just materialized as an object"),
            }
        }
        Segment::Index(index) => {
            if !parent.is_array() {
                *parent = Value::Array(Vec::new());
            }
            match parent {
                Value::Array(items) => {
                    if items.len() <= *index {
                        items.resize(index + 1, Value::Null);
                    }
                    &mut items[*index]
                }
                _ => unreachable!("parent was just materialized as an array"),
            }
        }
    }
}
