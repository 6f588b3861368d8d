//! Structural diffing of configuration trees.

use serde_json::Value;

/// One step into a nested configuration tree: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// The location of a change, from the root of the tree down.
///
/// Empty for a root-level replacement.
pub type Path = Vec<Segment>;

/// A single detected difference between two configuration trees.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Present in the new tree only.
    Added { path: Path, rhs: Value },

    /// Present in the old tree only.
    Deleted { path: Path, lhs: Value },

    /// Present in both trees, with different values or container types.
    Edited { path: Path, lhs: Value, rhs: Value },

    /// An array grew or shrank; `item` describes the element at `index`
    /// relative to the array located by `path`.
    ArrayChanged {
        path: Path,
        index: usize,
        item: Box<Change>,
    },
}

/// Compares `old` against `new` and returns every difference, in pre-order
/// over the tree structure: object keys in enumeration order, array elements
/// by index. Equal subtrees produce no records.
pub fn diff(old: &Value, new: &Value) -> Vec<Change> {
    let mut changes = Vec::new();
    diff_at(&mut changes, &mut Vec::new(), old, new);
    changes
}

fn diff_at(changes: &mut Vec<Change>, path: &mut Path, old: &Value, new: &Value) {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            for (key, old_value) in old_map {
                path.push(Segment::Key(key.clone()));
                match new_map.get(key) {
                    Some(new_value) => diff_at(changes, path, old_value, new_value),
                    None => changes.push(Change::Deleted {
                        path: path.clone(),
                        lhs: old_value.clone(),
                    }),
                }
                path.pop();
            }
            for (key, new_value) in new_map {
                if !old_map.contains_key(key) {
                    let mut added = path.clone();
                    added.push(Segment::Key(key.clone()));
                    changes.push(Change::Added {
                        path: added,
                        rhs: new_value.clone(),
                    });
                }
            }
        }
        (Value::Array(old_items), Value::Array(new_items)) => {
            for (index, (old_item, new_item)) in old_items.iter().zip(new_items).enumerate() {
                path.push(Segment::Index(index));
                diff_at(changes, path, old_item, new_item);
                path.pop();
            }
            // At most one of these loops runs: surplus elements on either
            // side are array-level changes, not additions or deletions of
            // named fields.
            let shared = old_items.len().min(new_items.len());
            for (index, item) in old_items.iter().enumerate().skip(shared) {
                changes.push(Change::ArrayChanged {
                    path: path.clone(),
                    index,
                    item: Box::new(Change::Deleted {
                        path: Path::new(),
                        lhs: item.clone(),
                    }),
                });
            }
            for (index, item) in new_items.iter().enumerate().skip(shared) {
                changes.push(Change::ArrayChanged {
                    path: path.clone(),
                    index,
                    item: Box::new(Change::Added {
                        path: Path::new(),
                        rhs: item.clone(),
                    }),
                });
            }
        }
        (old, new) if old == new => {}
        (old, new) => changes.push(Change::Edited {
            path: path.clone(),
            lhs: old.clone(),
            rhs: new.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn key(name: &str) -> Segment {
        Segment::Key(name.to_owned())
    }

    #[test]
    fn equal_trees_produce_no_changes() {
        let tree = json!({"a": 1, "b": {"c": [1, 2, 3]}});
        assert_eq!(diff(&tree, &tree), Vec::new());
    }

    #[test]
    fn deleted_key_is_reported_with_its_path() {
        let old = json!({"a": 1, "b": {"c": 2, "d": 3}});
        let new = json!({"a": 1, "b": {"c": 2}});

        assert_eq!(
            diff(&old, &new),
            vec![Change::Deleted {
                path: vec![key("b"), key("d")],
                lhs: json!(3),
            }]
        );
    }

    #[test]
    fn added_and_edited_keys_are_reported() {
        let old = json!({"a": 1});
        let new = json!({"a": 2, "b": 3});

        assert_eq!(
            diff(&old, &new),
            vec![
                Change::Edited {
                    path: vec![key("a")],
                    lhs: json!(1),
                    rhs: json!(2),
                },
                Change::Added {
                    path: vec![key("b")],
                    rhs: json!(3),
                },
            ]
        );
    }

    #[test]
    fn root_scalar_replacement_has_an_empty_path() {
        assert_eq!(
            diff(&json!(1), &json!("one")),
            vec![Change::Edited {
                path: Path::new(),
                lhs: json!(1),
                rhs: json!("one"),
            }]
        );
    }

    #[test]
    fn container_type_mismatch_is_an_edit() {
        let old = json!({"a": {"b": 1}});
        let new = json!({"a": [1]});

        assert_eq!(
            diff(&old, &new),
            vec![Change::Edited {
                path: vec![key("a")],
                lhs: json!({"b": 1}),
                rhs: json!([1]),
            }]
        );
    }

    #[test]
    fn changes_inside_shared_array_indices_are_located_by_index() {
        let old = json!({"items": [{"id": 1, "extra": true}, {"id": 2}]});
        let new = json!({"items": [{"id": 1}, {"id": 2}]});

        assert_eq!(
            diff(&old, &new),
            vec![Change::Deleted {
                path: vec![key("items"), Segment::Index(0), key("extra")],
                lhs: json!(true),
            }]
        );
    }

    #[test]
    fn array_shrink_is_an_array_change_not_a_deletion() {
        let old = json!({"items": [1, 2, 3]});
        let new = json!({"items": [1]});

        assert_eq!(
            diff(&old, &new),
            vec![
                Change::ArrayChanged {
                    path: vec![key("items")],
                    index: 1,
                    item: Box::new(Change::Deleted {
                        path: Path::new(),
                        lhs: json!(2),
                    }),
                },
                Change::ArrayChanged {
                    path: vec![key("items")],
                    index: 2,
                    item: Box::new(Change::Deleted {
                        path: Path::new(),
                        lhs: json!(3),
                    }),
                },
            ]
        );
    }

    #[test]
    fn array_growth_is_an_array_change() {
        let old = json!([1]);
        let new = json!([1, 2]);

        assert_eq!(
            diff(&old, &new),
            vec![Change::ArrayChanged {
                path: Path::new(),
                index: 1,
                item: Box::new(Change::Added {
                    path: Path::new(),
                    rhs: json!(2),
                }),
            }]
        );
    }
}
