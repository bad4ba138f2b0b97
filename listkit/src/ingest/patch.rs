use crate::row::Row;

use super::RowPatch;

/// Apply `patch` to `rows`, matching rows by the `id_key` field.
///
/// Returns whether anything changed. `Update` and `Remove` do nothing when
/// no row carries the id; an `Update` row without an id never matches.
pub fn apply_patch(rows: &mut Vec<Row>, patch: &RowPatch, id_key: &str) -> bool {
    match patch {
        RowPatch::ReplaceAll(next) => {
            *rows = next.clone();
            true
        }
        RowPatch::Append(row) => {
            rows.push(row.clone());
            true
        }
        RowPatch::Update(row) => {
            let Some(id) = row.id(id_key) else {
                return false;
            };
            match rows.iter_mut().find(|r| r.id(id_key).as_ref() == Some(&id)) {
                Some(slot) => {
                    *slot = row.clone();
                    true
                }
                None => false,
            }
        }
        RowPatch::Remove(id) => {
            let before = rows.len();
            rows.retain(|r| r.id(id_key).as_ref() != Some(id));
            rows.len() != before
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::RowId;
    use serde_json::json;

    fn row(v: serde_json::Value) -> Row {
        Row::from_value(v).unwrap()
    }

    fn fixture() -> Vec<Row> {
        vec![row(json!({"id": 1, "n": "a"})), row(json!({"id": 2, "n": "b"}))]
    }

    #[test]
    fn test_update_replaces_matching_row() {
        let mut rows = fixture();
        assert!(apply_patch(
            &mut rows,
            &RowPatch::Update(row(json!({"id": 2, "n": "z"}))),
            "id"
        ));
        assert_eq!(rows[1].get("n"), Some(&json!("z")));
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut rows = fixture();
        let changed = apply_patch(
            &mut rows,
            &RowPatch::Update(row(json!({"id": 9, "n": "z"}))),
            "id",
        );
        assert!(!changed);
        assert_eq!(rows, fixture());
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut rows = fixture();
        assert!(!apply_patch(&mut rows, &RowPatch::Remove(RowId::from(9)), "id"));
        assert!(apply_patch(&mut rows, &RowPatch::Remove(RowId::from(1)), "id"));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_append_and_replace_all() {
        let mut rows = fixture();
        apply_patch(&mut rows, &RowPatch::Append(row(json!({"id": 3}))), "id");
        assert_eq!(rows.len(), 3);
        apply_patch(&mut rows, &RowPatch::ReplaceAll(vec![]), "id");
        assert!(rows.is_empty());
    }
}
