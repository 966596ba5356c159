use std::cmp::Ordering;

use serde_json::Value;

use crate::models::SortDirection;

/// Compare two optional field values the way the SQLite backend orders them:
/// missing/null first, then numbers, then strings, then everything else.
pub(crate) fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    rank(a).cmp(&rank(b)).then_with(|| match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => Ordering::Equal,
    })
}

fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) | Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(_) => 3,
    }
}

pub(crate) fn apply_direction(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_compare_numerically() {
        let a = json!(9);
        let b = json!(10);
        assert_eq!(compare_fields(Some(&a), Some(&b)), Ordering::Less);
    }

    #[test]
    fn test_missing_sorts_first() {
        let a = json!("2024-01-01T00:00:00Z");
        assert_eq!(compare_fields(None, Some(&a)), Ordering::Less);
        assert_eq!(compare_fields(Some(&Value::Null), None), Ordering::Equal);
    }

    #[test]
    fn test_rfc3339_strings_sort_chronologically() {
        let earlier = json!("2024-03-01T08:00:00.000Z");
        let later = json!("2024-03-01T09:00:00.000Z");
        assert_eq!(
            apply_direction(compare_fields(Some(&earlier), Some(&later)), SortDirection::Descending),
            Ordering::Greater
        );
    }
}
