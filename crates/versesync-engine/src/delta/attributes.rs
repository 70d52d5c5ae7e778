use super::op::Attributes;

/// Compose attribute map `b` on top of `a`.
///
/// Keys present in `b` win; `null` values in `b` survive only when `keep_null`
/// is set (composing two retains), otherwise they erase the key.
pub fn compose(a: &Attributes, b: &Attributes, keep_null: bool) -> Attributes {
    let mut composed: Attributes = b
        .iter()
        .filter(|(_, value)| keep_null || !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for (key, value) in a {
        if !b.contains_key(key) {
            composed.insert(key.clone(), value.clone());
        }
    }

    composed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::op::attrs as map;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_later_attributes_win() {
        let a = map(json!({ "segment": "verse_1_1", "bold": true }));
        let b = map(json!({ "segment": "verse_1_2" }));
        assert_eq!(
            compose(&a, &b, false),
            map(json!({ "segment": "verse_1_2", "bold": true }))
        );
    }

    #[test]
    fn test_null_removes_unless_kept() {
        let a = map(json!({ "highlight-segment": true }));
        let b = map(json!({ "highlight-segment": null }));
        assert!(compose(&a, &b, false).is_empty());
        assert_eq!(
            compose(&a, &b, true),
            map(json!({ "highlight-segment": null }))
        );
    }
}
