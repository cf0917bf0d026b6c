use serde_json::Value;

/// Overlays the top-level fields of `overlay` onto `base`.
///
/// Used to build full-object update payloads: the entity as last fetched,
/// with the draft's fields replacing the old values.
pub fn merge_payload(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                base.insert(key, value);
            }
            Value::Object(base)
        }
        (_, overlay) => overlay,
    }
}

/// Extracts the human-readable `detail` of an error body.
///
/// Accepts a plain string or a list of `{ "msg": ... }` entries.
pub fn extract_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|e| e.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

/// Reads the `path` of an upload response.
pub fn parse_upload_path(body: &Value) -> Option<String> {
    body.get("path")
        .and_then(|p| p.as_str())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_overlays_draft_on_entity() {
        let entity = json!({
            "id": 4,
            "name": "Asiimov",
            "photo": "uploads/old.png",
            "type": { "id": 1, "name": "Skin" }
        });
        let draft = json!({ "name": "Asiimov (FT)", "type_id": 2 });

        let merged = merge_payload(entity, draft);
        assert_eq!(merged["id"], json!(4));
        assert_eq!(merged["name"], json!("Asiimov (FT)"));
        assert_eq!(merged["photo"], json!("uploads/old.png"));
        assert_eq!(merged["type_id"], json!(2));
        assert_eq!(merged["type"]["id"], json!(1));
    }

    #[test]
    fn detail_as_string() {
        let body = json!({ "detail": "Category with this name already exists" });
        assert_eq!(
            extract_detail(&body).as_deref(),
            Some("Category with this name already exists")
        );
    }

    #[test]
    fn detail_as_validation_list() {
        let body = json!({
            "detail": [
                { "loc": ["body", "name"], "msg": "field required", "type": "value_error.missing" },
                { "loc": ["body", "cost"], "msg": "value is not a valid integer" }
            ]
        });
        assert_eq!(
            extract_detail(&body).as_deref(),
            Some("field required; value is not a valid integer")
        );
    }

    #[test]
    fn missing_or_odd_detail() {
        assert_eq!(extract_detail(&json!({ "error": "boom" })), None);
        assert_eq!(extract_detail(&json!({ "detail": 42 })), None);
        assert_eq!(extract_detail(&json!({ "detail": "" })), None);
        assert_eq!(extract_detail(&json!("plain text")), None);
    }

    #[test]
    fn upload_path() {
        assert_eq!(
            parse_upload_path(&json!({ "path": "uploads/a.png" })).as_deref(),
            Some("uploads/a.png")
        );
        assert_eq!(parse_upload_path(&json!({ "path": "" })), None);
        assert_eq!(parse_upload_path(&json!({})), None);
    }
}
