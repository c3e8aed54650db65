use schemars::{schema_for, JsonSchema};

/// Generate a tool `input_schema` for `T`.
///
/// The Messages API accepts plain JSON Schema but rejects the `$schema`
/// marker, and behaves better when object schemas forbid extra properties.
pub fn tool_schema<T: JsonSchema>() -> serde_json::Value {
    let schema = schema_for!(T);
    let mut value = serde_json::to_value(schema).unwrap_or_default();

    close_object_schemas(&mut value);

    if let serde_json::Value::Object(map) = &mut value {
        map.remove("$schema");
    }

    value
}

fn close_object_schemas(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if map.get("type") == Some(&serde_json::Value::String("object".to_string())) {
                map.insert(
                    "additionalProperties".to_string(),
                    serde_json::Value::Bool(false),
                );
            }
            for (_, v) in map.iter_mut() {
                close_object_schemas(v);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                close_object_schemas(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct LabelSeen {
        upc: Option<String>,
        title: Option<String>,
    }

    #[test]
    fn schema_is_closed_and_unmarked() {
        let schema = tool_schema::<LabelSeen>();
        assert!(schema.get("$schema").is_none());
        assert_eq!(schema["additionalProperties"], false);
        assert!(schema["properties"].get("upc").is_some());
    }
}
