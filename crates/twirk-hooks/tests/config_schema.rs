// SPDX-License-Identifier: MIT OR Apache-2.0

use schemars::schema_for;
use serde_json::Value;
use twirk_hooks::HooksConfig;

fn config_schema() -> Value {
    serde_json::to_value(schema_for!(HooksConfig)).expect("schema to value")
}

#[test]
fn schema_has_documented_properties() {
    let schema = config_schema();
    let props = schema
        .get("properties")
        .and_then(Value::as_object)
        .expect("schema should have properties");
    let mut keys: Vec<&str> = props.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["prefix", "sample_rate", "statsd_addr"]);
}

#[test]
fn schema_requires_nothing() {
    let schema = config_schema();
    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    assert_eq!(required, 0);
}

#[test]
fn schema_rejects_unknown_fields() {
    let schema = config_schema();
    assert_eq!(schema.get("additionalProperties"), Some(&Value::Bool(false)));
}
