//! Output schemas
//!
//! Every result type derives `JsonSchema`; `response_schema` lowers the
//! derived JSON Schema into the structured-output dialect the generative
//! backend understands (upper-case `type`, inline definitions, explicit
//! `required` lists). Result types and schemas therefore cannot drift apart.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

/// Guards against runaway recursion through self-referential definitions.
const MAX_DEPTH: usize = 16;

/// A result type the backend can be asked to produce
pub trait OutputContract: DeserializeOwned + Default + JsonSchema {
    /// Bring decoded values back inside their declared bounds
    fn normalize(&mut self) {}

    /// Structured-output schema for this type
    #[must_use]
    fn output_schema() -> Value {
        response_schema::<Self>()
    }
}

/// Derive the backend's structured-output schema for `T`
///
/// Properties are required unless nullable; `$ref`s are inlined.
#[must_use]
pub fn response_schema<T: JsonSchema>() -> Value {
    let root = serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default();
    let definitions = root
        .get("definitions")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    lower(&root, &definitions, 0)
}

fn lower(node: &Value, defs: &Map<String, Value>, depth: usize) -> Value {
    let Some(obj) = node.as_object() else {
        return json!({ "type": "STRING" });
    };
    if depth > MAX_DEPTH {
        return json!({ "type": "OBJECT" });
    }

    if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
        let name = reference.trim_start_matches("#/definitions/");
        let target = defs
            .get(name)
            .map_or_else(|| json!({ "type": "STRING" }), |d| lower(d, defs, depth + 1));
        return with_description(target, obj);
    }

    for combinator in ["allOf", "anyOf", "oneOf"] {
        if let Some(Value::Array(variants)) = obj.get(combinator) {
            let concrete: Vec<&Value> = variants.iter().filter(|v| !is_null_schema(v)).collect();
            if let Some(first) = concrete.first() {
                let mut lowered = lower(first, defs, depth + 1);
                if concrete.len() < variants.len() {
                    lowered["nullable"] = Value::Bool(true);
                }
                return with_description(lowered, obj);
            }
        }
    }

    let (instance_type, nullable) = instance_type(obj.get("type"));
    let mut out = Map::new();
    match instance_type {
        "object" => {
            out.insert("type".into(), json!("OBJECT"));
            let mut properties = Map::new();
            let mut required = Vec::new();
            if let Some(Value::Object(props)) = obj.get("properties") {
                for (name, schema) in props {
                    let lowered = lower(schema, defs, depth + 1);
                    if lowered.get("nullable") != Some(&Value::Bool(true)) {
                        required.push(Value::String(name.clone()));
                    }
                    properties.insert(name.clone(), lowered);
                }
            }
            out.insert("properties".into(), Value::Object(properties));
            if !required.is_empty() {
                out.insert("required".into(), Value::Array(required));
            }
        }
        "array" => {
            out.insert("type".into(), json!("ARRAY"));
            let items = match obj.get("items") {
                Some(Value::Array(tuple)) => tuple.first().cloned().unwrap_or_default(),
                Some(single) => single.clone(),
                None => Value::Null,
            };
            out.insert("items".into(), lower(&items, defs, depth + 1));
        }
        "integer" => {
            out.insert("type".into(), json!("INTEGER"));
        }
        "number" => {
            out.insert("type".into(), json!("NUMBER"));
        }
        "boolean" => {
            out.insert("type".into(), json!("BOOLEAN"));
        }
        _ => {
            out.insert("type".into(), json!("STRING"));
        }
    }
    if nullable {
        out.insert("nullable".into(), Value::Bool(true));
    }
    with_description(Value::Object(out), obj)
}

/// Non-null instance type and whether `null` is also allowed
fn instance_type(ty: Option<&Value>) -> (&str, bool) {
    match ty {
        Some(Value::String(t)) => (t.as_str(), false),
        Some(Value::Array(types)) => {
            let nullable = types.iter().any(|t| t == "null");
            let concrete = types
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null")
                .unwrap_or("string");
            (concrete, nullable)
        }
        _ => ("string", false),
    }
}

fn is_null_schema(schema: &Value) -> bool {
    schema.get("type") == Some(&json!("null"))
}

fn with_description(mut lowered: Value, source: &Map<String, Value>) -> Value {
    if let (Some(description), Some(out)) = (source.get("description"), lowered.as_object_mut()) {
        out.entry("description").or_insert_with(|| description.clone());
    }
    lowered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CompetitorAnalysis, ComprehensiveReport, JourneyMap, OpportunityRecord, PersonaClusters,
        PersonaRecord, StatisticsResult,
    };
    use pretty_assertions::assert_eq;
    use serde::Serialize;
    use std::collections::BTreeSet;

    fn required(schema: &Value) -> BTreeSet<String> {
        schema["required"]
            .as_array()
            .map(|r| r.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn property_names(schema: &Value) -> BTreeSet<String> {
        schema["properties"]
            .as_object()
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn wire_names<T: Serialize>(value: &T) -> BTreeSet<String> {
        serde_json::to_value(value)
            .unwrap()
            .as_object()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn statistics_schema_shape() {
        let schema = StatisticsResult::output_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(
            required(&schema),
            ["charts", "correlations", "opportunities", "painPoints", "summary"]
                .into_iter()
                .map(String::from)
                .collect()
        );

        let chart = &schema["properties"]["charts"]["items"];
        assert_eq!(chart["type"], "OBJECT");
        assert_eq!(chart["properties"]["totalResponses"]["type"], "INTEGER");
        assert_eq!(chart["properties"]["data"]["items"]["properties"]["value"]["type"], "NUMBER");
        assert_eq!(
            required(chart),
            ["data", "title", "totalResponses"].into_iter().map(String::from).collect()
        );
    }

    #[test]
    fn persona_schema_excludes_portrait() {
        let schema = PersonaClusters::output_schema();
        let persona = &schema["properties"]["clusters"]["items"];
        let props = property_names(persona);
        assert!(!props.contains("imageUrl"));
        assert!(props.contains("imagePrompt"));
        assert_eq!(persona["properties"]["age"]["type"], "INTEGER");
        assert_eq!(required(persona).len(), 11);
    }

    #[test]
    fn array_kinds_have_array_roots() {
        let journey = JourneyMap::output_schema();
        assert_eq!(journey["type"], "ARRAY");
        assert_eq!(journey["items"]["properties"]["emotions"]["type"], "NUMBER");

        let opportunities = <Vec<OpportunityRecord>>::output_schema();
        assert_eq!(opportunities["type"], "ARRAY");
        assert_eq!(required(&opportunities["items"]).len(), 4);
    }

    #[test]
    fn descriptions_survive_lowering() {
        let schema = ComprehensiveReport::output_schema();
        assert!(schema["properties"]["summary"]["description"].is_string());
        assert_eq!(schema["properties"]["dataAnalysis"]["type"], "OBJECT");
        assert_eq!(schema["properties"]["journey"]["type"], "ARRAY");
    }

    #[test]
    fn schema_properties_match_wire_names() {
        assert_eq!(
            property_names(&StatisticsResult::output_schema()),
            wire_names(&StatisticsResult::default())
        );
        assert_eq!(
            property_names(&CompetitorAnalysis::output_schema()),
            wire_names(&CompetitorAnalysis::default())
        );
        assert_eq!(
            property_names(&ComprehensiveReport::output_schema()),
            wire_names(&ComprehensiveReport::default())
        );
        assert_eq!(
            property_names(&PersonaClusters::output_schema()["properties"]["clusters"]["items"]),
            wire_names(&PersonaRecord::default())
        );
    }

    #[test]
    fn derived_json_schema_accepts_backend_output() {
        let root = serde_json::to_value(schemars::schema_for!(StatisticsResult)).unwrap();
        let compiled = jsonschema::JSONSchema::compile(&root).unwrap();

        let good = json!({
            "charts": [{"title": "Q1", "totalResponses": 2, "data": [{"label": "Yes", "value": 2}]}],
            "correlations": [],
            "painPoints": [],
            "opportunities": [],
            "summary": "ok"
        });
        assert!(compiled.is_valid(&good));

        let bad = json!({ "charts": "not a list" });
        assert!(!compiled.is_valid(&bad));
    }
}
