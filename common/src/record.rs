use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Deserializer, de::Error};
use serde_json::Value;

pub const UNKNOWN_BENCHMARK: &str = "unknown";

/// One entry of a JMH `-rf json` result file.
///
/// Every field is optional, JMH output from older versions or hand-edited files
/// may lack any of them. `params` is a [`BTreeMap`] so iteration is key-ordered.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JmhResult {
    pub benchmark: Option<String>,
    pub mode: Option<String>,
    pub params: Option<BTreeMap<String, Value>>,
    pub primary_metric: Option<PrimaryMetric>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryMetric {
    #[serde(default, deserialize_with = "jmh_number")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "jmh_number")]
    pub score_error: Option<f64>,
    pub score_unit: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JmhNumber {
    Number(f64),
    Text(String),
}

/// JMH writes non-finite doubles as quoted strings, e.g. `"scoreError" : "NaN"`
fn jmh_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<JmhNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(JmhNumber::Number(value)) => Ok(Some(value)),
        Some(JmhNumber::Text(text)) => match text.as_str() {
            "NaN" => Ok(Some(f64::NAN)),
            "Infinity" => Ok(Some(f64::INFINITY)),
            "-Infinity" => Ok(Some(f64::NEG_INFINITY)),
            other => Err(D::Error::custom(format!(
                "expected a number, found string \"{other}\""
            ))),
        },
    }
}

/// A flattened benchmark result, ready to be charted
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRecord {
    pub label: String,
    pub score: Option<f64>,
    pub score_error: f64,
    pub unit: String,
    pub mode: String,
}

impl From<JmhResult> for BenchmarkRecord {
    fn from(result: JmhResult) -> Self {
        let name = result
            .benchmark
            .unwrap_or_else(|| UNKNOWN_BENCHMARK.to_owned());
        let params = result.params.unwrap_or_default();
        let metric = result.primary_metric.unwrap_or_default();

        BenchmarkRecord {
            label: benchmark_label(&name, &params),
            score: metric.score,
            score_error: metric.score_error.unwrap_or(0.0),
            unit: metric.score_unit.unwrap_or_default(),
            mode: result.mode.unwrap_or_default(),
        }
    }
}

/// Builds `name [k1=v1, k2=v2]`, or just `name` when there are no params.
pub fn benchmark_label(name: &str, params: &BTreeMap<String, Value>) -> String {
    if params.is_empty() {
        return name.to_owned();
    }
    let joined = params
        .iter()
        .map(|(key, value)| format!("{key}={}", param_value(value)))
        .join(", ");
    format!("{name} [{joined}]")
}

fn param_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
