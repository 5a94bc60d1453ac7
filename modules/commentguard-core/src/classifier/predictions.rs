// Shape validation for raw model output.
//
// Accepted per-item forms:
//   "LABEL_1"                                  bare label
//   1                                          integer class
//   {"label": "LABEL_1", "score": 0.97}        single prediction
//   [{"label": ..., "score": ...}, ...]        all class scores, best wins
// Accepted envelopes: a bare array, or {"labels": [...]} / {"predictions": [...]}.
// {"error": "..."} means the backend is up but refused the batch.

use serde_json::Value;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub score: Option<f64>,
}

/// Validate `value` as exactly `expected` predictions.
pub fn parse_predictions(value: Value, expected: usize) -> Result<Vec<Prediction>> {
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut obj) => {
            if let Some(err) = obj.get("error") {
                let message = err
                    .as_str()
                    .map(String::from)
                    .unwrap_or_else(|| err.to_string());
                return Err(PipelineError::ClassifierUnavailable(message));
            }
            match obj.remove("labels").or_else(|| obj.remove("predictions")) {
                Some(Value::Array(entries)) => entries,
                _ => {
                    return Err(PipelineError::ClassifierProtocolError(
                        "object result has no labels array".into(),
                    ))
                }
            }
        }
        other => {
            return Err(PipelineError::ClassifierProtocolError(format!(
                "expected an array of predictions, got {}",
                kind_of(&other)
            )))
        }
    };

    if entries.len() != expected {
        return Err(PipelineError::ClassifierProtocolError(format!(
            "expected {expected} predictions, got {}",
            entries.len()
        )));
    }

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            parse_entry(entry).ok_or_else(|| {
                PipelineError::ClassifierProtocolError(format!(
                    "prediction {i} has no recognizable label: {entry}"
                ))
            })
        })
        .collect()
}

fn parse_entry(entry: &Value) -> Option<Prediction> {
    match entry {
        Value::String(label) => Some(Prediction {
            label: label.clone(),
            score: None,
        }),
        Value::Number(n) => n.as_i64().map(|class| Prediction {
            label: class.to_string(),
            score: None,
        }),
        Value::Object(obj) => {
            let label = match obj.get("label")? {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.as_i64()?.to_string(),
                _ => return None,
            };
            let score = obj.get("score").and_then(Value::as_f64);
            Some(Prediction { label, score })
        }
        Value::Array(candidates) => {
            let parsed: Option<Vec<Prediction>> = candidates.iter().map(parse_entry).collect();
            parsed?.into_iter().max_by(|a, b| {
                a.score
                    .unwrap_or(f64::MIN)
                    .total_cmp(&b.score.unwrap_or(f64::MIN))
            })
        }
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_prediction_objects() {
        let preds = parse_predictions(
            json!([
                {"label": "LABEL_1", "score": 0.91},
                {"label": "LABEL_0", "score": 0.88}
            ]),
            2,
        )
        .unwrap();

        assert_eq!(preds[0].label, "LABEL_1");
        assert_eq!(preds[0].score, Some(0.91));
        assert_eq!(preds[1].label, "LABEL_0");
    }

    #[test]
    fn nested_class_scores_pick_the_best() {
        let preds = parse_predictions(
            json!([
                [{"label": "LABEL_0", "score": 0.2}, {"label": "LABEL_1", "score": 0.8}],
                [{"label": "LABEL_0", "score": 0.6}, {"label": "LABEL_1", "score": 0.4}]
            ]),
            2,
        )
        .unwrap();

        assert_eq!(preds[0].label, "LABEL_1");
        assert_eq!(preds[1].label, "LABEL_0");
    }

    #[test]
    fn bare_labels_and_integer_classes() {
        let preds = parse_predictions(json!(["flagged", 0, 1]), 3).unwrap();
        let labels: Vec<_> = preds.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["flagged", "0", "1"]);
    }

    #[test]
    fn labels_envelope_is_unwrapped() {
        let preds = parse_predictions(json!({"labels": ["clean", "flagged"]}), 2).unwrap();
        assert_eq!(preds.len(), 2);

        let preds = parse_predictions(json!({"predictions": [1]}), 1).unwrap();
        assert_eq!(preds[0].label, "1");
    }

    #[test]
    fn length_mismatch_is_a_protocol_error() {
        let err = parse_predictions(json!(["clean"]), 2).unwrap_err();
        assert!(matches!(err, PipelineError::ClassifierProtocolError(_)));
    }

    #[test]
    fn unrecognizable_entry_is_a_protocol_error() {
        let err = parse_predictions(json!([{"score": 0.5}]), 1).unwrap_err();
        assert!(matches!(err, PipelineError::ClassifierProtocolError(_)));

        let err = parse_predictions(json!([true]), 1).unwrap_err();
        assert!(matches!(err, PipelineError::ClassifierProtocolError(_)));
    }

    #[test]
    fn non_array_result_is_a_protocol_error() {
        let err = parse_predictions(json!("not json"), 1).unwrap_err();
        assert!(matches!(err, PipelineError::ClassifierProtocolError(_)));

        let err = parse_predictions(json!({"counts": {}}), 1).unwrap_err();
        assert!(matches!(err, PipelineError::ClassifierProtocolError(_)));
    }

    #[test]
    fn error_body_means_unavailable() {
        let err = parse_predictions(
            json!({"error": "Model is currently loading", "estimated_time": 20.0}),
            3,
        )
        .unwrap_err();

        match err {
            PipelineError::ClassifierUnavailable(msg) => {
                assert_eq!(msg, "Model is currently loading")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
