//! Reduces a classification response to a single display line.
//!
//! Every failure mode degrades to returning the raw body so the user always
//! sees something.

use serde_json::Value;

/// The highest-probability entry seen while scanning `predictions`.
struct PredictionCandidate<'a> {
    label: Option<&'a str>,
    probability: f64,
}

/// Summarize a classification response body as
/// `"<label> (<pct>% confidence)"`.
///
/// The first entry with the strictly greatest probability wins, so ties keep
/// the earlier label. Entries without a numeric probability rank below every
/// scored entry. Returns `body` unchanged when it is not JSON, has no
/// non-empty `predictions` array, or the winning entry has no `class_name`.
#[must_use]
pub fn summarize_prediction(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    let Some(predictions) = json
        .get("predictions")
        .and_then(Value::as_array)
        .filter(|p| !p.is_empty())
    else {
        return body.to_string();
    };

    let mut best: Option<PredictionCandidate<'_>> = None;
    for entry in predictions.iter().filter(|e| e.is_object()) {
        let probability = entry
            .get("probability")
            .and_then(Value::as_f64)
            .filter(|p| !p.is_nan())
            .unwrap_or(f64::NEG_INFINITY);

        if best.as_ref().is_none_or(|b| probability > b.probability) {
            best = Some(PredictionCandidate {
                label: entry.get("class_name").and_then(Value::as_str),
                probability,
            });
        }
    }

    match best {
        Some(PredictionCandidate {
            label: Some(label),
            probability,
        }) => {
            let percent = (probability * 100.0).clamp(0.0, 100.0);
            format!("{label} ({percent:.2}% confidence)")
        }
        _ => {
            tracing::debug!("prediction response has no labelled best entry; showing raw body");
            body.to_string()
        }
    }
}
