//! Structured decoding of raw backend output

use crate::error::DecodeError;
use insight_model::{AnalysisKind, OutputContract};
use std::marker::PhantomData;

/// Decodes raw text into the result type of one analysis kind
///
/// Missing or blank output is not an error: it decodes to `T::default()`,
/// the canonical empty value for the kind. Anything else must parse as JSON
/// of the declared shape; fields the backend left out take their defaults.
#[derive(Debug, Clone, Copy)]
pub struct ResponseDecoder<T> {
    kind: AnalysisKind,
    _marker: PhantomData<fn() -> T>,
}

impl<T: OutputContract> ResponseDecoder<T> {
    /// Create decoder for `kind`
    #[inline]
    #[must_use]
    pub fn new(kind: AnalysisKind) -> Self {
        Self {
            kind,
            _marker: PhantomData,
        }
    }

    /// Kind this decoder serves
    #[inline]
    #[must_use]
    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    /// Decode one raw output
    ///
    /// # Errors
    /// - `DecodeError::Malformed` if non-empty output does not fit `T`
    pub fn decode(&self, raw: Option<&str>) -> Result<T, DecodeError> {
        decode(self.kind, raw)
    }
}

/// Decode raw output for `kind` into `T`
///
/// # Errors
/// - `DecodeError::Malformed` if non-empty output does not fit `T`
pub fn decode<T: OutputContract>(kind: AnalysisKind, raw: Option<&str>) -> Result<T, DecodeError> {
    let body = strip_code_fence(raw.unwrap_or_default().trim());
    if body.is_empty() {
        tracing::debug!(%kind, "Empty output, using empty result");
        return Ok(T::default());
    }

    let mut value: T = serde_json::from_str(body).map_err(|source| {
        tracing::warn!(%kind, error = %source, "Output does not match schema");
        DecodeError::Malformed { kind, source }
    })?;
    value.normalize();
    Ok(value)
}

/// Remove a surrounding Markdown code fence (```json ... ```)
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the language tag on the opening line.
    match inner.find('\n') {
        Some(newline) => inner[newline + 1..].trim(),
        None => inner.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_model::{
        CompetitorAnalysis, ComprehensiveReport, JourneyMap, OpportunityRecord, PersonaClusters,
        StatisticsResult,
    };
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn empty_output_is_canonical_empty_value() {
        for raw in [None, Some(""), Some("   \n"), Some("```json\n```")] {
            let stats: StatisticsResult = decode(AnalysisKind::Statistics, raw).unwrap();
            assert_eq!(stats, StatisticsResult::default());

            let journey: JourneyMap = decode(AnalysisKind::JourneyMapping, raw).unwrap();
            assert!(journey.is_empty());

            let ops: Vec<OpportunityRecord> = decode(AnalysisKind::OpportunityMining, raw).unwrap();
            assert!(ops.is_empty());
        }
    }

    #[test]
    fn missing_fields_take_defaults() {
        let personas: PersonaClusters =
            decode(AnalysisKind::PersonaClustering, Some(r#"{"clusters":[{"name":"Lin"}]}"#)).unwrap();
        assert_eq!(personas.clusters.len(), 1);
        assert_eq!(personas.clusters[0].name, "Lin");
        assert!(personas.clusters[0].tags.is_empty());
        assert!(personas.clusters[0].portrait().is_none());
    }

    #[test]
    fn fenced_output_is_accepted() {
        let raw = "```json\n{\"conclusion\":\"strong rival\"}\n```";
        let analysis: CompetitorAnalysis =
            decode(AnalysisKind::CompetitorAnalysis, Some(raw)).unwrap();
        assert_eq!(analysis.conclusion, "strong rival");
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let err = decode::<JourneyMap>(AnalysisKind::JourneyMapping, Some(r#"{"phase":"x"}"#))
            .unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { kind: AnalysisKind::JourneyMapping, .. }));

        let err = decode::<StatisticsResult>(AnalysisKind::Statistics, Some("I cannot help with that"))
            .unwrap_err();
        assert!(err.to_string().starts_with("statistics output"));
    }

    #[test]
    fn decoded_values_are_normalized() {
        let raw = r#"[{"phase":"Discover","emotions":9},{"phase":"Buy","emotions":-2}]"#;
        let journey: JourneyMap = decode(AnalysisKind::JourneyMapping, Some(raw)).unwrap();
        let levels: Vec<f64> = journey.stages().iter().map(|s| s.emotion).collect();
        assert_eq!(levels, vec![5.0, 1.0]);
    }

    #[test]
    fn decoder_wraps_free_function() {
        let decoder = ResponseDecoder::<ComprehensiveReport>::new(AnalysisKind::Comprehensive);
        assert_eq!(decoder.kind(), AnalysisKind::Comprehensive);
        let report = decoder.decode(Some(r#"{"summary":"ok"}"#)).unwrap();
        assert_eq!(report.summary, "ok");
        assert!(report.personas.is_empty());
    }

    proptest! {
        #[test]
        fn decode_never_panics(raw in "\\PC{0,64}") {
            let _ = decode::<StatisticsResult>(AnalysisKind::Statistics, Some(raw.as_str()));
            let _ = decode::<Vec<OpportunityRecord>>(AnalysisKind::OpportunityMining, Some(raw.as_str()));
        }
    }
}
