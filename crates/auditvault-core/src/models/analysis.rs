//! Forgery analysis results returned by the analysis service.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Classification of one analyzed file (or page/image within it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinalLabel {
    #[serde(rename = "Real", alias = "real", alias = "REAL")]
    Real,
    #[serde(rename = "Forged", alias = "forged", alias = "Fake", alias = "fake")]
    Forged,
    #[serde(
        rename = "AI-Generated",
        alias = "AI Generated",
        alias = "ai_generated",
        alias = "ai-generated"
    )]
    AiGenerated,
}

impl Display for FinalLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FinalLabel::Real => write!(f, "Real"),
            FinalLabel::Forged => write!(f, "Forged"),
            FinalLabel::AiGenerated => write!(f, "AI-Generated"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(alias = "fileLabel", alias = "file")]
    pub file_label: String,
    /// In [0, 1]
    pub confidence: f64,
    /// In [0, 1]
    #[serde(alias = "probabilityFake")]
    pub probability_fake: f64,
    #[serde(alias = "finalLabel")]
    pub final_label: FinalLabel,
}

/// Aggregate counts over a set of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(default)]
    pub real: u32,
    #[serde(default)]
    pub fake: u32,
    #[serde(default)]
    pub total: u32,
}

impl AnalysisSummary {
    /// Count labels: real = Real, fake = Forged, total = everything.
    pub fn from_results(results: &[AnalysisResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result.final_label {
                FinalLabel::Real => summary.real += 1,
                FinalLabel::Forged => summary.fake += 1,
                FinalLabel::AiGenerated => {}
            }
            summary.total += 1;
        }
        summary
    }

    pub fn is_zero(&self) -> bool {
        self.real == 0 && self.fake == 0 && self.total == 0
    }

    /// Results that are not labelled Real.
    pub fn not_real(&self) -> u32 {
        self.total.saturating_sub(self.real)
    }

    /// True when any result is not Real; proceeding then needs confirmation.
    pub fn has_suspect(&self) -> bool {
        self.real < self.total
    }

    /// Text sent to the signing endpoint alongside the CID.
    pub fn to_summary_text(&self) -> String {
        format!(
            "real={};fake={};total={}",
            self.real, self.fake, self.total
        )
    }
}

/// Response body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub results: Vec<AnalysisResult>,
    #[serde(default)]
    pub summary: Option<AnalysisSummary>,
}

impl AnalysisResponse {
    /// Summary supplied by the service, recomputed from results when absent or all zero.
    pub fn effective_summary(&self) -> AnalysisSummary {
        match self.summary {
            Some(summary) if !summary.is_zero() => summary,
            _ => AnalysisSummary::from_results(&self.results),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(label: FinalLabel) -> AnalysisResult {
        AnalysisResult {
            file_label: "page-1".to_string(),
            confidence: 0.9,
            probability_fake: 0.1,
            final_label: label,
        }
    }

    #[test]
    fn test_from_results_counts_labels() {
        let results = vec![
            result(FinalLabel::Real),
            result(FinalLabel::Forged),
            result(FinalLabel::AiGenerated),
            result(FinalLabel::Real),
        ];
        let summary = AnalysisSummary::from_results(&results);
        assert_eq!(summary.real, 2);
        assert_eq!(summary.fake, 1);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.real + summary.not_real(), summary.total);
        assert!(summary.has_suspect());
    }

    #[test]
    fn test_effective_summary_recomputes_when_zero_or_absent() {
        let mut response = AnalysisResponse {
            status: "ok".into(),
            count: 2,
            results: vec![result(FinalLabel::Real), result(FinalLabel::Forged)],
            summary: Some(AnalysisSummary::default()),
        };
        let expected = AnalysisSummary {
            real: 1,
            fake: 1,
            total: 2,
        };
        assert_eq!(response.effective_summary(), expected);

        response.summary = None;
        assert_eq!(response.effective_summary(), expected);
    }

    #[test]
    fn test_effective_summary_prefers_supplied() {
        let supplied = AnalysisSummary {
            real: 5,
            fake: 0,
            total: 5,
        };
        let response = AnalysisResponse {
            status: "ok".into(),
            count: 0,
            results: vec![],
            summary: Some(supplied),
        };
        assert_eq!(response.effective_summary(), supplied);
        assert!(!supplied.has_suspect());
    }

    #[test]
    fn test_deserialize_service_shape() {
        let body = r#"{
            "status": "success",
            "count": 2,
            "results": [
                {"file_label": "img_0", "confidence": 0.97, "probability_fake": 0.03, "final_label": "Real"},
                {"fileLabel": "img_1", "confidence": 0.81, "probabilityFake": 0.81, "finalLabel": "AI-Generated"}
            ],
            "summary": {"real": 1, "fake": 0, "total": 2}
        }"#;
        let response: AnalysisResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[1].final_label, FinalLabel::AiGenerated);
        assert!(response.effective_summary().has_suspect());
    }
}
