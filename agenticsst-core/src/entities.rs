//! Cached entity payloads
//!
//! One payload type per cache namespace: crawled source documents, computed
//! compliance analyses, and generated training scripts.

use crate::{DocumentId, ScenarioId, Timestamp};
use serde::{Deserialize, Serialize};

/// A crawled CNESST source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawledDocument {
    pub document_id: DocumentId,
    pub title: String,
    /// Full extracted text of the document.
    pub content: String,
    pub source_url: Option<String>,
    pub crawled_at: Timestamp,
}

/// A computed compliance analysis over a filtered slice of the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: String,
    /// Structured findings; shape varies per analysis kind.
    pub findings: serde_json::Value,
    /// Documents the analysis drew from. Drives cascade invalidation when a
    /// source document is re-crawled.
    pub document_references: Vec<DocumentId>,
    /// Wall-clock cost of producing this report, when measured.
    pub compute_time_ms: Option<u64>,
    pub generated_at: Timestamp,
}

/// A single agent's contribution to a generated script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentContribution {
    /// Agent name (e.g. "Hugo", "DiagSST").
    pub agent: String,
    /// Role the agent played in the orchestration.
    pub role: String,
    pub content: String,
}

/// A training script generated by the multi-agent orchestration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioScript {
    pub scenario_id: ScenarioId,
    /// Final assembled script text.
    pub script: String,
    pub agent_contributions: Vec<AgentContribution>,
    /// Documents the orchestration cited. Drives cascade invalidation when a
    /// source document is re-crawled.
    pub source_documents: Vec<DocumentId>,
    pub generated_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_document_serde_roundtrip() {
        let doc = CrawledDocument {
            document_id: DocumentId::new("cnesst-88"),
            title: "Mécanismes de participation".to_string(),
            content: "Article 51...".to_string(),
            source_url: Some("https://example.test/88".to_string()),
            crawled_at: Utc::now(),
        };
        let json = serde_json::to_string(&doc).expect("serialize");
        let back: CrawledDocument = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, doc);
    }

    #[test]
    fn test_report_serde_roundtrip() {
        let report = AnalysisReport {
            summary: "3 obligations applicables".to_string(),
            findings: serde_json::json!({"obligations": ["comité SST"]}),
            document_references: vec![DocumentId::new("cnesst-88")],
            compute_time_ms: Some(412),
            generated_at: Utc::now(),
        };
        let json = serde_json::to_string(&report).expect("serialize");
        let back: AnalysisReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, report);
    }

    #[test]
    fn test_script_serde_roundtrip() {
        let script = ScenarioScript {
            scenario_id: ScenarioId::new(3),
            script: "SCÈNE 1 ...".to_string(),
            agent_contributions: vec![AgentContribution {
                agent: "Hugo".to_string(),
                role: "narrateur".to_string(),
                content: "Introduction".to_string(),
            }],
            source_documents: vec![DocumentId::new("cnesst-88")],
            generated_at: Utc::now(),
        };
        let json = serde_json::to_string(&script).expect("serialize");
        let back: ScenarioScript = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, script);
    }
}
