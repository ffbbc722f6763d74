//! Sample policy corpus used to seed a fresh store.

use super::types::Document;

/// Sample policy chunks, so questions like "What's our data retention
/// policy?" can be answered without manual ingestion.
pub fn sample_documents() -> Vec<Document> {
    vec![
        Document::new(
            "Data Retention Policy: Keep customer data for 7 years after account closure. \
             After 7 years, data must be securely deleted or anonymized.",
        )
        .with_metadata("source", "data-retention-policy")
        .with_metadata("section", "customer-data"),
        Document::new(
            "Internal policy: Employee records must be retained for 6 years for compliance. \
             Payroll and tax records: 7 years.",
        )
        .with_metadata("source", "hr-policy")
        .with_metadata("section", "employee-records"),
        Document::new(
            "Security and access: Only authorized personnel may access customer PII. \
             Access is logged and audited quarterly.",
        )
        .with_metadata("source", "security-policy")
        .with_metadata("section", "access-control"),
        Document::new(
            "Data retention exception: Legal hold may extend retention beyond 7 years \
             until the hold is released by Legal.",
        )
        .with_metadata("source", "data-retention-policy")
        .with_metadata("section", "exceptions"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_documents_are_attributed() {
        let docs = sample_documents();
        assert_eq!(docs.len(), 4);
        assert!(docs.iter().all(|d| d.source().is_some() && !d.content.trim().is_empty()));
        assert!(docs.iter().all(|d| d.metadata.contains_key("section")));
    }
}
