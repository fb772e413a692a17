//! Receipt returned by the index writer for every write attempt.

/// Outcome of a single indexing attempt.
///
/// The writer never fails: backend errors and unexpected acknowledgments are
/// folded into a receipt with `success: false` so the caller's control flow
/// is uniform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReceipt {
    /// Whether the backend acknowledged the document as newly created.
    pub success: bool,
    /// Diagnostic detail for failed attempts.
    pub diagnostic: Option<String>,
}

impl IndexReceipt {
    /// Receipt for a document the backend reported as created.
    pub fn created() -> Self {
        Self {
            success: true,
            diagnostic: None,
        }
    }

    /// Receipt for a write that failed or was not acknowledged as created.
    pub fn failed(diagnostic: impl Into<String>) -> Self {
        Self {
            success: false,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_receipt() {
        let receipt = IndexReceipt::created();
        assert!(receipt.success);
        assert!(receipt.diagnostic.is_none());
    }

    #[test]
    fn test_failed_receipt_keeps_diagnostic() {
        let receipt = IndexReceipt::failed("connection refused");
        assert!(!receipt.success);
        assert_eq!(receipt.diagnostic.as_deref(), Some("connection refused"));
    }
}
