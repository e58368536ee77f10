use migrator_shared::types::DEFAULT_MAX_MISMATCHES;

/// Field-name patterns whose text values must hold structured JSON.
pub const DEFAULT_JSON_FIELD_PATTERNS: &[&str] = &[
    r"^(metadata|settings|config|configuration|payload|data|options|preferences)$",
    r"(?i)json$",
];

/// Values sampled per field by the validity checks.
pub const DEFAULT_SAMPLE_LIMIT: i64 = 1000;

/// Tunables for a verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Regex patterns matched against field names; any match marks the field
    /// as structured text.
    pub json_field_patterns: Vec<String>,
    /// Distinct values read per field by the validity checks. Values beyond
    /// the cap are never inspected.
    pub sample_limit: i64,
    pub max_mismatches: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            json_field_patterns: DEFAULT_JSON_FIELD_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            max_mismatches: DEFAULT_MAX_MISMATCHES,
        }
    }
}
