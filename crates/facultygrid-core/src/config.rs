use serde::{Deserialize, Serialize};

/// Pipeline settings.
///
/// Deserializes from a partial JSON object; missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Top-level key of the final schedule.
    pub institution: String,
    /// Second-level key of the final schedule.
    pub department: String,
    /// Header markers of the joint-session columns.
    pub joint_session_columns: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            institution: "LDRP-ITR".to_string(),
            department: "CE".to_string(),
            joint_session_columns: vec!["MISC1".to_string(), "MISC2".to_string()],
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = institution.into();
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    pub fn with_joint_session_columns<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.joint_session_columns = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a header names one of the joint-session columns.
    ///
    /// Comparison ignores case and whitespace, so `"Misc 1"` matches `MISC1`.
    pub fn is_joint_session_column(&self, header: &str) -> bool {
        let key = squash(header);
        !key.is_empty()
            && self
                .joint_session_columns
                .iter()
                .any(|marker| squash(marker) == key)
    }
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
