use serde::Serialize;

/// Errors the recorder surfaces to its callers
///
/// Producer-side per-sample problems never show up here; they are folded
/// into counters and observed at stop time. This taxonomy covers the
/// start/stop boundary, where a caller can actually react.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("failed to enumerate capture sources: {0}")]
    Enumeration(String),

    #[error("failed to start recording: {0}")]
    Start(String),

    #[error("container append failed: {0}")]
    Append(String),

    #[error("container finalize failed: {0}")]
    Finalize(String),

    #[error("failed to move recording into place: {0}")]
    Relocation(String),

    #[error("gif conversion failed: {0}")]
    Transcode(String),
}

impl RecorderError {
    /// Stable machine-readable code for programmatic callers
    pub fn code(&self) -> &'static str {
        match self {
            RecorderError::Enumeration(_) => "enumeration-failure",
            RecorderError::Start(_) => "start-failure",
            RecorderError::Append(_) => "append-failure",
            RecorderError::Finalize(_) => "finalize-failure",
            RecorderError::Relocation(_) => "relocation-failure",
            RecorderError::Transcode(_) => "transcode-failure",
        }
    }
}

// Errors cross the CLI/report boundary as "<code>: <message>"
impl Serialize for RecorderError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format!("{}: {}", self.code(), self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            RecorderError::Enumeration(String::new()),
            RecorderError::Start(String::new()),
            RecorderError::Append(String::new()),
            RecorderError::Finalize(String::new()),
            RecorderError::Relocation(String::new()),
            RecorderError::Transcode(String::new()),
        ];
        for (i, a) in errors.iter().enumerate() {
            for (j, b) in errors.iter().enumerate() {
                if i != j {
                    assert_ne!(a.code(), b.code());
                }
            }
        }
    }

    #[test]
    fn test_serializes_with_code() {
        let err = RecorderError::Relocation("permission denied".into());
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("relocation-failure"));
        assert!(json.contains("permission denied"));
    }
}
