//! # Verdict
//!
//! The outcome of one validation call. A verdict is produced fresh per
//! call and never mutated afterwards.
//!
//! ## Wire Shape
//!
//! ```json
//! {"ok": true}
//! {"ok": false, "issues": [{"code": "TIME_EXPIRED", "message": "..."}]}
//! ```
//!
//! The issue list holds exactly one entry: the first failing check. The
//! list form leaves room for accumulating further issues later, in which
//! case the first failure stays at index 0.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::issue::{Issue, IssueCode};

/// Accept, or reject with the first failing check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every check passed.
    Valid,
    /// A check failed.
    Invalid(Issue),
}

impl Verdict {
    /// Shorthand for an invalid verdict without a field path.
    pub fn invalid(code: IssueCode, message: impl Into<String>) -> Self {
        Self::Invalid(Issue::new(code, message))
    }

    /// Whether the packet was accepted.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The reported issue, if any.
    pub fn issue(&self) -> Option<&Issue> {
        match self {
            Self::Valid => None,
            Self::Invalid(issue) => Some(issue),
        }
    }

    /// The reported issues as a list (empty when valid).
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Valid => &[],
            Self::Invalid(issue) => std::slice::from_ref(issue),
        }
    }

    /// Code of the reported issue, if any.
    pub fn code(&self) -> Option<IssueCode> {
        self.issue().map(|i| i.code)
    }

    /// Process exit status: 0 valid, 1 invalid packet, 2 environment error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Valid => 0,
            Self::Invalid(issue) => issue.code.exit_class().exit_code(),
        }
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_verdict(self, None, serializer)
    }
}

/// `{"ok", "schema_version"?, "issues"?}`, shared by both wire types.
fn serialize_verdict<S: Serializer>(
    verdict: &Verdict,
    schema_version: Option<&str>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(None)?;
    map.serialize_entry("ok", &verdict.is_valid())?;
    if let Some(version) = schema_version {
        map.serialize_entry("schema_version", version)?;
    }
    if !verdict.is_valid() {
        map.serialize_entry("issues", verdict.issues())?;
    }
    map.end()
}

/// A verdict plus the packet's declared schema version, when it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// The packet's `schema_version` field, if present and a string.
    pub schema_version: Option<String>,
    /// The outcome.
    pub verdict: Verdict,
}

impl ValidationReport {
    /// A report with no schema version.
    pub fn new(verdict: Verdict) -> Self {
        Self {
            schema_version: None,
            verdict,
        }
    }

    /// Pretty-printed JSON, two-space indented.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable rendering for terminals.
    pub fn to_text(&self) -> String {
        match &self.verdict {
            Verdict::Valid => "OK: packet is valid".to_string(),
            Verdict::Invalid(_) => {
                let mut out = String::from("FAIL: packet is invalid");
                for issue in self.verdict.issues() {
                    out.push_str("\n- ");
                    out.push_str(&issue.to_string());
                }
                out
            }
        }
    }
}

impl From<Verdict> for ValidationReport {
    fn from(verdict: Verdict) -> Self {
        Self::new(verdict)
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_verdict(&self.verdict, self.schema_version.as_deref(), serializer)
    }
}
