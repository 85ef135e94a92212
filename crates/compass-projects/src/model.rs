use chrono::{DateTime, Utc};
use compass_core::{CompassError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// EU AI Act risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RiskLevel {
    Unacceptable,
    High,
    Limited,
    Minimal,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Unacceptable => "Unacceptable",
            RiskLevel::High => "High",
            RiskLevel::Limited => "Limited",
            RiskLevel::Minimal => "Minimal",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = CompassError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unacceptable" => Ok(RiskLevel::Unacceptable),
            "high" => Ok(RiskLevel::High),
            "limited" => Ok(RiskLevel::Limited),
            "minimal" => Ok(RiskLevel::Minimal),
            other => Err(CompassError::ProjectError(format!("unknown risk level '{other}'"))),
        }
    }
}

impl TryFrom<String> for RiskLevel {
    type Error = CompassError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        level.as_str().to_string()
    }
}

/// Risk tier plus the classifier's justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk: RiskLevel,
    pub reason: String,
}

impl RiskAssessment {
    /// Parse a classifier reply of the form `{"risk": "...", "reason": "..."}`.
    ///
    /// Model output often wraps the object in prose or a code fence, so only
    /// the outermost braces are considered.
    pub fn parse(raw: &str) -> Result<Self> {
        let start = raw.find('{');
        let end = raw.rfind('}');
        let body = match (start, end) {
            (Some(start), Some(end)) if start < end => &raw[start..=end],
            _ => {
                return Err(CompassError::ProjectError(
                    "risk assessment is not a JSON object".into(),
                ))
            }
        };

        serde_json::from_str(body)
            .map_err(|e| CompassError::ProjectError(format!("invalid risk assessment: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub market: BTreeSet<String>,
    pub eu_risk: Option<RiskLevel>,
    pub eu_risk_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<PathBuf>,
    pub created_date: DateTime<Utc>,
}

/// Input for registering a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub market: Vec<String>,
    #[serde(default)]
    pub attachment: Option<PathBuf>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_market<I, S>(mut self, markets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.market.extend(markets.into_iter().map(Into::into));
        self
    }

    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachment = Some(path.into());
        self
    }

    /// Trimmed, de-duplicated market names with blanks dropped.
    pub fn markets(&self) -> BTreeSet<String> {
        self.market
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        if self.markets().is_empty() {
            missing.push("market");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CompassError::ProjectError(format!(
                "missing required field: {}",
                missing.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assessment_inside_prose() {
        let raw = "Here is the classification:\n```json\n{\"risk\": \"high\", \"reason\": \"Biometric identification in public spaces.\"}\n```";
        let assessment = RiskAssessment::parse(raw).unwrap();
        assert_eq!(assessment.risk, RiskLevel::High);
        assert!(assessment.reason.starts_with("Biometric"));
    }

    #[test]
    fn test_parse_assessment_rejects_unknown_level() {
        let raw = r#"{"risk": "Catastrophic", "reason": "?"}"#;
        assert!(RiskAssessment::parse(raw).is_err());
        assert!(RiskAssessment::parse("no json here").is_err());
    }

    #[test]
    fn test_validate_reports_all_missing_fields() {
        let err = NewProject::new("", " ").with_market([" "]).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Project error: missing required field: name, description, market"
        );
    }

    #[test]
    fn test_project_json_uses_camel_case() {
        let project = Project {
            id: 1,
            name: "Face gate".into(),
            description: "Facial recognition at entrances".into(),
            market: ["EU".to_string()].into_iter().collect(),
            eu_risk: Some(RiskLevel::High),
            eu_risk_reason: Some("Biometric".into()),
            attachment: None,
            created_date: Utc::now(),
        };

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["euRisk"], "High");
        assert_eq!(json["euRiskReason"], "Biometric");
        assert!(json.get("createdDate").is_some());
    }
}
