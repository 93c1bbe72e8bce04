use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Certificate status / 证书状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum CertificateStatus {
    Valid,
    Expired,
    Revoked,
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateStatus::Valid => write!(f, "Valid"),
            CertificateStatus::Expired => write!(f, "Expired"),
            CertificateStatus::Revoked => write!(f, "Revoked"),
        }
    }
}

/// A registered certificate. Read-only from this application's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: String,
    pub certificate_number: String,
    pub holder: String,
    pub address: String,
    /// YYYY-MM-DD
    pub issue_date: String,
    pub status: CertificateStatus,
    pub compliance_body: String,
    pub country_of_origin: String,
    pub design_url: String,
}

impl Certificate {
    /// Parsed issue date, if the stored text is a valid ISO date
    pub fn issued_on(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.issue_date, "%Y-%m-%d").ok()
    }
}

/// Structured message body for 404/500 responses / 错误消息结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
