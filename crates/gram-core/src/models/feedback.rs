use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    Pending,
    Reviewed,
    Resolved,
}

impl Display for FeedbackStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FeedbackStatus::Pending => write!(f, "pending"),
            FeedbackStatus::Reviewed => write!(f, "reviewed"),
            FeedbackStatus::Resolved => write!(f, "resolved"),
        }
    }
}

impl FromStr for FeedbackStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FeedbackStatus::Pending),
            "reviewed" => Ok(FeedbackStatus::Reviewed),
            "resolved" => Ok(FeedbackStatus::Resolved),
            _ => Err(anyhow::anyhow!("Invalid feedback status: {}", s)),
        }
    }
}

/// Citizen feedback submitted through the public site
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub status: FeedbackStatus,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Feedback {
    /// Case-insensitive match over name, email, subject and message
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        [&self.name, &self.email, &self.subject, &self.message]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

/// `PUT /feedback/{id}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackStatusUpdate {
    pub status: FeedbackStatus,
    #[serde(default)]
    pub admin_notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            FeedbackStatus::Pending,
            FeedbackStatus::Reviewed,
            FeedbackStatus::Resolved,
        ] {
            assert_eq!(status.to_string().parse::<FeedbackStatus>().unwrap(), status);
        }
        assert!("closed".parse::<FeedbackStatus>().is_err());
    }

    #[test]
    fn search_is_case_insensitive() {
        let feedback: Feedback = serde_json::from_value(serde_json::json!({
            "_id": "f1",
            "name": "Asha Patil",
            "email": "asha@example.org",
            "subject": "Street lights",
            "message": "Lights on ward 3 are off",
            "status": "pending"
        }))
        .unwrap();
        assert!(feedback.matches_search("STREET"));
        assert!(feedback.matches_search("ward 3"));
        assert!(!feedback.matches_search("water"));
    }

    #[test]
    fn status_update_uses_camel_case() {
        let update = FeedbackStatusUpdate {
            status: FeedbackStatus::Resolved,
            admin_notes: "Fixed".to_string(),
        };
        let value = serde_json::to_value(update).unwrap();
        assert_eq!(value["status"], "resolved");
        assert_eq!(value["adminNotes"], "Fixed");
    }
}
