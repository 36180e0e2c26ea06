use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A content record (announcement, gallery item, award, ...) as returned by the backend.
///
/// Only the fields every content type shares are typed; the rest stay in `fields`
/// and are interpreted through the content descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Empty for singleton resources the backend stores without an id
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "isActive", default = "default_active")]
    pub is_active: bool,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

fn default_active() -> bool {
    true
}

impl Record {
    /// Plain text value of a field, if present and a string
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// One language of a bilingual `{en, mr}` field
    pub fn localized(&self, name: &str, lang: Language) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|v| v.get(lang.code()))
            .and_then(Value::as_str)
    }

    /// URL of the stored image, when the record has one
    pub fn image_url(&self) -> Option<&str> {
        ["imageUrl", "image", "photo"]
            .iter()
            .find_map(|key| match self.fields.get(*key) {
                Some(Value::String(url)) => Some(url.as_str()),
                Some(Value::Object(obj)) => obj
                    .get("url")
                    .or_else(|| obj.get("data"))
                    .and_then(Value::as_str),
                _ => None,
            })
    }
}

/// Languages the public website is published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Mr,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Mr];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Mr => "mr",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Mr => "Marathi",
        }
    }

    /// The other language, as toggled by the language switch
    pub fn toggle(self) -> Language {
        match self {
            Language::En => Language::Mr,
            Language::Mr => Language::En,
        }
    }
}

/// Active/inactive filter applied to record lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn parse(s: &str) -> Result<Self, anyhow::Error> {
        match s.to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "inactive" => Ok(StatusFilter::Inactive),
            _ => Err(anyhow::anyhow!("Invalid status filter: {}", s)),
        }
    }

    pub fn matches(self, record: &Record) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => record.is_active,
            StatusFilter::Inactive => !record.is_active,
        }
    }
}
