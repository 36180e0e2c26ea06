use gram_core::models::Language;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::descriptor::FieldKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Bilingual { en: String, mr: String },
}

impl FieldValue {
    pub fn empty(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Bilingual => FieldValue::Bilingual {
                en: String::new(),
                mr: String::new(),
            },
            FieldKind::Text | FieldKind::Date => FieldValue::Text(String::new()),
        }
    }

    /// Text value; the English half of a bilingual field
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(text) => text,
            FieldValue::Bilingual { en, .. } => en,
        }
    }

    pub fn localized(&self, lang: Language) -> &str {
        match (self, lang) {
            (FieldValue::Text(text), _) => text,
            (FieldValue::Bilingual { en, .. }, Language::En) => en,
            (FieldValue::Bilingual { mr, .. }, Language::Mr) => mr,
        }
    }

    /// Trimmed wire representation
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(text) => Value::String(text.trim().to_string()),
            FieldValue::Bilingual { en, mr } => json!({ "en": en.trim(), "mr": mr.trim() }),
        }
    }
}

/// Field values of an open form, keyed by wire name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
    values: BTreeMap<String, FieldValue>,
}

impl FormDraft {
    pub fn insert(&mut self, name: &str, value: FieldValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> &str {
        self.get(name).map(FieldValue::as_text).unwrap_or("")
    }

    pub fn set_text(&mut self, name: &str, value: impl Into<String>) {
        self.values
            .insert(name.to_string(), FieldValue::Text(value.into()));
    }

    /// Sets one language, keeping the other
    pub fn set_localized(&mut self, name: &str, lang: Language, value: impl Into<String>) {
        let value = value.into();
        let entry = self
            .values
            .entry(name.to_string())
            .or_insert_with(|| FieldValue::empty(FieldKind::Bilingual));

        match entry {
            FieldValue::Bilingual { en, mr } => match lang {
                Language::En => *en = value,
                Language::Mr => *mr = value,
            },
            FieldValue::Text(_) => {
                let (en, mr) = match lang {
                    Language::En => (value, String::new()),
                    Language::Mr => (String::new(), value),
                };
                *entry = FieldValue::Bilingual { en, mr };
            }
        }
    }

    pub fn is_blank(&self) -> bool {
        self.values.values().all(|v| match v {
            FieldValue::Text(t) => t.is_empty(),
            FieldValue::Bilingual { en, mr } => en.is_empty() && mr.is_empty(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_localized_keeps_other_language() {
        let mut draft = FormDraft::default();
        draft.set_localized("title", Language::Mr, "शाळा");
        draft.set_localized("title", Language::En, "School");

        let value = draft.get("title").unwrap();
        assert_eq!(value.localized(Language::En), "School");
        assert_eq!(value.localized(Language::Mr), "शाळा");
        assert_eq!(value.to_json(), json!({ "en": "School", "mr": "शाळा" }));
    }

    #[test]
    fn blank_draft() {
        let mut draft = FormDraft::default();
        assert!(draft.is_blank());
        draft.insert("name", FieldValue::empty(FieldKind::Text));
        assert!(draft.is_blank());
        draft.set_text("name", "x");
        assert!(!draft.is_blank());
    }
}
