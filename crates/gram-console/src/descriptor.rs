//! Declarative description of each content type the console manages.
//!
//! One [`RecordController`](crate::RecordController) and one submission
//! pipeline serve every content type; what differs between them (fields,
//! image policy, endpoints, messages) lives in a static [`ContentDescriptor`].

use gram_core::models::{ImagePayload, Language, Record};
use gram_core::validation::{require_text, validate_optional_date, FieldError};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::draft::{FieldValue, FormDraft};
use crate::FormMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Announcement,
    Gallery,
    Award,
    Member,
    Program,
    VillageDetail,
    CitizenServiceHeader,
}

impl ContentKind {
    pub const ALL: [ContentKind; 7] = [
        ContentKind::Announcement,
        ContentKind::Gallery,
        ContentKind::Award,
        ContentKind::Member,
        ContentKind::Program,
        ContentKind::VillageDetail,
        ContentKind::CitizenServiceHeader,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ContentKind::Announcement => "announcement",
            ContentKind::Gallery => "gallery",
            ContentKind::Award => "award",
            ContentKind::Member => "member",
            ContentKind::Program => "program",
            ContentKind::VillageDetail => "village-detail",
            ContentKind::CitizenServiceHeader => "header",
        }
    }

    pub fn descriptor(self) -> &'static ContentDescriptor {
        match self {
            ContentKind::Announcement => &ANNOUNCEMENT,
            ContentKind::Gallery => &GALLERY,
            ContentKind::Award => &AWARD,
            ContentKind::Member => &MEMBER,
            ContentKind::Program => &PROGRAM,
            ContentKind::VillageDetail => &VILLAGE_DETAIL,
            ContentKind::CitizenServiceHeader => &CITIZEN_SERVICE_HEADER,
        }
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.slug())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let kind = match normalized.as_str() {
            "announcement" | "announcements" => ContentKind::Announcement,
            "gallery" => ContentKind::Gallery,
            "award" | "awards" => ContentKind::Award,
            "member" | "members" => ContentKind::Member,
            "program" | "programs" => ContentKind::Program,
            "village-detail" | "village-details" => ContentKind::VillageDetail,
            "header" | "citizen-service-header" => ContentKind::CitizenServiceHeader,
            _ => return Err(format!("Unknown content type: {}", s)),
        };
        Ok(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// `{en, mr}` pair; required means both languages
    Bilingual,
    /// `YYYY-MM-DD`, may be empty
    Date,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Wire name in the JSON body
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Message shown when the field is blank; `None` means optional
    pub required: Option<&'static str>,
}

impl FieldSpec {
    const fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            required: None,
        }
    }

    const fn required(self, message: &'static str) -> Self {
        Self {
            required: Some(message),
            ..self
        }
    }

    const fn kind(self, kind: FieldKind) -> Self {
        Self { kind, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePolicy {
    /// No image field on the form
    None,
    Optional,
    Required,
}

#[derive(Debug)]
pub struct ContentDescriptor {
    pub kind: ContentKind,
    /// Singular, lower case ("gallery item")
    pub label: &'static str,
    /// POST target for create; prefix of item paths
    pub collection: &'static str,
    pub list_path: &'static str,
    /// One record without an id, replaced by POST and removed by DELETE on `collection`
    pub singleton: bool,
    pub fields: &'static [FieldSpec],
    pub image_on_create: ImagePolicy,
    pub image_on_edit: ImagePolicy,
    /// Whether the image requirement is checked before the text fields
    pub image_checked_first: bool,
    pub search_fields: &'static [&'static str],
    pub generic_error: &'static str,
}

pub const IMAGE_REQUIRED_MESSAGE: &str = "Please select an image file";

pub static ANNOUNCEMENT: ContentDescriptor = ContentDescriptor {
    kind: ContentKind::Announcement,
    label: "announcement",
    collection: "/announcements",
    list_path: "/announcements",
    singleton: false,
    fields: &[FieldSpec::text("message", "Message").required("Message is required")],
    image_on_create: ImagePolicy::None,
    image_on_edit: ImagePolicy::None,
    image_checked_first: false,
    search_fields: &["message"],
    generic_error: "Error submitting announcement",
};

pub static GALLERY: ContentDescriptor = ContentDescriptor {
    kind: ContentKind::Gallery,
    label: "gallery item",
    collection: "/gallery",
    list_path: "/gallery",
    singleton: false,
    fields: &[
        FieldSpec::text("name", "Name").required("Please enter a name for the gallery item"),
        FieldSpec::text("description", "Description"),
    ],
    image_on_create: ImagePolicy::Required,
    image_on_edit: ImagePolicy::Optional,
    image_checked_first: true,
    search_fields: &["name", "description"],
    generic_error: "Error submitting gallery item",
};

pub static AWARD: ContentDescriptor = ContentDescriptor {
    kind: ContentKind::Award,
    label: "award",
    collection: "/awards",
    list_path: "/awards",
    singleton: false,
    fields: &[
        FieldSpec::text("name", "Name").required("Please enter a name for the award"),
        FieldSpec::text("description", "Description"),
        FieldSpec::text("awardDate", "Award date").kind(FieldKind::Date),
    ],
    image_on_create: ImagePolicy::Required,
    image_on_edit: ImagePolicy::Optional,
    image_checked_first: true,
    search_fields: &["name", "description"],
    generic_error: "Error submitting award",
};

const MEMBER_REQUIRED: &str = "Name and description are required";

pub static MEMBER: ContentDescriptor = ContentDescriptor {
    kind: ContentKind::Member,
    label: "member",
    collection: "/members",
    list_path: "/members",
    singleton: false,
    fields: &[
        FieldSpec::text("name", "Name").required(MEMBER_REQUIRED),
        FieldSpec::text("description", "Description").required(MEMBER_REQUIRED),
        FieldSpec::text("position", "Position"),
        FieldSpec::text("department", "Department"),
        FieldSpec::text("email", "Email"),
        FieldSpec::text("phone", "Phone"),
    ],
    image_on_create: ImagePolicy::Optional,
    image_on_edit: ImagePolicy::Optional,
    image_checked_first: false,
    search_fields: &["name", "description", "position", "department"],
    generic_error: "Error submitting member",
};

pub static PROGRAM: ContentDescriptor = ContentDescriptor {
    kind: ContentKind::Program,
    label: "program",
    collection: "/programs",
    list_path: "/programs/admin",
    singleton: false,
    fields: &[
        FieldSpec::text("name", "Name").required("Please enter program name"),
        FieldSpec::text("description", "Description").required("Please enter program description"),
    ],
    image_on_create: ImagePolicy::Required,
    image_on_edit: ImagePolicy::Optional,
    image_checked_first: false,
    search_fields: &["name", "description"],
    generic_error: "Error submitting program",
};

pub static VILLAGE_DETAIL: ContentDescriptor = ContentDescriptor {
    kind: ContentKind::VillageDetail,
    label: "village detail",
    collection: "/village-details",
    list_path: "/village-details/admin",
    singleton: false,
    fields: &[
        FieldSpec::text("title", "Title")
            .kind(FieldKind::Bilingual)
            .required("Please enter title in both English and Marathi"),
        FieldSpec::text("description", "Description")
            .kind(FieldKind::Bilingual)
            .required("Please enter description in both English and Marathi"),
    ],
    image_on_create: ImagePolicy::Required,
    image_on_edit: ImagePolicy::Optional,
    image_checked_first: false,
    search_fields: &["title", "description"],
    generic_error: "Error submitting village detail",
};

pub static CITIZEN_SERVICE_HEADER: ContentDescriptor = ContentDescriptor {
    kind: ContentKind::CitizenServiceHeader,
    label: "header image",
    collection: "/nagrik-seva/header",
    list_path: "/nagrik-seva/header",
    singleton: true,
    fields: &[],
    image_on_create: ImagePolicy::Required,
    image_on_edit: ImagePolicy::Required,
    image_checked_first: true,
    search_fields: &[],
    generic_error: "Error updating image",
};

impl ContentDescriptor {
    pub fn image_policy(&self, mode: FormMode) -> ImagePolicy {
        match mode {
            FormMode::Create => self.image_on_create,
            FormMode::Edit => self.image_on_edit,
            FormMode::View => ImagePolicy::None,
        }
    }

    pub fn accepts_image(&self) -> bool {
        self.image_on_create != ImagePolicy::None || self.image_on_edit != ImagePolicy::None
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Draft with every declared field present and empty
    pub fn empty_draft(&self) -> FormDraft {
        let mut draft = FormDraft::default();
        for field in self.fields {
            draft.insert(field.name, FieldValue::empty(field.kind));
        }
        draft
    }

    /// Draft pre-filled from an existing record (edit and view)
    pub fn draft_from(&self, record: &Record) -> FormDraft {
        let mut draft = FormDraft::default();
        for field in self.fields {
            let value = match field.kind {
                FieldKind::Text => FieldValue::Text(record.text(field.name).unwrap_or("").to_string()),
                // Stored as a timestamp; the form edits the date part only
                FieldKind::Date => FieldValue::Text(
                    record
                        .text(field.name)
                        .map(|d| d.split('T').next().unwrap_or(""))
                        .unwrap_or("")
                        .to_string(),
                ),
                FieldKind::Bilingual => FieldValue::Bilingual {
                    en: record.localized(field.name, Language::En).unwrap_or("").to_string(),
                    mr: record.localized(field.name, Language::Mr).unwrap_or("").to_string(),
                },
            };
            draft.insert(field.name, value);
        }
        draft
    }

    /// Synchronous checks run before any pipeline work
    pub fn validate(
        &self,
        mode: FormMode,
        draft: &FormDraft,
        has_image: bool,
    ) -> Result<(), FieldError> {
        let image_check = || {
            if self.image_policy(mode) == ImagePolicy::Required && !has_image {
                return Err(FieldError::new("image", IMAGE_REQUIRED_MESSAGE));
            }
            Ok(())
        };

        if self.image_checked_first {
            image_check()?;
        }

        for field in self.fields {
            let value = draft.get(field.name);
            match (field.kind, field.required) {
                (FieldKind::Bilingual, Some(message)) => {
                    for lang in Language::ALL {
                        let text = value.map(|v| v.localized(lang)).unwrap_or("");
                        require_text(field.name, text, message)?;
                    }
                }
                (_, Some(message)) => {
                    require_text(field.name, value.map(FieldValue::as_text).unwrap_or(""), message)?;
                }
                (FieldKind::Date, None) => {
                    validate_optional_date(field.name, value.map(FieldValue::as_text).unwrap_or(""))?;
                }
                _ => {}
            }
        }

        if !self.image_checked_first {
            image_check()?;
        }
        Ok(())
    }

    /// JSON body for create/update. Every declared field is sent (trimmed);
    /// edits also reactivate the record.
    pub fn build_payload(
        &self,
        mode: FormMode,
        draft: &FormDraft,
        image: Option<&ImagePayload>,
    ) -> Result<Value, serde_json::Error> {
        let mut body = Map::new();
        for field in self.fields {
            let value = draft
                .get(field.name)
                .cloned()
                .unwrap_or_else(|| FieldValue::empty(field.kind));
            body.insert(field.name.to_string(), value.to_json());
        }

        if let Some(image) = image {
            if let Value::Object(image_fields) = serde_json::to_value(image)? {
                body.extend(image_fields);
            }
        }

        if mode == FormMode::Edit && !self.singleton {
            body.insert("isActive".to_string(), Value::Bool(true));
        }

        Ok(Value::Object(body))
    }

    /// Case-insensitive substring match over the searchable fields
    pub fn matches_search(&self, record: &Record, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        self.search_fields.iter().any(|name| {
            let is_bilingual = self
                .field(name)
                .map(|f| f.kind == FieldKind::Bilingual)
                .unwrap_or(false);
            if is_bilingual {
                Language::ALL.iter().any(|lang| {
                    record
                        .localized(name, *lang)
                        .map(|v| v.to_lowercase().contains(&term))
                        .unwrap_or(false)
                })
            } else {
                record
                    .text(name)
                    .map(|v| v.to_lowercase().contains(&term))
                    .unwrap_or(false)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn image() -> ImagePayload {
        ImagePayload {
            image_data: "data:image/jpeg;base64,AAAA".to_string(),
            content_type: "image/jpeg".to_string(),
            filename: "fair.png".to_string(),
            size: 3,
        }
    }

    #[test]
    fn kinds_round_trip_through_slug() {
        for kind in ContentKind::ALL {
            assert_eq!(kind.slug().parse::<ContentKind>().unwrap(), kind);
            assert_eq!(kind.descriptor().kind, kind);
        }
        assert_eq!("Programs".parse::<ContentKind>().unwrap(), ContentKind::Program);
        assert!("events".parse::<ContentKind>().is_err());
    }

    #[test]
    fn image_policies() {
        assert_eq!(GALLERY.image_policy(FormMode::Create), ImagePolicy::Required);
        assert_eq!(GALLERY.image_policy(FormMode::Edit), ImagePolicy::Optional);
        assert_eq!(MEMBER.image_policy(FormMode::Create), ImagePolicy::Optional);
        assert_eq!(CITIZEN_SERVICE_HEADER.image_policy(FormMode::Edit), ImagePolicy::Required);
        assert!(!ANNOUNCEMENT.accepts_image());
        assert!(PROGRAM.accepts_image());
    }

    #[test]
    fn gallery_checks_image_before_name() {
        let draft = GALLERY.empty_draft();
        let err = GALLERY.validate(FormMode::Create, &draft, false).unwrap_err();
        assert_eq!(err.message, IMAGE_REQUIRED_MESSAGE);

        let err = GALLERY.validate(FormMode::Create, &draft, true).unwrap_err();
        assert_eq!(err.message, "Please enter a name for the gallery item");

        // edit does not need a new image
        let mut draft = draft;
        draft.set_text("name", "Temple fair");
        assert!(GALLERY.validate(FormMode::Edit, &draft, false).is_ok());
    }

    #[test]
    fn program_checks_text_before_image() {
        let mut draft = PROGRAM.empty_draft();
        let err = PROGRAM.validate(FormMode::Create, &draft, false).unwrap_err();
        assert_eq!(err.message, "Please enter program name");

        draft.set_text("name", "Tree plantation");
        let err = PROGRAM.validate(FormMode::Create, &draft, false).unwrap_err();
        assert_eq!(err.message, "Please enter program description");

        draft.set_text("description", "500 saplings");
        let err = PROGRAM.validate(FormMode::Create, &draft, false).unwrap_err();
        assert_eq!(err.message, IMAGE_REQUIRED_MESSAGE);
        assert!(PROGRAM.validate(FormMode::Create, &draft, true).is_ok());
    }

    #[test]
    fn whitespace_only_required_field_is_rejected() {
        let mut draft = ANNOUNCEMENT.empty_draft();
        draft.set_text("message", "   \n");
        let err = ANNOUNCEMENT.validate(FormMode::Create, &draft, false).unwrap_err();
        assert_eq!(err.message, "Message is required");
    }

    #[test]
    fn village_detail_needs_both_languages() {
        let mut draft = VILLAGE_DETAIL.empty_draft();
        draft.set_localized("title", Language::En, "History");
        let err = VILLAGE_DETAIL.validate(FormMode::Create, &draft, true).unwrap_err();
        assert_eq!(err.message, "Please enter title in both English and Marathi");

        draft.set_localized("title", Language::Mr, "इतिहास");
        draft.set_localized("description", Language::Mr, "गावाचा इतिहास");
        let err = VILLAGE_DETAIL.validate(FormMode::Create, &draft, true).unwrap_err();
        assert_eq!(err.message, "Please enter description in both English and Marathi");

        draft.set_localized("description", Language::En, "Village history");
        assert!(VILLAGE_DETAIL.validate(FormMode::Create, &draft, true).is_ok());
    }

    #[test]
    fn award_date_must_be_iso_when_present() {
        let mut draft = AWARD.empty_draft();
        draft.set_text("name", "Clean village");
        draft.set_text("awardDate", "26/01/2024");
        assert!(AWARD.validate(FormMode::Edit, &draft, false).is_err());
        draft.set_text("awardDate", "2024-01-26");
        assert!(AWARD.validate(FormMode::Edit, &draft, false).is_ok());
    }

    #[test]
    fn create_payload_sends_every_field_with_image() {
        let mut draft = MEMBER.empty_draft();
        draft.set_text("name", "  Sunita Pawar ");
        draft.set_text("description", "Ward member");

        let body = MEMBER
            .build_payload(FormMode::Create, &draft, Some(&image()))
            .unwrap();
        assert_eq!(
            body,
            json!({
                "name": "Sunita Pawar",
                "description": "Ward member",
                "position": "",
                "department": "",
                "email": "",
                "phone": "",
                "imageData": "data:image/jpeg;base64,AAAA",
                "contentType": "image/jpeg",
                "filename": "fair.png",
                "size": 3
            })
        );
    }

    #[test]
    fn edit_payload_reactivates() {
        let mut draft = ANNOUNCEMENT.empty_draft();
        draft.set_text("message", "Gram sabha on Monday");
        let body = ANNOUNCEMENT.build_payload(FormMode::Edit, &draft, None).unwrap();
        assert_eq!(body, json!({ "message": "Gram sabha on Monday", "isActive": true }));

        let create = ANNOUNCEMENT.build_payload(FormMode::Create, &draft, None).unwrap();
        assert!(create.get("isActive").is_none());
    }

    #[test]
    fn header_payload_is_image_only() {
        let body = CITIZEN_SERVICE_HEADER
            .build_payload(FormMode::Edit, &CITIZEN_SERVICE_HEADER.empty_draft(), Some(&image()))
            .unwrap();
        assert_eq!(body.as_object().unwrap().len(), 4);
        assert_eq!(body["contentType"], "image/jpeg");
    }

    #[test]
    fn draft_from_record() {
        let record: Record = serde_json::from_value(json!({
            "_id": "a1",
            "name": "Best village",
            "awardDate": "2023-08-15T00:00:00.000Z"
        }))
        .unwrap();
        let draft = AWARD.draft_from(&record);
        assert_eq!(draft.text("name"), "Best village");
        assert_eq!(draft.text("description"), "");
        assert_eq!(draft.text("awardDate"), "2023-08-15");
    }

    #[test]
    fn search_covers_both_languages() {
        let record: Record = serde_json::from_value(json!({
            "_id": "v1",
            "title": { "en": "Temples", "mr": "मंदिरे" },
            "description": { "en": "Old stone temples", "mr": "जुनी मंदिरे" }
        }))
        .unwrap();
        assert!(VILLAGE_DETAIL.matches_search(&record, "STONE"));
        assert!(VILLAGE_DETAIL.matches_search(&record, "मंदिरे"));
        assert!(VILLAGE_DETAIL.matches_search(&record, "  "));
        assert!(!VILLAGE_DETAIL.matches_search(&record, "river"));
    }
}
