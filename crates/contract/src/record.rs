use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Discriminator stored in every engine record's `docType` field.
pub const DOC_TYPE: &str = "engine";

/// One engine's persisted attribute set.
///
/// Field names on the wire are fixed (`ID`, `Make`, `Model`, `Age`,
/// `Condition`, `Owner`, `Services`, `docType`); byte layout is decided by
/// [`crate::canonical`], not by declaration order here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Make")]
    pub make: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Age", deserialize_with = "age_from_number_or_string")]
    pub age: u32,
    #[serde(rename = "Condition")]
    pub condition: String,
    #[serde(rename = "Owner")]
    pub owner: String,
    /// Service history, oldest first. Append-only.
    #[serde(rename = "Services", default)]
    pub services: Vec<String>,
    #[serde(rename = "docType", default = "default_doc_type")]
    pub doc_type: String,
}

/// The mutable attributes supplied to `Create` and `Update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineAttributes {
    pub make: String,
    pub model: String,
    pub age: u32,
    pub condition: String,
    pub owner: String,
}

impl EngineAttributes {
    pub fn new(
        make: impl Into<String>,
        model: impl Into<String>,
        age: u32,
        condition: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            age,
            condition: condition.into(),
            owner: owner.into(),
        }
    }
}

impl EngineRecord {
    /// A freshly created record: empty service history, engine doc type.
    pub fn new(id: impl Into<String>, attrs: EngineAttributes) -> Self {
        Self {
            id: id.into(),
            make: attrs.make,
            model: attrs.model,
            age: attrs.age,
            condition: attrs.condition,
            owner: attrs.owner,
            services: Vec::new(),
            doc_type: DOC_TYPE.to_string(),
        }
    }

    /// Replace every mutable attribute, keeping `id` and the service history.
    pub fn replace_attributes(&mut self, attrs: EngineAttributes) {
        self.make = attrs.make;
        self.model = attrs.model;
        self.age = attrs.age;
        self.condition = attrs.condition;
        self.owner = attrs.owner;
        self.doc_type = DOC_TYPE.to_string();
    }
}

fn default_doc_type() -> String {
    DOC_TYPE.to_string()
}

/// Gateways submit every argument as a string, and records written that way
/// carry `"Age": "3"`. Accept both forms; re-encoding normalizes to a number.
fn age_from_number_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    struct AgeVisitor;

    impl<'de> Visitor<'de> for AgeVisitor {
        type Value = u32;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer or a string holding one")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u32, E> {
            u32::try_from(v).map_err(|_| E::custom(format!("age {v} out of range")))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u32, E> {
            u32::try_from(v).map_err(|_| E::custom(format!("age {v} out of range")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u32, E> {
            v.trim()
                .parse::<u32>()
                .map_err(|_| E::custom(format!("age {v:?} is not a non-negative integer")))
        }
    }

    deserializer.deserialize_any(AgeVisitor)
}

/// One entry of a `ListAll` scan.
///
/// Values that do not decode as an [`EngineRecord`] are carried through as
/// their raw text instead of aborting the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListEntry {
    Record(EngineRecord),
    Raw(String),
}

impl ListEntry {
    pub fn as_record(&self) -> Option<&EngineRecord> {
        match self {
            ListEntry::Record(r) => Some(r),
            ListEntry::Raw(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_wire_field_names() {
        let rec: EngineRecord = serde_json::from_value(json!({
            "ID": "e1",
            "Make": "RR",
            "Model": "Trent1000",
            "Age": 2,
            "Condition": "Operational",
            "Owner": "AirlineA",
            "Services": ["oil change"],
            "docType": "engine"
        }))
        .unwrap();
        assert_eq!(rec.id, "e1");
        assert_eq!(rec.age, 2);
        assert_eq!(rec.services, vec!["oil change"]);
    }

    #[test]
    fn string_age_and_missing_doc_type_are_accepted() {
        let rec: EngineRecord = serde_json::from_value(json!({
            "ID": "engine313",
            "Make": "GE Aviation",
            "Model": "GE90",
            "Age": "3",
            "Condition": "Operational",
            "Owner": "AirlineX",
            "Services": []
        }))
        .unwrap();
        assert_eq!(rec.age, 3);
        assert_eq!(rec.doc_type, DOC_TYPE);
    }

    #[test]
    fn negative_age_is_rejected() {
        let err = serde_json::from_value::<EngineRecord>(json!({
            "ID": "e1", "Make": "m", "Model": "m", "Age": -1,
            "Condition": "c", "Owner": "o"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");
    }

    #[test]
    fn replace_attributes_keeps_services() {
        let mut rec = EngineRecord::new("e1", EngineAttributes::new("RR", "T", 1, "ok", "A"));
        rec.services.push("inspection".into());
        rec.replace_attributes(EngineAttributes::new("GE", "GE90", 7, "worn", "B"));
        assert_eq!(rec.make, "GE");
        assert_eq!(rec.owner, "B");
        assert_eq!(rec.services, vec!["inspection"]);
    }

    #[test]
    fn list_entry_serializes_untagged() {
        let raw = ListEntry::Raw("not json".into());
        assert_eq!(serde_json::to_value(&raw).unwrap(), json!("not json"));
    }
}
