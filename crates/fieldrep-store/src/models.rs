use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};

/// Backend identifier for every entity in this crate.
pub type EntityId = i64;

/// Deserialize an [`EntityId`] sent either as a JSON number or, as GraphQL
/// `ID` fields usually are, as a numeric string.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<EntityId, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl Visitor<'_> for IdVisitor {
        type Value = EntityId;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer id or a numeric string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<EntityId, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<EntityId, E> {
            EntityId::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<EntityId, E> {
            v.trim()
                .parse()
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

// ---------------------------------------------------------------------------
// Working areas
// ---------------------------------------------------------------------------

/// A territory assigned to a representative. Scopes which doctors and
/// chemists are visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingArea {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub label: String,
}

impl WorkingArea {
    /// Human-readable name: the label, or `city, district` when the backend
    /// sent no label.
    pub fn display_name(&self) -> String {
        if !self.label.trim().is_empty() {
            return self.label.clone();
        }
        [self.city.as_str(), self.district.as_str()]
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ---------------------------------------------------------------------------
// People
// ---------------------------------------------------------------------------

/// Which side of the doctor/chemist split a [`Person`] is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonKind {
    Doctor,
    Chemist,
}

impl fmt::Display for PersonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Doctor => "doctor",
            Self::Chemist => "chemist",
        };
        f.write_str(s)
    }
}

impl FromStr for PersonKind {
    type Err = PersonKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(Self::Doctor),
            "chemist" => Ok(Self::Chemist),
            other => Err(PersonKindParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`PersonKind`] string.
#[derive(Debug, Clone)]
pub struct PersonKindParseError(pub String);

impl fmt::Display for PersonKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid person kind: {:?}", self.0)
    }
}

impl std::error::Error for PersonKindParseError {}

/// Fields shared by doctors and chemists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonProfile {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(flatten)]
    pub profile: PersonProfile,
    #[serde(default)]
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chemist {
    #[serde(flatten)]
    pub profile: PersonProfile,
    #[serde(default)]
    pub shop_name: Option<String>,
}

/// A doctor or a chemist, discriminated by the `kind` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Person {
    Doctor(Doctor),
    Chemist(Chemist),
}

impl Person {
    pub fn kind(&self) -> PersonKind {
        match self {
            Self::Doctor(_) => PersonKind::Doctor,
            Self::Chemist(_) => PersonKind::Chemist,
        }
    }

    pub fn profile(&self) -> &PersonProfile {
        match self {
            Self::Doctor(d) => &d.profile,
            Self::Chemist(c) => &c.profile,
        }
    }

    pub fn id(&self) -> EntityId {
        self.profile().id
    }

    pub fn name(&self) -> &str {
        &self.profile().name
    }

    /// One-line description for lists: specialty for doctors, shop name for
    /// chemists.
    pub fn subtitle(&self) -> Option<&str> {
        match self {
            Self::Doctor(d) => d.specialty.as_deref(),
            Self::Chemist(c) => c.shop_name.as_deref(),
        }
    }
}

impl From<Doctor> for Person {
    fn from(d: Doctor) -> Self {
        Self::Doctor(d)
    }
}

impl From<Chemist> for Person {
    fn from(c: Chemist) -> Self {
        Self::Chemist(c)
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A sellable product from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub price: Decimal,
}

/// One page of the product catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub page_number: u32,
    pub last_page_number: u32,
    pub items: Vec<Product>,
}

impl CatalogPage {
    /// Return `true` if no page follows this one.
    pub fn is_last(&self) -> bool {
        self.page_number >= self.last_page_number
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: EntityId, name: &str) -> PersonProfile {
        PersonProfile {
            id,
            name: name.to_string(),
            title: Some("Dr.".to_string()),
            phone: None,
            profile_image_url: None,
        }
    }

    #[test]
    fn person_kind_display_and_parse() {
        for kind in [PersonKind::Doctor, PersonKind::Chemist] {
            let parsed: PersonKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        let err = "nurse".parse::<PersonKind>().unwrap_err();
        assert_eq!(err.to_string(), "invalid person kind: \"nurse\"");
    }

    #[test]
    fn doctor_deserializes_from_flat_camel_case() {
        let json = serde_json::json!({
            "id": 101,
            "name": "Asha Rao",
            "title": "Dr.",
            "phone": "555-0101",
            "profileImageUrl": "https://img.example/101.png",
            "specialty": "Cardiology"
        });
        let doctor: Doctor = serde_json::from_value(json).unwrap();
        assert_eq!(doctor.profile.id, 101);
        assert_eq!(doctor.profile.profile_image_url.as_deref(), Some("https://img.example/101.png"));
        assert_eq!(doctor.specialty.as_deref(), Some("Cardiology"));
    }

    #[test]
    fn person_is_tagged_by_kind() {
        let chemist = Person::Chemist(Chemist {
            profile: profile(7, "Mehta"),
            shop_name: Some("City Pharmacy".to_string()),
        });
        let json = serde_json::to_value(&chemist).unwrap();
        assert_eq!(json["kind"], "chemist");
        assert_eq!(json["shopName"], "City Pharmacy");

        let back: Person = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), PersonKind::Chemist);
        assert_eq!(back.id(), 7);
        assert_eq!(back.subtitle(), Some("City Pharmacy"));
    }

    #[test]
    fn working_area_display_name_falls_back_to_city_and_district() {
        let mut area = WorkingArea {
            id: 1,
            state: "KA".to_string(),
            city: "Mysuru".to_string(),
            district: "Chamundi".to_string(),
            label: String::new(),
        };
        assert_eq!(area.display_name(), "Mysuru, Chamundi");

        area.label = "Mysuru South".to_string();
        assert_eq!(area.display_name(), "Mysuru South");
    }

    #[test]
    fn ids_accept_numeric_strings() {
        let area: WorkingArea = serde_json::from_value(serde_json::json!({
            "id": "7",
            "label": "Indiranagar"
        }))
        .unwrap();
        assert_eq!(area.id, 7);

        let doctor: Doctor = serde_json::from_value(serde_json::json!({
            "id": "101",
            "name": "Asha Rao"
        }))
        .unwrap();
        assert_eq!(doctor.profile.id, 101);

        let err = serde_json::from_value::<Product>(serde_json::json!({
            "id": "abc",
            "name": "Syrup"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("numeric string"));
    }

    #[test]
    fn catalog_page_is_last() {
        let page = CatalogPage {
            page_number: 3,
            last_page_number: 3,
            items: vec![],
        };
        assert!(page.is_last());
    }
}
