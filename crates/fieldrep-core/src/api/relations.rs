//! Doctor and chemist lists, and the transform from the working-area
//! relations payload into them.

use fieldrep_store::models::{Chemist, Doctor, EntityId, Person, PersonProfile, deserialize_id};
use serde::{Deserialize, Serialize};

/// Doctors and chemists side by side, as returned by both the working-area
/// relations query and people search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeopleLists {
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub chemists: Vec<Chemist>,
}

impl PeopleLists {
    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty() && self.chemists.is_empty()
    }

    pub fn len(&self) -> usize {
        self.doctors.len() + self.chemists.len()
    }

    /// Doctors first, then chemists, each in backend order.
    pub fn people(&self) -> impl Iterator<Item = Person> + '_ {
        self.doctors
            .iter()
            .cloned()
            .map(Person::from)
            .chain(self.chemists.iter().cloned().map(Person::from))
    }

    pub fn find_doctor(&self, id: EntityId) -> Option<&Doctor> {
        self.doctors.iter().find(|d| d.profile.id == id)
    }

    pub fn find_chemist(&self, id: EntityId) -> Option<&Chemist> {
        self.chemists.iter().find(|c| c.profile.id == id)
    }
}

// Wire shape of `workingAreaRelations`. Each row is a company relation whose
// id is what plans reference; the person details hang off it.

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RelationsPayload {
    #[serde(default)]
    doctors: Vec<DoctorRelation>,
    #[serde(default)]
    chemists: Vec<ChemistRelation>,
}

#[derive(Debug, Deserialize)]
struct DoctorRelation {
    #[serde(deserialize_with = "deserialize_id")]
    id: EntityId,
    doctor: Option<PersonDetails>,
}

#[derive(Debug, Deserialize)]
struct ChemistRelation {
    #[serde(deserialize_with = "deserialize_id")]
    id: EntityId,
    chemist: Option<PersonDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonDetails {
    #[serde(default)]
    name: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    profile_image_url: Option<String>,
    #[serde(default)]
    specialty: Option<String>,
    #[serde(default)]
    shop_name: Option<String>,
}

impl PersonDetails {
    fn into_profile(self, id: EntityId) -> (PersonProfile, Option<String>, Option<String>) {
        let profile = PersonProfile {
            id,
            name: self.name,
            title: self.title,
            phone: self.phone,
            profile_image_url: self.profile_image_url,
        };
        (profile, self.specialty, self.shop_name)
    }
}

impl From<RelationsPayload> for PeopleLists {
    fn from(payload: RelationsPayload) -> Self {
        // Relations without details are dropped: there is nothing to show.
        let doctors = payload
            .doctors
            .into_iter()
            .filter_map(|rel| {
                let details = rel.doctor?;
                let (profile, specialty, _) = details.into_profile(rel.id);
                Some(Doctor { profile, specialty })
            })
            .collect();

        let chemists = payload
            .chemists
            .into_iter()
            .filter_map(|rel| {
                let details = rel.chemist?;
                let (profile, _, shop_name) = details.into_profile(rel.id);
                Some(Chemist { profile, shop_name })
            })
            .collect();

        Self { doctors, chemists }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn relations_are_flattened_with_relation_ids() {
        let payload: RelationsPayload = serde_json::from_value(json!({
            "doctors": [
                { "id": "101", "doctor": { "name": "Asha Rao", "specialty": "Cardiology" } },
                { "id": 102, "doctor": null }
            ],
            "chemists": [
                { "id": 301, "chemist": { "name": "Mehta", "shopName": "City Pharmacy", "phone": "555" } }
            ]
        }))
        .unwrap();

        let lists = PeopleLists::from(payload);
        assert_eq!(lists.doctors.len(), 1);
        assert_eq!(lists.doctors[0].profile.id, 101);
        assert_eq!(lists.doctors[0].specialty.as_deref(), Some("Cardiology"));
        assert_eq!(lists.chemists[0].profile.id, 301);
        assert_eq!(lists.chemists[0].shop_name.as_deref(), Some("City Pharmacy"));
        assert_eq!(lists.chemists[0].profile.phone.as_deref(), Some("555"));
    }

    #[test]
    fn missing_sections_are_empty() {
        let payload: RelationsPayload = serde_json::from_value(json!({})).unwrap();
        let lists = PeopleLists::from(payload);
        assert!(lists.is_empty());
        assert_eq!(lists.len(), 0);
    }

    #[test]
    fn people_lists_doctors_before_chemists() {
        let lists: PeopleLists = serde_json::from_value(json!({
            "doctors": [{ "id": 1, "name": "A" }],
            "chemists": [{ "id": 2, "name": "B" }]
        }))
        .unwrap();

        let ids: Vec<_> = lists.people().map(|p| (p.kind().to_string(), p.id())).collect();
        assert_eq!(ids, vec![("doctor".to_string(), 1), ("chemist".to_string(), 2)]);
        assert!(lists.find_chemist(2).is_some());
        assert!(lists.find_doctor(2).is_none());
    }
}
