//! Reference data and matching backend payloads.
//!
//! The `*_data` functions build the `data` object the backend returns for
//! each operation, so tests can feed them to [`crate::ScriptedTransport`] or
//! [`crate::MockBackend`].

use fieldrep_store::models::{Chemist, Doctor, EntityId, PersonProfile, Product, WorkingArea};
use rust_decimal::Decimal;
use serde_json::{Value, json};

pub const TOKEN: &str = "test-token";
pub const COMPANY_ID: &str = "company-1";

pub fn working_area(id: EntityId, label: &str) -> WorkingArea {
    WorkingArea {
        id,
        state: "Karnataka".to_string(),
        city: "Bengaluru".to_string(),
        district: "East".to_string(),
        label: label.to_string(),
    }
}

/// Areas 7 ("Indiranagar") and 8 ("Koramangala").
pub fn working_areas() -> Vec<WorkingArea> {
    vec![working_area(7, "Indiranagar"), working_area(8, "Koramangala")]
}

fn profile(id: EntityId, name: &str) -> PersonProfile {
    PersonProfile {
        id,
        name: name.to_string(),
        title: None,
        phone: None,
        profile_image_url: None,
    }
}

pub fn doctor(id: EntityId, name: &str) -> Doctor {
    Doctor {
        profile: profile(id, name),
        specialty: Some("General Medicine".to_string()),
    }
}

pub fn chemist(id: EntityId, name: &str) -> Chemist {
    Chemist {
        profile: profile(id, name),
        shop_name: Some(format!("{name} Pharmacy")),
    }
}

/// `price` is in hundredths: `product(1, "Syrup", 4550)` costs 45.50.
pub fn product(id: EntityId, name: &str, price: i64) -> Product {
    Product {
        id,
        name: name.to_string(),
        code: None,
        price: Decimal::new(price, 2),
    }
}

pub fn login_data(token: &str, company_id: &str) -> Value {
    json!({ "login": { "token": token, "companyId": company_id } })
}

pub fn working_areas_data(areas: &[WorkingArea]) -> Value {
    json!({ "myWorkingAreas": areas })
}

/// The nested `workingAreaRelations` shape: one relation row per person,
/// with the person's details under `doctor` / `chemist`.
pub fn relations_data(doctors: &[Doctor], chemists: &[Chemist]) -> Value {
    let doctors: Vec<Value> = doctors
        .iter()
        .map(|d| {
            json!({
                "id": d.profile.id.to_string(),
                "doctor": {
                    "name": d.profile.name,
                    "title": d.profile.title,
                    "phone": d.profile.phone,
                    "profileImageUrl": d.profile.profile_image_url,
                    "specialty": d.specialty,
                }
            })
        })
        .collect();
    let chemists: Vec<Value> = chemists
        .iter()
        .map(|c| {
            json!({
                "id": c.profile.id.to_string(),
                "chemist": {
                    "name": c.profile.name,
                    "title": c.profile.title,
                    "phone": c.profile.phone,
                    "profileImageUrl": c.profile.profile_image_url,
                    "shopName": c.shop_name,
                }
            })
        })
        .collect();
    json!({ "workingAreaRelations": { "doctors": doctors, "chemists": chemists } })
}

pub fn search_data(doctors: &[Doctor], chemists: &[Chemist]) -> Value {
    json!({ "searchPeople": { "doctors": doctors, "chemists": chemists } })
}

pub fn products_data(page: u32, last_page: u32, items: &[Product]) -> Value {
    json!({
        "products": {
            "paginatorInfo": { "currentPage": page, "lastPage": last_page },
            "data": items,
        }
    })
}

pub fn created_plan_data(id: EntityId, plan_date: &str) -> Value {
    json!({ "createDailyPlan": { "id": id.to_string(), "planDate": plan_date } })
}

pub fn created_sale_data(id: EntityId, total: f64) -> Value {
    json!({ "createSale": { "id": id.to_string(), "total": total } })
}
