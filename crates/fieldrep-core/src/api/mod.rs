//! Typed backend operations over the request pipeline.

pub mod relations;

use async_trait::async_trait;
use fieldrep_store::models::{CatalogPage, EntityId, Product, WorkingArea};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::json;

use crate::catalog::CatalogSource;
use crate::pipeline::{RequestError, RequestOptions, RequestPipeline, documents};
use crate::sale::{CreatedSale, SaleSubmission};
use crate::search::EntitySource;
use crate::session::Session;
use crate::wizard::{CreatedPlan, PlanBackend, PlanSubmission};

pub use relations::PeopleLists;

use relations::RelationsPayload;

#[derive(Debug, Deserialize)]
struct LoginData {
    login: LoginPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginPayload {
    token: String,
    #[serde(deserialize_with = "deserialize_company_id")]
    company_id: String,
}

/// Company ids come back as numbers from some backends and strings from
/// others; they only ever travel on as a header value.
fn deserialize_company_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("unexpected company id {other}"))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkingAreasData {
    my_working_areas: Vec<WorkingArea>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationsData {
    #[serde(default)]
    working_area_relations: Option<RelationsPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    #[serde(default)]
    search_people: Option<PeopleLists>,
}

#[derive(Debug, Deserialize)]
struct ProductsData {
    products: ProductsPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductsPayload {
    paginator_info: PaginatorInfo,
    #[serde(default)]
    data: Vec<Product>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaginatorInfo {
    current_page: u32,
    last_page: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDailyPlanData {
    create_daily_plan: CreatedPlan,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSaleData {
    create_sale: CreatedSale,
}

/// The field-rep backend, one method per operation.
#[derive(Debug, Clone)]
pub struct FieldRepApi {
    pipeline: RequestPipeline,
}

impl FieldRepApi {
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    /// Sign in. Sent without token or tenant; on success the new session is
    /// installed in the pipeline's session context and returned.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, RequestError> {
        let data: LoginData = self
            .pipeline
            .execute_with(
                &documents::LOGIN,
                json!({ "email": email, "password": password }),
                RequestOptions::anonymous(),
            )
            .await?;

        let session = self.pipeline.session();
        session.login(data.login.token, data.login.company_id);
        tracing::info!(company_id = ?session.company_id(), "signed in");
        Ok(session.snapshot())
    }

    /// Working areas assigned to the signed-in representative.
    pub async fn working_areas(&self) -> Result<Vec<WorkingArea>, RequestError> {
        let data: WorkingAreasData = self
            .pipeline
            .execute(&documents::WORKING_AREAS, serde_json::Value::Null)
            .await?;
        Ok(data.my_working_areas)
    }

    /// Doctors and chemists of one working area.
    pub async fn working_area_relations(
        &self,
        working_area_id: EntityId,
    ) -> Result<PeopleLists, RequestError> {
        let data: RelationsData = self
            .pipeline
            .execute(
                &documents::WORKING_AREA_RELATIONS,
                json!({ "workingAreaId": working_area_id.to_string() }),
            )
            .await?;
        Ok(data
            .working_area_relations
            .map(PeopleLists::from)
            .unwrap_or_default())
    }

    pub async fn search_people(&self, text: &str) -> Result<PeopleLists, RequestError> {
        let data: SearchData = self
            .pipeline
            .execute(&documents::SEARCH_PEOPLE, json!({ "search": text }))
            .await?;
        Ok(data.search_people.unwrap_or_default())
    }

    pub async fn products(&self, page: u32, per_page: u32) -> Result<CatalogPage, RequestError> {
        let data: ProductsData = self
            .pipeline
            .execute(&documents::PRODUCTS, json!({ "page": page, "first": per_page }))
            .await?;
        let payload = data.products;
        Ok(CatalogPage {
            page_number: payload.paginator_info.current_page,
            last_page_number: payload.paginator_info.last_page,
            items: payload.data,
        })
    }

    pub async fn create_daily_plan(&self, plan: &PlanSubmission) -> Result<CreatedPlan, RequestError> {
        let data: CreateDailyPlanData = self
            .pipeline
            .execute(&documents::CREATE_DAILY_PLAN, json!({ "input": plan }))
            .await?;
        Ok(data.create_daily_plan)
    }

    pub async fn create_sale(&self, sale: &SaleSubmission) -> Result<CreatedSale, RequestError> {
        let data: CreateSaleData = self
            .pipeline
            .execute(&documents::CREATE_SALE, json!({ "input": sale }))
            .await?;
        tracing::info!(sale_id = data.create_sale.id, total = %data.create_sale.total, "sale created");
        Ok(data.create_sale)
    }
}

#[async_trait]
impl PlanBackend for FieldRepApi {
    async fn working_areas(&self) -> Result<Vec<WorkingArea>, RequestError> {
        FieldRepApi::working_areas(self).await
    }

    async fn area_people(&self, working_area_id: EntityId) -> Result<PeopleLists, RequestError> {
        self.working_area_relations(working_area_id).await
    }

    async fn create_daily_plan(&self, plan: &PlanSubmission) -> Result<CreatedPlan, RequestError> {
        FieldRepApi::create_daily_plan(self, plan).await
    }
}

#[async_trait]
impl EntitySource for FieldRepApi {
    async fn search_people(&self, text: &str) -> Result<PeopleLists, RequestError> {
        FieldRepApi::search_people(self, text).await
    }
}

#[async_trait]
impl CatalogSource for FieldRepApi {
    async fn product_page(&self, page: u32, per_page: u32) -> Result<CatalogPage, RequestError> {
        self.products(page, per_page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_payload_accepts_numeric_company_id() {
        let data: LoginData = serde_json::from_value(json!({
            "login": { "token": "tok", "companyId": 42 }
        }))
        .unwrap();
        assert_eq!(data.login.company_id, "42");
    }

    #[test]
    fn login_payload_rejects_null_company_id() {
        let result = serde_json::from_value::<LoginData>(json!({
            "login": { "token": "tok", "companyId": null }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn products_payload_shape() {
        let data: ProductsData = serde_json::from_value(json!({
            "products": {
                "paginatorInfo": { "currentPage": 2, "lastPage": 5 },
                "data": [{ "id": "9", "name": "Syrup", "price": 12.5 }]
            }
        }))
        .unwrap();
        assert_eq!(data.products.paginator_info.current_page, 2);
        assert_eq!(data.products.data[0].id, 9);
    }
}
