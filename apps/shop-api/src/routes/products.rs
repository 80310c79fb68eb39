//! Product listing with filters and pagination.
//!
//! ```text
//! GET /products?name=pork&category=meat&price_start=10&price_end=25.50&page=2&per_page=20
//! ```
//!
//! All parameters are optional. Text filters are case-insensitive
//! substring matches. Price bounds are inclusive decimals.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use shop_core::validation::{validate_price, validate_search_query};
use shop_core::{Money, PageRequest, Product, ProductFilter, ValidationError};

use super::{parse_number, Listing};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/products", get(list_products))
}

/// Raw query string. Everything is parsed by hand so that bad values come
/// back as field errors instead of a bare 400.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price_start: Option<String>,
    pub price_end: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl ProductQuery {
    /// Validates every parameter, collecting all failures.
    pub fn parse(&self) -> Result<(ProductFilter, PageRequest), ApiError> {
        let mut errors: Vec<ValidationError> = Vec::new();

        let mut text = |field: &str, raw: &Option<String>| match raw {
            Some(raw) => match validate_search_query(field, raw) {
                Ok(q) if q.is_empty() => None,
                Ok(q) => Some(q),
                Err(e) => {
                    errors.push(e);
                    None
                }
            },
            None => None,
        };
        let name = text("name", &self.name);
        let category = text("category", &self.category);

        let price_start = collect(&mut errors, parse_price("price_start", self.price_start.as_deref()));
        let price_end = collect(&mut errors, parse_price("price_end", self.price_end.as_deref()));

        let page = collect(&mut errors, parse_number::<u32>("page", self.page.as_deref()));
        let per_page = collect(&mut errors, parse_number::<u32>("per_page", self.per_page.as_deref()));

        let page_request = collect(
            &mut errors,
            PageRequest::new(page.flatten(), per_page.flatten()),
        );

        match page_request {
            Some(page_request) if errors.is_empty() => Ok((
                ProductFilter {
                    name,
                    category,
                    price_start: price_start.flatten(),
                    price_end: price_end.flatten(),
                },
                page_request,
            )),
            _ => Err(ApiError::validation(errors)),
        }
    }
}

fn collect<T>(errors: &mut Vec<ValidationError>, result: Result<T, ValidationError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}

/// Parses an optional non-negative decimal price.
fn parse_price(field: &str, raw: Option<&str>) -> Result<Option<Money>, ValidationError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let price = Money::parse_decimal(raw).map_err(|e| e.for_field(field))?;
    validate_price(price).map_err(|e| e.for_field(field))?;

    Ok(Some(price))
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> ApiResult<Json<Listing<Product>>> {
    let Query(query) = query?;
    let (filter, page) = query.parse()?;

    let products = state.db.products().search(&filter, page).await?;

    Ok(Json(products.into()))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::TestApp;
    use super::*;
    use axum::http::StatusCode;

    async fn seeded() -> (TestApp, String) {
        let app = TestApp::new().await;
        app.product("Pork ribs", "pork", 1250, true).await;
        app.product("Pork chops", "pork", 900, false).await;
        app.product("Beef brisket", "beef", 2400, true).await;
        app.product("Oak chair", "furniture", 4500, true).await;
        let token = app.register("jane@example.com").await;
        (app, token)
    }

    #[test]
    fn test_parse_defaults() {
        let (filter, page) = ProductQuery::default().parse().unwrap();

        assert_eq!(filter, ProductFilter::default());
        assert_eq!(page, PageRequest::default());
    }

    #[test]
    fn test_parse_collects_all_errors() {
        let query = ProductQuery {
            price_start: Some("cheap".to_string()),
            price_end: Some("-5".to_string()),
            per_page: Some("500".to_string()),
            ..Default::default()
        };

        let errors = query.parse().unwrap_err().errors.unwrap();

        assert!(errors.contains_key("price_start"));
        assert!(errors.contains_key("price_end"));
        assert!(errors.contains_key("per_page"));
    }

    #[test]
    fn test_parse_blank_text_does_not_filter() {
        let query = ProductQuery {
            name: Some("   ".to_string()),
            price_start: Some("10.5".to_string()),
            ..Default::default()
        };

        let (filter, _) = query.parse().unwrap();

        assert_eq!(filter.name, None);
        assert_eq!(filter.price_start, Some(Money::from_cents(1050)));
    }

    #[tokio::test]
    async fn test_list_requires_auth() {
        let (app, _) = seeded().await;

        let (status, _) = app.get("/products", None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_list_with_filters_and_meta() {
        let (app, token) = seeded().await;

        let (status, body) = app
            .get("/products?category=pork&price_start=10&per_page=1", Some(&token))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["name"], "Pork ribs");
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["meta"]["per_page"], 1);
        assert_eq!(body["meta"]["current_page"], 1);
        assert_eq!(body["meta"]["last_page"], 1);
    }

    #[tokio::test]
    async fn test_list_second_page() {
        let (app, token) = seeded().await;

        let (status, body) = app.get("/products?page=2&per_page=3", Some(&token)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["meta"]["total"], 4);
        assert_eq!(body["meta"]["last_page"], 2);
    }

    #[tokio::test]
    async fn test_list_rejects_bad_page() {
        let (app, token) = seeded().await;

        let (status, body) = app.get("/products?page=0", Some(&token)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["page"].is_array());
    }
}
