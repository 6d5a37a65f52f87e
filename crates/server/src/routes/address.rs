use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use models::{Address, PhoneNumber};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::startup::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAddressRequest {
    /// Phone number in international format
    #[schema(example = "+79161234567")]
    pub phone: String,
    pub address: Address,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateAddressRequest {
    pub address: Address,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressResponse {
    pub address: Address,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DetailResponse {
    #[schema(example = "Created")]
    pub detail: String,
}

impl DetailResponse {
    fn new(detail: &str) -> Json<Self> {
        Json(Self { detail: detail.to_string() })
    }
}

fn parse_phone(raw: &str) -> Result<PhoneNumber, JsonApiError> {
    Ok(PhoneNumber::parse(raw)?)
}

/// Look up the address stored for a phone number.
#[utoipa::path(
    get, path = "/api/address/{phone}", tag = "address",
    params(("phone" = String, Path, description = "Phone number, e.g. +79161234567")),
    responses(
        (status = 200, description = "Address found", body = AddressResponse),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation Error")
    )
)]
pub async fn get_address(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<AddressResponse>, JsonApiError> {
    let phone = parse_phone(&phone)?;
    let address = state.addresses.get(&phone).await?;
    Ok(Json(AddressResponse { address }))
}

/// Create a phone → address record; never overwrites an existing one.
#[utoipa::path(
    post, path = "/api/address", tag = "address",
    request_body = CreateAddressRequest,
    responses(
        (status = 201, description = "Created", body = DetailResponse),
        (status = 409, description = "Conflict"),
        (status = 422, description = "Validation Error")
    )
)]
pub async fn create_address(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateAddressRequest>,
) -> Result<(StatusCode, Json<DetailResponse>), JsonApiError> {
    let phone = parse_phone(&body.phone)?;
    debug!(phone = %phone, "create address request");
    state.addresses.create(&phone, &body.address).await?;
    Ok((StatusCode::CREATED, DetailResponse::new("Created")))
}

/// Replace the address of an existing record.
#[utoipa::path(
    put, path = "/api/address/{phone}", tag = "address",
    params(("phone" = String, Path, description = "Phone number, e.g. +79161234567")),
    request_body = UpdateAddressRequest,
    responses(
        (status = 200, description = "Ok", body = DetailResponse),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation Error")
    )
)]
pub async fn update_address(
    State(state): State<AppState>,
    Path(phone): Path<String>,
    ApiJson(body): ApiJson<UpdateAddressRequest>,
) -> Result<Json<DetailResponse>, JsonApiError> {
    let phone = parse_phone(&phone)?;
    state.addresses.update(&phone, &body.address).await?;
    Ok(DetailResponse::new("Ok"))
}

#[utoipa::path(
    delete, path = "/api/address/{phone}", tag = "address",
    params(("phone" = String, Path, description = "Phone number, e.g. +79161234567")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation Error")
    )
)]
pub async fn delete_address(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    let phone = parse_phone(&phone)?;
    state.addresses.delete(&phone).await?;
    Ok(StatusCode::NO_CONTENT)
}
