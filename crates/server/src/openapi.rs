use common::types::Health;
use models::Address;
use utoipa::OpenApi;

use crate::routes::address::{AddressResponse, CreateAddressRequest, DetailResponse, UpdateAddressRequest};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::address::get_address,
        crate::routes::address::create_address,
        crate::routes::address::update_address,
        crate::routes::address::delete_address,
    ),
    components(
        schemas(
            Health,
            Address,
            AddressResponse,
            CreateAddressRequest,
            UpdateAddressRequest,
            DetailResponse,
        )
    ),
    tags(
        (name = "health"),
        (name = "address", description = "Phone number to postal address records")
    )
)]
pub struct ApiDoc;
