use serde::Serialize;
use utoipa::ToSchema;

/// Liveness payload returned by `/health`.
#[derive(Serialize, Debug, ToSchema)]
pub struct Health {
    #[schema(value_type = String, example = "ok")]
    pub status: &'static str,
}

impl Health {
    pub fn ok() -> Self { Self { status: "ok" } }
    pub fn unavailable() -> Self { Self { status: "unavailable" } }
}
