//! OpenAPI schema aggregation for the catalog API.
use crate::api::{
    cars, system,
    types::{CarResponse, ErrorResponse, HealthStatus, MessageResponse, SearchResponse},
};
use crate::model::{Car, CarPayload, Numeric};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "car-catalog",
        version = "v1",
        description = "Car rental catalog HTTP API"
    ),
    paths(
        system::system_health,
        cars::list_cars,
        cars::create_car,
        cars::delete_car,
        cars::update_car,
        cars::search_cars
    ),
    components(schemas(
        HealthStatus,
        ErrorResponse,
        Car,
        CarPayload,
        Numeric,
        CarResponse,
        MessageResponse,
        SearchResponse
    )),
    tags(
        (name = "system", description = "Health endpoints"),
        (name = "cars", description = "Car catalog management and search")
    )
)]
pub struct ApiDoc;
