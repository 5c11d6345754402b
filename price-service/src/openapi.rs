use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use common::models::{
    Currency, DegradedPayload, ErrorBody, ListingId, PricePayload, ServerErrorBody,
    UpstreamErrorBody,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::get_price,
    ),
    components(schemas(
        PricePayload,
        DegradedPayload,
        ListingId,
        Currency,
        ErrorBody,
        UpstreamErrorBody,
        ServerErrorBody,
    )),
    tags(
        (name = "price", description = "Listing price endpoints"),
    ),
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
