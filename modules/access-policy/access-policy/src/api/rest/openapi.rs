use utoipa::OpenApi;

use super::dto::{
    AccessDto, CreateSubscriptionReq, FallbackDto, SubscriptionDto, SubscriptionStatusDto,
    TrialDto, VerdictDto,
};
use super::error::Problem;
use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(title = "Access policy API", version = "1.0.0"),
    paths(
        handlers::get_access,
        handlers::start_trial,
        handlers::get_trial,
        handlers::create_subscription,
        handlers::list_subscriptions,
    ),
    components(schemas(
        AccessDto,
        VerdictDto,
        FallbackDto,
        TrialDto,
        CreateSubscriptionReq,
        SubscriptionDto,
        SubscriptionStatusDto,
        Problem,
    )),
    tags(
        (name = "Access", description = "Trial status and access evaluation"),
        (name = "Subscriptions", description = "Recorded subscription payments"),
    )
)]
pub struct ApiDoc;
