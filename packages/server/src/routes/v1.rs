use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
        .nest("/stores", store_routes())
        .nest("/ratings", rating_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
        .routes(routes!(handlers::auth::update_password))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::admin::get_dashboard_stats))
        .routes(routes!(
            handlers::admin::create_user,
            handlers::admin::list_users
        ))
        .routes(routes!(
            handlers::admin::get_user_details,
            handlers::admin::delete_user
        ))
        .routes(routes!(
            handlers::admin::create_store,
            handlers::admin::list_stores
        ))
        .routes(routes!(handlers::admin::delete_store))
}

fn store_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::store::list_stores))
        .routes(routes!(handlers::store::get_my_store))
        .routes(routes!(handlers::store::get_store_details))
}

fn rating_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::rating::submit_rating))
        .routes(routes!(handlers::rating::delete_rating))
        .routes(routes!(handlers::rating::get_my_rating))
}
