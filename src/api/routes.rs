use super::{categories, subscriptions};
use crate::errors::AppError;
use actix_web::{web, Scope};

pub fn routes() -> Scope {
    web::scope("/api/newsletter")
        .app_data(json_config())
        .service(subscriptions::routes())
        .service(categories::routes())
        .service(categories::get_category_subscribers)
}

/// Malformed bodies (e.g. `"isActive": "yes"`) get the same error shape
/// as other validation failures.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::invalid_input("body", &err.to_string()).into()
    })
}
