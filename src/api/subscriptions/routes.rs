use super::handlers;
use actix_web::{web, Scope};

pub fn routes() -> Scope {
    web::scope("/subscription")
        .service(handlers::toggle_subscription)
        .service(handlers::get_my_subscriptions)
        .service(handlers::get_my_subscriptions_with_counts)
        .service(handlers::get_subscription_stats)
        .service(handlers::check_subscription)
}
