use actix_web::{get, post, web, HttpResponse};
use futures_util::future::join_all;
use std::collections::HashMap;

use super::types::{
    CategorySubscription, SubscriptionCard, SubscriptionCheck, SubscriptionStats, ToggleRequest,
    ToggleResponse,
};
use crate::{
    errors::AppResult,
    identity::AuthenticatedUser,
    models::category::Category,
    store::SubscriptionStore,
    subscriptions::{CountResolver, ToggleCoordinator},
};

/// Flip one category on or off. A degraded toggle still carries a body,
/// with 503 so clients know the count and state are unconfirmed.
#[post("/toggle")]
pub async fn toggle_subscription(
    coordinator: web::Data<ToggleCoordinator>,
    user: AuthenticatedUser,
    toggle_req: web::Json<ToggleRequest>,
) -> AppResult<HttpResponse> {
    let (category, is_active) = toggle_req.into_inner().into_parts()?;

    tracing::info!(
        user_id = user.user_id,
        category = %category,
        is_active = is_active,
        "Subscription toggle requested"
    );

    let outcome = coordinator.toggle(user.user_id, &category, is_active).await?;
    let response = ToggleResponse::from(outcome);

    if outcome.is_fallback {
        Ok(HttpResponse::ServiceUnavailable().json(response))
    } else {
        Ok(HttpResponse::Ok().json(response))
    }
}

/// Active subscriptions only, each with its category's subscriber count.
#[get("/my")]
pub async fn get_my_subscriptions(
    store: web::Data<dyn SubscriptionStore>,
    counts: web::Data<CountResolver>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let active: Vec<_> = store
        .find_all_for_user(user.user_id)
        .await?
        .into_iter()
        .filter(|r| r.is_active)
        .collect();

    let resolved = join_all(
        active
            .iter()
            .map(|r| counts.get_count_with_fallback(r.category)),
    )
    .await;

    let cards: Vec<SubscriptionCard> = active
        .into_iter()
        .zip(resolved)
        .map(|(record, count)| SubscriptionCard::new(record, count.as_wire_value()))
        .collect();

    tracing::info!(user_id = user.user_id, count = cards.len(), "Listed active subscriptions");
    Ok(HttpResponse::Ok().json(cards))
}

/// Every category with the caller's state and the category's total.
#[get("/my-with-counts")]
pub async fn get_my_subscriptions_with_counts(
    store: web::Data<dyn SubscriptionStore>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let mine: HashMap<Category, _> = store
        .find_all_for_user(user.user_id)
        .await?
        .into_iter()
        .map(|r| (r.category, r))
        .collect();
    let totals: HashMap<Category, u64> = store
        .count_active_by_category()
        .await?
        .into_iter()
        .collect();

    let result: Vec<CategorySubscription> = Category::ALL
        .iter()
        .map(|category| {
            let record = mine.get(category);
            CategorySubscription {
                category: *category,
                category_name: category.display_name(),
                is_active: record.map(|r| r.is_active).unwrap_or(false),
                subscribed_at: record.map(|r| r.subscribed_at),
                subscriber_count: totals.get(category).copied().unwrap_or(0),
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(result))
}

#[get("/stats")]
pub async fn get_subscription_stats(
    store: web::Data<dyn SubscriptionStore>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let records = store.find_all_for_user(user.user_id).await?;
    let total_subscribers = store.count_total_active().await?;

    Ok(HttpResponse::Ok().json(SubscriptionStats::new(&records, total_subscribers)))
}

/// Whether the caller has a row for this category. A row that exists but
/// is inactive reports `isSubscribed: true, isActive: false`.
#[get("/check/{category}")]
pub async fn check_subscription(
    store: web::Data<dyn SubscriptionStore>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let category: Category = path.into_inner().parse()?;
    let record = store
        .find_by_user_and_category(user.user_id, category)
        .await?;

    Ok(HttpResponse::Ok().json(SubscriptionCheck::new(category, record)))
}
