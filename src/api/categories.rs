use actix_web::{get, web, HttpResponse, Responder, Scope};
use serde::Serialize;

use crate::{
    errors::AppResult,
    models::category::Category,
    subscriptions::{CountResolver, CountResult},
};

#[derive(Serialize)]
struct CategoryEntry {
    code: Category,
    name: &'static str,
}

/// The closed category catalogue, in display order
#[get("")]
pub async fn get_categories() -> impl Responder {
    let entries: Vec<CategoryEntry> = Category::ALL
        .iter()
        .map(|c| CategoryEntry {
            code: *c,
            name: c.display_name(),
        })
        .collect();
    HttpResponse::Ok().json(entries)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategorySubscribers {
    #[serde(flatten)]
    count: CountResult,
    category_name: &'static str,
}

/// Live subscriber count for one category. Public; a slow or failing
/// count is reported as `-1` with `isFallback`, never as an error.
#[get("/category/{category}/subscribers")]
pub async fn get_category_subscribers(
    counts: web::Data<CountResolver>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let category: Category = path.into_inner().parse()?;
    let count = counts.get_count_with_fallback(category).await;

    Ok(HttpResponse::Ok().json(CategorySubscribers {
        count,
        category_name: category.display_name(),
    }))
}

pub fn routes() -> Scope {
    web::scope("/categories").service(get_categories)
}
