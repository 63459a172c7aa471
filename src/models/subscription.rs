use super::category::Category;
use crate::schema::*;
use chrono::{NaiveDateTime, Utc};
use diesel::{dsl::count_star, prelude::*};
use serde::{Deserialize, Serialize};

/// One row per `(user_id, category)`. A missing row means "never
/// subscribed", which is not the same as an inactive one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = newsletter_subscriptions)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub id: i32,
    pub user_id: i64,
    pub category: Category,
    pub is_active: bool,
    pub subscribed_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = newsletter_subscriptions)]
pub struct NewSubscription {
    pub user_id: i64,
    pub category: Category,
    pub is_active: bool,
    pub subscribed_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewSubscription {
    pub fn new(user_id: i64, category: Category, is_active: bool) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            user_id,
            category,
            is_active,
            subscribed_at: now,
            updated_at: now,
        }
    }

    pub fn insert(&self, conn: &mut SqliteConnection) -> QueryResult<SubscriptionRecord> {
        use crate::schema::newsletter_subscriptions::dsl::*;
        diesel::insert_into(newsletter_subscriptions)
            .values(self)
            .returning(SubscriptionRecord::as_returning())
            .get_result(conn)
            .map_err(|e| {
                log::warn!("Error inserting subscription: {:?}", e);
                e
            })
    }
}

/// Only the mutable columns; identity and creation time never change.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = newsletter_subscriptions)]
pub struct PartialSubscription {
    pub is_active: Option<bool>,
    pub updated_at: Option<NaiveDateTime>,
}

impl SubscriptionRecord {
    pub fn get_for_user_and_category(
        conn: &mut SqliteConnection,
        user: i64,
        cat: Category,
    ) -> QueryResult<Option<SubscriptionRecord>> {
        use crate::schema::newsletter_subscriptions::dsl::*;
        newsletter_subscriptions
            .filter(user_id.eq(user))
            .filter(category.eq(cat))
            .select(SubscriptionRecord::as_select())
            .first(conn)
            .optional()
            .map_err(|e| {
                log::warn!("Error getting subscription: {:?}", e);
                e
            })
    }

    pub fn get_all_for_user(
        conn: &mut SqliteConnection,
        user: i64,
    ) -> QueryResult<Vec<SubscriptionRecord>> {
        use crate::schema::newsletter_subscriptions::dsl::*;
        newsletter_subscriptions
            .filter(user_id.eq(user))
            .order(id.asc())
            .select(SubscriptionRecord::as_select())
            .load(conn)
            .map_err(|e| {
                log::warn!("Error getting subscriptions: {:?}", e);
                e
            })
    }

    pub fn update(
        conn: &mut SqliteConnection,
        sub_id: i32,
        update: &PartialSubscription,
    ) -> QueryResult<SubscriptionRecord> {
        use crate::schema::newsletter_subscriptions::dsl::*;
        diesel::update(newsletter_subscriptions.filter(id.eq(sub_id)))
            .set(update)
            .returning(SubscriptionRecord::as_returning())
            .get_result(conn)
            .map_err(|e| {
                log::warn!("Error updating subscription: {:?}", e);
                e
            })
    }

    /// Insert-or-update on `(user_id, category)`. The existing row keeps its
    /// id and `subscribed_at`; `updated_at` is refreshed even when
    /// `is_active` does not change.
    pub fn upsert(
        conn: &mut SqliteConnection,
        user: i64,
        cat: Category,
        active: bool,
    ) -> QueryResult<SubscriptionRecord> {
        conn.immediate_transaction(|conn| {
            match Self::get_for_user_and_category(conn, user, cat)? {
                Some(existing) => {
                    let changes = PartialSubscription {
                        is_active: Some(active),
                        updated_at: Some(Utc::now().naive_utc()),
                    };
                    Self::update(conn, existing.id, &changes)
                }
                None => NewSubscription::new(user, cat, active).insert(conn),
            }
        })
    }

    pub fn count_active_for_category(conn: &mut SqliteConnection, cat: Category) -> QueryResult<i64> {
        use crate::schema::newsletter_subscriptions::dsl::*;
        newsletter_subscriptions
            .filter(category.eq(cat))
            .filter(is_active.eq(true))
            .count()
            .get_result(conn)
    }

    /// Active subscribers per category in one grouped query. Categories
    /// without active rows are absent from the result.
    pub fn count_active_by_category(
        conn: &mut SqliteConnection,
    ) -> QueryResult<Vec<(Category, i64)>> {
        use crate::schema::newsletter_subscriptions::dsl::*;
        newsletter_subscriptions
            .filter(is_active.eq(true))
            .group_by(category)
            .select((category, count_star()))
            .load(conn)
    }

    pub fn count_total_active(conn: &mut SqliteConnection) -> QueryResult<i64> {
        use crate::schema::newsletter_subscriptions::dsl::*;
        newsletter_subscriptions
            .filter(is_active.eq(true))
            .count()
            .get_result(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::get_test_db_connection;

    #[test]
    fn test_upsert_creates_then_updates_in_place() {
        let mut conn = get_test_db_connection();

        let created = SubscriptionRecord::upsert(&mut conn, 7, Category::Economy, true).unwrap();
        assert!(created.is_active);
        assert_eq!(created.subscribed_at, created.updated_at);

        let updated = SubscriptionRecord::upsert(&mut conn, 7, Category::Economy, false).unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.subscribed_at, created.subscribed_at);
        assert!(!updated.is_active);
        assert!(updated.updated_at >= created.updated_at);

        let all = SubscriptionRecord::get_all_for_user(&mut conn, 7).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_get_missing_is_none() {
        let mut conn = get_test_db_connection();
        let found = SubscriptionRecord::get_for_user_and_category(&mut conn, 1, Category::Art).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn test_unique_per_user_and_category() {
        let mut conn = get_test_db_connection();
        NewSubscription::new(3, Category::Life, true).insert(&mut conn).unwrap();
        let dupe = NewSubscription::new(3, Category::Life, false).insert(&mut conn);
        assert!(dupe.is_err());
    }

    #[test]
    fn test_counts_only_active() {
        let mut conn = get_test_db_connection();
        SubscriptionRecord::upsert(&mut conn, 1, Category::Politics, true).unwrap();
        SubscriptionRecord::upsert(&mut conn, 2, Category::Politics, true).unwrap();
        SubscriptionRecord::upsert(&mut conn, 3, Category::Politics, false).unwrap();
        SubscriptionRecord::upsert(&mut conn, 1, Category::Art, true).unwrap();

        assert_eq!(
            SubscriptionRecord::count_active_for_category(&mut conn, Category::Politics).unwrap(),
            2
        );
        assert_eq!(
            SubscriptionRecord::count_active_for_category(&mut conn, Category::Vehicle).unwrap(),
            0
        );
        assert_eq!(SubscriptionRecord::count_total_active(&mut conn).unwrap(), 3);

        let mut grouped = SubscriptionRecord::count_active_by_category(&mut conn).unwrap();
        grouped.sort_by_key(|(cat, _)| cat.code());
        assert_eq!(grouped, vec![(Category::Art, 1), (Category::Politics, 2)]);
    }
}
