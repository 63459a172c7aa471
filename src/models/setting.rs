use crate::schema::*;
use chrono::Utc;
use diesel::prelude::*;
use thiserror::Error;

#[derive(Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = settings)]
pub struct Setting {
    pub id: i32,
    pub user_id: Option<i64>,
    pub key: String,
    pub value: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = settings)]
struct SettingRow<'a> {
    user_id: Option<i64>,
    key: &'a str,
    value: &'a str,
    created_at: i64,
    updated_at: i64,
}

#[derive(Debug)]
pub struct NewSetting {
    pub user_id: Option<i64>,
    pub key: String,
    pub value: String,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Setting '{key}' already exists for user with id={user_id:?}")]
    SettingExists { key: String, user_id: Option<i64> },
    #[error("Setting '{key}' not found for user with id={user_id:?}")]
    SettingNotFound { key: String, user_id: Option<i64> },
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),
}

impl Setting {
    pub fn add(conn: &mut SqliteConnection, setting: &NewSetting) -> Result<Setting, Error> {
        use crate::schema::settings::dsl::*;

        match Self::get(conn, &setting.key, setting.user_id) {
            Ok(_) => {
                return Err(Error::SettingExists {
                    key: setting.key.clone(),
                    user_id: setting.user_id,
                })
            }
            Err(Error::SettingNotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let now = Utc::now().timestamp();
        let row = SettingRow {
            user_id: setting.user_id,
            key: &setting.key,
            value: &setting.value,
            created_at: now,
            updated_at: now,
        };

        Ok(diesel::insert_into(settings)
            .values(row)
            .returning(Setting::as_returning())
            .get_result(conn)?)
    }

    pub fn get(
        conn: &mut SqliteConnection,
        query_key: &str,
        query_user_id: Option<i64>,
    ) -> Result<Setting, Error> {
        use crate::schema::settings::dsl::*;

        // a NULL user_id marks a system-wide setting
        let found = match query_user_id {
            Some(uid) => settings
                .filter(user_id.eq(uid))
                .filter(key.eq(query_key))
                .select(Setting::as_select())
                .first(conn)
                .optional()?,
            None => settings
                .filter(user_id.is_null())
                .filter(key.eq(query_key))
                .select(Setting::as_select())
                .first(conn)
                .optional()?,
        };

        found.ok_or_else(|| Error::SettingNotFound {
            key: query_key.to_string(),
            user_id: query_user_id,
        })
    }
}
