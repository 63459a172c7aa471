use crate::errors::ValidationError;
use diesel::{
    backend::Backend,
    deserialize::{self, FromSql, FromSqlRow},
    serialize::{self, Output, ToSql},
    sql_types::Text,
    AsExpression,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Newsletter content categories. The set is closed: anything else is a
/// caller bug and is rejected rather than coerced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Politics,
    Economy,
    Society,
    Life,
    International,
    ItScience,
    Vehicle,
    TravelFood,
    Art,
}

impl Category {
    /// Catalogue order, as shown to readers.
    pub const ALL: [Category; 9] = [
        Category::Politics,
        Category::Economy,
        Category::Society,
        Category::Life,
        Category::International,
        Category::ItScience,
        Category::Vehicle,
        Category::TravelFood,
        Category::Art,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Category::Politics => "POLITICS",
            Category::Economy => "ECONOMY",
            Category::Society => "SOCIETY",
            Category::Life => "LIFE",
            Category::International => "INTERNATIONAL",
            Category::ItScience => "IT_SCIENCE",
            Category::Vehicle => "VEHICLE",
            Category::TravelFood => "TRAVEL_FOOD",
            Category::Art => "ART",
        }
    }

    /// Korean display name used by the reader-facing UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Politics => "정치",
            Category::Economy => "경제",
            Category::Society => "사회",
            Category::Life => "생활",
            Category::International => "세계",
            Category::ItScience => "IT/과학",
            Category::Vehicle => "자동차/교통",
            Category::TravelFood => "여행/음식",
            Category::Art => "예술",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.code() == code)
            .ok_or_else(|| ValidationError::UnknownCategory(code.to_string()))
    }
}

impl<DB> FromSql<Text, DB> for Category
where
    DB: Backend,
    String: FromSql<Text, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> deserialize::Result<Self> {
        let code = <String as FromSql<Text, DB>>::from_sql(bytes)?;
        code.parse::<Category>()
            .map_err(|_| format!("Unrecognized category code: {code}").into())
    }
}

impl<DB> ToSql<Text, DB> for Category
where
    DB: Backend,
    str: ToSql<Text, DB>,
{
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, DB>) -> serialize::Result {
        <str as ToSql<Text, DB>>::to_sql(self.code(), out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_every_code() {
        for category in Category::ALL {
            assert_eq!(category.code().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(" ECONOMY ".parse::<Category>().unwrap(), Category::Economy);
    }

    #[test]
    fn test_rejects_empty_and_blank() {
        assert_eq!("".parse::<Category>(), Err(ValidationError::MissingCategory));
        assert_eq!("   ".parse::<Category>(), Err(ValidationError::MissingCategory));
    }

    #[test]
    fn test_rejects_unknown_without_defaulting() {
        assert_eq!(
            "BOGUS".parse::<Category>(),
            Err(ValidationError::UnknownCategory("BOGUS".to_string()))
        );
        // codes are case-sensitive
        assert!("economy".parse::<Category>().is_err());
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Category::TravelFood).unwrap();
        assert_eq!(json, "\"TRAVEL_FOOD\"");
        let back: Category = serde_json::from_str("\"IT_SCIENCE\"").unwrap();
        assert_eq!(back, Category::ItScience);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Category::ItScience.display_name(), "IT/과학");
        assert_eq!(Category::Art.to_string(), "ART");
    }
}
