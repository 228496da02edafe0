use serde::{Deserialize, Serialize};
use time::Date;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dao::models::{
        GameEntity, GameFilter, GameId, GameInput, GameSort, Pagination, Price, SortKey,
    },
    dto::format_system_time,
};

/// Payload accepted when creating or replacing a game.
///
/// Every field is optional at the serde level so that missing values surface as
/// validation errors rather than as deserialization failures.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GameRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "Genre is required"),
        length(min = 1, max = 50, message = "Genre must be between 1 and 50 characters")
    )]
    pub genre: Option<String>,
    #[validate(
        required(message = "Price is required"),
        range(min = 0.01, max = 999.99, message = "Price must be between 0.01 and 999.99")
    )]
    pub price: Option<f64>,
    #[validate(required(message = "Release date is required"))]
    #[serde(default, with = "crate::dto::release_date_format::option")]
    pub release_date: Option<Date>,
}

impl TryFrom<GameRequest> for GameInput {
    type Error = ValidationErrors;

    fn try_from(request: GameRequest) -> Result<Self, Self::Error> {
        request.validate()?;

        let GameRequest {
            name: Some(name),
            genre: Some(genre),
            price: Some(price),
            release_date: Some(release_date),
        } = request
        else {
            let mut errors = ValidationErrors::new();
            errors.add("body", ValidationError::new("required"));
            return Err(errors);
        };

        let Some(price) = Price::from_exact_f64(price) else {
            let mut error = ValidationError::new("precision");
            error.message = Some("Price must have at most two decimal places".into());
            let mut errors = ValidationErrors::new();
            errors.add("price", error);
            return Err(errors);
        };

        Ok(GameInput {
            name,
            genre,
            price,
            release_date,
        })
    }
}

/// Public projection of a stored game.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: GameId,
    pub name: String,
    pub genre: String,
    pub price: Price,
    #[serde(with = "crate::dto::release_date_format")]
    pub release_date: Date,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GameEntity> for GameResponse {
    fn from(game: GameEntity) -> Self {
        Self {
            id: game.id,
            name: game.name,
            genre: game.genre,
            price: game.price,
            release_date: game.release_date,
            created_at: format_system_time(game.created_at),
            updated_at: format_system_time(game.updated_at),
        }
    }
}

/// Query string accepted by `GET /games`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGamesQuery {
    pub genre: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort_by: Option<String>,
    #[serde(default)]
    pub descending: bool,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl ListGamesQuery {
    /// Filter built from the genre and price parameters.
    ///
    /// Returns the name of the offending parameter when a price is not a finite number.
    pub fn filter(&self) -> Result<GameFilter, &'static str> {
        let min_price = convert_price(self.min_price).ok_or("minPrice")?;
        let max_price = convert_price(self.max_price).ok_or("maxPrice")?;
        Ok(GameFilter::new(self.genre.clone(), min_price, max_price))
    }

    pub fn sort(&self) -> GameSort {
        GameSort::new(SortKey::parse(self.sort_by.as_deref()), self.descending)
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }
}

/// `None` when the amount is present but unusable.
fn convert_price(amount: Option<f64>) -> Option<Option<Price>> {
    match amount {
        Some(amount) => Price::from_f64(amount).map(Some),
        None => Some(None),
    }
}

/// Paginated envelope returned by `GET /games`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePage {
    pub items: Vec<GameResponse>,
    pub page: u64,
    pub page_size: u64,
    pub total_count: u64,
    pub total_pages: u64,
}

impl GamePage {
    pub fn new(items: Vec<GameEntity>, pagination: Pagination, total_count: u64) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            page: pagination.page(),
            page_size: pagination.page_size(),
            total_count,
            total_pages: pagination.total_pages(total_count),
        }
    }
}
