use mongodb::bson::{DateTime, Decimal128, Document, doc, oid::ObjectId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, OffsetDateTime};

use crate::dao::models::{GameEntity, GameId, GameInput, Price};

/// Exponent bias of the IEEE 754-2008 decimal128 (BID) encoding.
const EXPONENT_BIAS: i32 = 6176;
const COEFFICIENT_BITS: u32 = 113;
const COEFFICIENT_MASK: u128 = (1 << COEFFICIENT_BITS) - 1;
const EXPONENT_MASK: u128 = 0x3FFF;
const SIGN_BIT: u128 = 1 << 127;
/// Prices are stored with two fractional digits.
const PRICE_EXPONENT: i32 = -2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("price {0} cannot be encoded as decimal128")]
    PriceEncoding(Price),
    #[error("price uses a decimal128 form that cannot hold a currency amount")]
    UnsupportedDecimal,
    #[error("price has more than two fractional digits")]
    FractionalCents,
    #[error("price does not fit in the cent range")]
    PriceOverflow,
    #[error("release date is out of range")]
    ReleaseDate,
}

/// Persisted shape of a game: `{_id, name, genre, price, releaseDate, createdAt, updatedAt}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub genre: String,
    pub price: Decimal128,
    pub release_date: DateTime,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl MongoGameDocument {
    pub fn new(id: ObjectId, input: GameInput, now: DateTime) -> Result<Self, DocumentError> {
        Ok(Self {
            id,
            name: input.name,
            genre: input.genre,
            price: price_to_decimal(input.price)?,
            release_date: date_to_bson(input.release_date),
            created_at: now,
            updated_at: now,
        })
    }
}

impl TryFrom<MongoGameDocument> for GameEntity {
    type Error = DocumentError;

    fn try_from(value: MongoGameDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: GameId::Document(value.id.to_hex()),
            name: value.name,
            genre: value.genre,
            price: decimal_to_price(value.price)?,
            release_date: bson_to_date(value.release_date)?,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

/// `$set` payload replacing every mutable field of a game.
pub fn update_document(input: GameInput, now: DateTime) -> Result<Document, DocumentError> {
    Ok(doc! {
        "$set": {
            "name": input.name,
            "genre": input.genre,
            "price": price_to_decimal(input.price)?,
            "releaseDate": date_to_bson(input.release_date),
            "updatedAt": now,
        }
    })
}

pub fn doc_id(id: ObjectId) -> Document {
    doc! {"_id": id}
}

/// Encode a price exactly as `cents × 10^-2` by parsing its two-digit rendering.
pub fn price_to_decimal(price: Price) -> Result<Decimal128, DocumentError> {
    price
        .to_string()
        .parse()
        .map_err(|_| DocumentError::PriceEncoding(price))
}

/// Decode a decimal128 into cents; values with sub-cent digits are rejected.
pub fn decimal_to_price(value: Decimal128) -> Result<Price, DocumentError> {
    let bits = u128::from_le_bytes(value.bytes());
    // A combination field starting with `11` marks infinities, NaN, or the
    // large-coefficient form, none of which a price can use.
    if (bits >> 125) & 0b11 == 0b11 {
        return Err(DocumentError::UnsupportedDecimal);
    }

    let exponent = ((bits >> COEFFICIENT_BITS) & EXPONENT_MASK) as i32 - EXPONENT_BIAS;
    let coefficient = bits & COEFFICIENT_MASK;
    let cents = rescale(coefficient, exponent - PRICE_EXPONENT)?;
    let cents = i64::try_from(cents).map_err(|_| DocumentError::PriceOverflow)?;

    Ok(Price::from_cents(if bits & SIGN_BIT != 0 { -cents } else { cents }))
}

fn rescale(coefficient: u128, shift: i32) -> Result<u128, DocumentError> {
    if coefficient == 0 {
        return Ok(0);
    }
    if shift >= 0 {
        10u128
            .checked_pow(shift.unsigned_abs())
            .and_then(|factor| coefficient.checked_mul(factor))
            .ok_or(DocumentError::PriceOverflow)
    } else {
        let divisor = 10u128
            .checked_pow(shift.unsigned_abs())
            .ok_or(DocumentError::FractionalCents)?;
        if coefficient % divisor != 0 {
            return Err(DocumentError::FractionalCents);
        }
        Ok(coefficient / divisor)
    }
}

/// Release dates are stored as midnight UTC.
pub fn date_to_bson(date: Date) -> DateTime {
    let seconds = date.midnight().assume_utc().unix_timestamp();
    DateTime::from_millis(seconds * 1000)
}

pub fn bson_to_date(value: DateTime) -> Result<Date, DocumentError> {
    let seconds = value.timestamp_millis().div_euclid(1000);
    OffsetDateTime::from_unix_timestamp(seconds)
        .map(|timestamp| timestamp.date())
        .map_err(|_| DocumentError::ReleaseDate)
}
