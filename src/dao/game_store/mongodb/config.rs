use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};
use crate::config::MongoSettings;

#[derive(Clone)]
pub struct MongoConfig {
    pub options: ClientOptions,
    pub database_name: String,
    pub collection_name: String,
}

impl MongoConfig {
    pub async fn from_uri(uri: &str, database: &str, collection: &str) -> MongoResult<Self> {
        let mut options =
            ClientOptions::parse(uri)
                .await
                .map_err(|source| MongoDaoError::InvalidUri {
                    uri: uri.to_owned(),
                    source,
                })?;
        options.app_name.get_or_insert_with(|| "game-store".to_owned());

        Ok(Self {
            options,
            database_name: database.to_owned(),
            collection_name: collection.to_owned(),
        })
    }

    pub async fn from_settings(settings: &MongoSettings) -> MongoResult<Self> {
        Self::from_uri(&settings.uri, &settings.database, &settings.collection).await
    }
}
