use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection, Database, IndexModel,
    bson::{DateTime, Decimal128, Document, doc, oid::ObjectId},
    options::{IndexOptions, ReturnDocument},
};
use tracing::{debug, info};

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoGameDocument, doc_id, price_to_decimal, update_document},
};
use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, GameFilter, GameInput, GameSort, Pagination, Price, SortKey},
    storage::StorageResult,
};

/// Game store backed by a single MongoDB collection.
#[derive(Clone)]
pub struct MongoGameStore {
    database: Database,
    collection: Collection<MongoGameDocument>,
}

impl MongoGameStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = establish_connection(&config.options, &config.database_name).await?;
        let collection = database.collection::<MongoGameDocument>(&config.collection_name);

        let store = Self {
            database,
            collection,
        };
        store.ensure_indexes().await?;

        info!(
            database = %config.database_name,
            collection = %config.collection_name,
            "connected to MongoDB"
        );
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let indexes = [
            ("genre_idx", "genre", doc! {"genre": 1}),
            ("created_at_idx", "createdAt", doc! {"createdAt": 1, "_id": 1}),
        ];

        for (name, field, keys) in indexes {
            let index = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(Some(name.to_owned())).build())
                .build();

            self.collection
                .create_index(index)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: self.collection.name().to_owned(),
                    index: field,
                    source,
                })?;
        }

        Ok(())
    }

    async fn ping(&self) -> MongoResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn list(
        &self,
        filter: GameFilter,
        sort: GameSort,
        pagination: Pagination,
    ) -> MongoResult<Vec<GameEntity>> {
        let Some(skip) = skip_count(pagination) else {
            debug!(?pagination, "page offset beyond addressable range");
            return Ok(Vec::new());
        };

        let documents: Vec<MongoGameDocument> = self
            .collection
            .find(filter_document(&filter)?)
            .sort(sort_document(sort))
            .skip(skip)
            .limit(i64::try_from(pagination.page_size()).unwrap_or(i64::MAX))
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?;

        documents.into_iter().map(into_entity).collect()
    }

    async fn count(&self, filter: GameFilter) -> MongoResult<u64> {
        self.collection
            .count_documents(filter_document(&filter)?)
            .await
            .map_err(|source| MongoDaoError::CountGames { source })
    }

    async fn find(&self, id: &str) -> MongoResult<Option<GameEntity>> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        self.collection
            .find_one(doc_id(object_id))
            .await
            .map_err(|source| MongoDaoError::LoadGame {
                id: id.to_owned(),
                source,
            })?
            .map(into_entity)
            .transpose()
    }

    async fn create(&self, input: GameInput) -> MongoResult<GameEntity> {
        let document = MongoGameDocument::new(ObjectId::new(), input, DateTime::now())
            .map_err(|source| MongoDaoError::EncodeGame { source })?;
        let id = document.id;

        self.collection
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::InsertGame {
                id: id.to_hex(),
                source,
            })?;

        info!(id = %id, "created game");
        into_entity(document)
    }

    async fn update(&self, id: &str, input: GameInput) -> MongoResult<Option<GameEntity>> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        let update = update_document(input, DateTime::now())
            .map_err(|source| MongoDaoError::EncodeGame { source })?;
        let updated = self
            .collection
            .find_one_and_update(doc_id(object_id), update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::UpdateGame {
                id: id.to_owned(),
                source,
            })?;

        if updated.is_some() {
            info!(id = %object_id, "updated game");
        }
        updated.map(into_entity).transpose()
    }

    async fn delete(&self, id: &str) -> MongoResult<bool> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(false);
        };

        let result = self
            .collection
            .delete_one(doc_id(object_id))
            .await
            .map_err(|source| MongoDaoError::DeleteGame {
                id: id.to_owned(),
                source,
            })?;

        let deleted = result.deleted_count > 0;
        if deleted {
            info!(id = %object_id, "deleted game");
        } else {
            debug!(id = %object_id, "no game to delete");
        }
        Ok(deleted)
    }
}

fn into_entity(document: MongoGameDocument) -> MongoResult<GameEntity> {
    let id = document.id.to_hex();
    GameEntity::try_from(document).map_err(|source| MongoDaoError::CorruptDocument { id, source })
}

/// Query document for `filter`. Genre matching is anchored so it behaves
/// like the case-insensitive equality used by the in-memory store.
pub(super) fn filter_document(filter: &GameFilter) -> MongoResult<Document> {
    let mut document = Document::new();

    if let Some(genre) = filter.genre() {
        document.insert(
            "genre",
            doc! {"$regex": format!("^{}$", escape_regex(genre)), "$options": "i"},
        );
    }

    let mut price = Document::new();
    if let Some(min) = filter.min_price {
        price.insert("$gte", encode_price(min)?);
    }
    if let Some(max) = filter.max_price {
        price.insert("$lte", encode_price(max)?);
    }
    if !price.is_empty() {
        document.insert("price", price);
    }

    Ok(document)
}

fn encode_price(price: Price) -> MongoResult<Decimal128> {
    price_to_decimal(price).map_err(|source| MongoDaoError::EncodeGame { source })
}

/// Number of documents to skip for `pagination`, or `None` when the offset is
/// past what the server accepts (a signed 64-bit skip). Such pages are empty.
pub(super) fn skip_count(pagination: Pagination) -> Option<u64> {
    let skip = pagination.skip();
    i64::try_from(skip).is_ok().then_some(skip)
}

/// Sort document for `sort`; `_id` breaks ties in creation order.
pub(super) fn sort_document(sort: GameSort) -> Document {
    let direction = if sort.descending { -1 } else { 1 };
    let field = match sort.key {
        SortKey::Name => "name",
        SortKey::Price => "price",
        SortKey::ReleaseDate => "releaseDate",
        SortKey::Genre => "genre",
        SortKey::Default => return doc! {"createdAt": 1, "_id": 1},
    };

    let mut document = Document::new();
    document.insert(field, direction);
    document.insert("_id", 1);
    document
}

fn escape_regex(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(
            c,
            '\\' | '.' | '^' | '$' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl GameStore for MongoGameStore {
    fn list(
        &self,
        filter: GameFilter,
        sort: GameSort,
        pagination: Pagination,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list(filter, sort, pagination)
                .await
                .map_err(Into::into)
        })
    }

    fn count(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.count(filter).await.map_err(Into::into) })
    }

    fn find(&self, id: String) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find(&id).await.map_err(Into::into) })
    }

    fn create(&self, input: GameInput) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create(input).await.map_err(Into::into) })
    }

    fn update(
        &self,
        id: String,
        input: GameInput,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.update(&id, input).await.map_err(Into::into) })
    }

    fn delete(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete(&id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
