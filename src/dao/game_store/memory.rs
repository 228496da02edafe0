//! Non-persistent [`GameStore`] keeping every record in process memory.

use std::{sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use time::{Date, macros::date};
use tokio::sync::RwLock;
use tracing::debug;

use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, GameFilter, GameId, GameInput, GameSort, Pagination, Price},
    storage::StorageResult,
};

/// In-memory store handing out sequential integer identifiers.
///
/// Records are kept in insertion order, which is also the default list order.
/// Writes hold the lock for the whole operation so the id counter and the
/// collection always move together.
#[derive(Clone)]
pub struct MemoryGameStore {
    inner: Arc<RwLock<MemoryState>>,
}

struct MemoryState {
    games: IndexMap<u64, GameEntity>,
    next_id: u64,
}

impl MemoryState {
    fn insert(&mut self, input: GameInput, now: SystemTime) -> GameEntity {
        let id = self.next_id;
        self.next_id += 1;

        let game = GameEntity {
            id: GameId::Sequential(id),
            name: input.name,
            genre: input.genre,
            price: input.price,
            release_date: input.release_date,
            created_at: now,
            updated_at: now,
        };
        self.games.insert(id, game.clone());
        game
    }
}

impl MemoryGameStore {
    /// Empty store whose first record receives id 1.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryState {
                games: IndexMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Store preloaded with the sample catalog (ids 1 to 5).
    pub fn seeded() -> Self {
        let now = SystemTime::now();
        let mut state = MemoryState {
            games: IndexMap::new(),
            next_id: 1,
        };
        for input in seed_games() {
            state.insert(input, now);
        }
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    async fn list(
        &self,
        filter: GameFilter,
        sort: GameSort,
        pagination: Pagination,
    ) -> Vec<GameEntity> {
        let state = self.inner.read().await;
        let mut games: Vec<&GameEntity> =
            state.games.values().filter(|game| filter.matches(game)).collect();
        // Stable sort: ties keep insertion order.
        games.sort_by(|a, b| sort.compare(a, b));

        let skip = usize::try_from(pagination.skip()).unwrap_or(usize::MAX);
        let take = usize::try_from(pagination.page_size()).unwrap_or(usize::MAX);
        games.into_iter().skip(skip).take(take).cloned().collect()
    }

    async fn count(&self, filter: GameFilter) -> u64 {
        let state = self.inner.read().await;
        state
            .games
            .values()
            .filter(|game| filter.matches(game))
            .count() as u64
    }

    async fn find(&self, id: &str) -> Option<GameEntity> {
        let id = parse_id(id)?;
        let state = self.inner.read().await;
        state.games.get(&id).cloned()
    }

    async fn create(&self, input: GameInput) -> GameEntity {
        let mut state = self.inner.write().await;
        let game = state.insert(input, SystemTime::now());
        debug!(id = %game.id, "stored game in memory");
        game
    }

    async fn update(&self, id: &str, input: GameInput) -> Option<GameEntity> {
        let id = parse_id(id)?;
        let mut state = self.inner.write().await;
        let game = state.games.get_mut(&id)?;

        game.name = input.name;
        game.genre = input.genre;
        game.price = input.price;
        game.release_date = input.release_date;
        game.updated_at = SystemTime::now().max(game.created_at);
        Some(game.clone())
    }

    async fn delete(&self, id: &str) -> bool {
        let Some(id) = parse_id(id) else {
            return false;
        };
        let mut state = self.inner.write().await;
        state.games.shift_remove(&id).is_some()
    }
}

impl Default for MemoryGameStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Only canonical decimal ids are accepted; `+1` or ` 1` never name game 1.
fn parse_id(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn seed_game(name: &str, genre: &str, cents: i64, release_date: Date) -> GameInput {
    GameInput {
        name: name.to_owned(),
        genre: genre.to_owned(),
        price: Price::from_cents(cents),
        release_date,
    }
}

fn seed_games() -> Vec<GameInput> {
    vec![
        seed_game("E-Football", "Football", 1999, date!(2015 - 04 - 05)),
        seed_game("FIFA 23", "Football", 5999, date!(2022 - 09 - 30)),
        seed_game("NBA 2K24", "Basketball", 6999, date!(2023 - 09 - 08)),
        seed_game(
            "Call of Duty: Modern Warfare",
            "Shooter",
            4999,
            date!(2019 - 10 - 25),
        ),
        seed_game(
            "Assassin's Creed Valhalla",
            "Action RPG",
            5999,
            date!(2020 - 11 - 10),
        ),
    ]
}

impl GameStore for MemoryGameStore {
    fn list(
        &self,
        filter: GameFilter,
        sort: GameSort,
        pagination: Pagination,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.list(filter, sort, pagination).await) })
    }

    fn count(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.count(filter).await) })
    }

    fn find(&self, id: String) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.find(&id).await) })
    }

    fn create(&self, input: GameInput) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.create(input).await) })
    }

    fn update(
        &self,
        id: String,
        input: GameInput,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.update(&id, input).await) })
    }

    fn delete(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.delete(&id).await) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::SortKey;

    fn input(name: &str, genre: &str, cents: i64) -> GameInput {
        seed_game(name, genre, cents, date!(2020 - 01 - 01))
    }

    fn names(games: &[GameEntity]) -> Vec<&str> {
        games.iter().map(|game| game.name.as_str()).collect()
    }

    #[tokio::test]
    async fn create_assigns_fresh_sequential_ids() {
        let store = MemoryGameStore::new();
        let first = store.create(input("A", "Shooter", 100)).await;
        let second = store.create(input("B", "Shooter", 100)).await;

        assert_eq!(first.id, GameId::Sequential(1));
        assert_eq!(second.id, GameId::Sequential(2));
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let store = MemoryGameStore::new();
        store.create(input("A", "Shooter", 100)).await;
        store.create(input("B", "Shooter", 100)).await;

        assert!(store.delete("2").await);
        let next = store.create(input("C", "Shooter", 100)).await;
        assert_eq!(next.id, GameId::Sequential(3));
    }

    #[tokio::test]
    async fn seeded_store_continues_at_six() {
        let store = MemoryGameStore::seeded();
        assert_eq!(store.count(GameFilter::default()).await, 5);
        let game = store.create(input("New", "Puzzle", 100)).await;
        assert_eq!(game.id, GameId::Sequential(6));
    }

    #[tokio::test]
    async fn unknown_or_malformed_ids_are_absent() {
        let store = MemoryGameStore::seeded();
        assert!(store.find("42").await.is_none());
        assert!(store.find("not-a-number").await.is_none());
        assert!(store.update("abc", input("X", "Y", 100)).await.is_none());
        assert!(!store.delete("-1").await);
    }

    #[tokio::test]
    async fn signed_or_padded_ids_do_not_resolve() {
        let store = MemoryGameStore::seeded();
        assert!(store.find("1").await.is_some());
        assert!(store.find("+1").await.is_none());
        assert!(store.find(" 1").await.is_none());
        assert!(store.find("").await.is_none());
        assert!(!store.delete("+1").await);
        assert!(store.find("1").await.is_some());
    }

    #[tokio::test]
    async fn delete_twice_reports_false_second_time() {
        let store = MemoryGameStore::seeded();
        assert!(store.delete("3").await);
        assert!(!store.delete("3").await);
        assert!(store.find("3").await.is_none());
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_identity() {
        let store = MemoryGameStore::new();
        let created = store.create(input("Old", "Shooter", 999)).await;

        let updated = store
            .update("1", input("New", "Racing", 1999))
            .await
            .expect("game exists");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.name, "New");
        assert_eq!(updated.price, Price::from_cents(1999));
        assert_eq!(store.find("1").await, Some(updated));
    }

    #[tokio::test]
    async fn genre_filter_ignores_case() {
        let store = MemoryGameStore::seeded();
        let filter = GameFilter::new(Some("fOOtball".into()), None, None);

        let games = store
            .list(filter.clone(), GameSort::default(), Pagination::default())
            .await;
        assert_eq!(names(&games), ["E-Football", "FIFA 23"]);
        assert_eq!(store.count(filter).await, 2);
    }

    #[tokio::test]
    async fn price_sort_descending_keeps_insertion_order_for_ties() {
        let store = MemoryGameStore::seeded();
        let games = store
            .list(
                GameFilter::default(),
                GameSort::new(SortKey::Price, true),
                Pagination::default(),
            )
            .await;

        assert_eq!(
            names(&games),
            [
                "NBA 2K24",
                "FIFA 23",
                "Assassin's Creed Valhalla",
                "Call of Duty: Modern Warfare",
                "E-Football",
            ]
        );
    }

    #[tokio::test]
    async fn default_sort_ignores_descending_flag() {
        let store = MemoryGameStore::seeded();
        let games = store
            .list(
                GameFilter::default(),
                GameSort::new(SortKey::Default, true),
                Pagination::default(),
            )
            .await;
        let ids: Vec<_> = games.iter().map(|game| game.id.clone()).collect();
        assert_eq!(ids, (1..=5).map(GameId::Sequential).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn pages_cover_every_record_once() {
        let store = MemoryGameStore::seeded();
        let mut seen = Vec::new();
        for page in 1..=3 {
            let games = store
                .list(
                    GameFilter::default(),
                    GameSort::new(SortKey::Name, false),
                    Pagination::new(Some(page), Some(2)),
                )
                .await;
            seen.extend(games);
        }
        assert_eq!(seen.len(), 5);

        let beyond = store
            .list(
                GameFilter::default(),
                GameSort::default(),
                Pagination::new(Some(4), Some(2)),
            )
            .await;
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn concurrent_creates_never_share_an_id() {
        let store = MemoryGameStore::new();
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.create(input(&format!("G{i}"), "X", 100)).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().id);
        }
        ids.sort_by_key(|id| id.to_string().parse::<u64>().unwrap());
        ids.dedup();
        assert_eq!(ids.len(), 32);
    }
}
