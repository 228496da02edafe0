/// Game storage backends and the trait they implement.
pub mod game_store;
/// Domain records and query types shared by every backend.
pub mod models;
/// Storage abstraction layer errors.
pub mod storage;
