pub mod config;
pub mod error;
pub mod geocode;
pub mod imagery;
pub mod inference;
pub mod models;
pub mod pipeline;
pub mod preprocess;
pub mod routes;

#[cfg(test)]
mod testing;
