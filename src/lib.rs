pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod repository;
pub mod routes;
pub mod serializers;
pub mod state;
