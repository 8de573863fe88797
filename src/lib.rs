pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod http;
pub mod library;
pub mod models;
pub mod recommend;
pub mod stats;
pub mod store;
pub mod tmdb;
