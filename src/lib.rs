//! marktsync - publish catalog products to the Marktplaats.nl marketplace.
//!
//! The marketplace exposes no official taxonomy API, so the category tree is
//! discovered by best-effort HTML scraping ([`scrapers`]) and cached with a
//! time-based expiry ([`cache`]). A [`refresh`] coordinator keeps the
//! snapshot current, and [`listing`] prepares catalog products for posting
//! behind a typed marketplace boundary.

pub mod cache;
pub mod cli;
pub mod config;
pub mod listing;
pub mod models;
pub mod refresh;
pub mod scrapers;
