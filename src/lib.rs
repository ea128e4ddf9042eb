pub mod app;
pub mod config;
pub mod engine;
pub mod event;
pub mod generator;
pub mod lexicon;
pub mod session;
pub mod store;
pub mod ui;

rust_i18n::i18n!("locales", fallback = "en");
