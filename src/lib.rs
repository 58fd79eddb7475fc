pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod kanban;
pub mod logging;
pub mod mappers;
pub mod models;
pub mod stats;
pub mod store;
pub mod timeline;
pub mod tui;
