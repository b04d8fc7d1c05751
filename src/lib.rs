pub mod app;
pub mod board;
pub mod column_view;
pub mod db;
pub mod logging;
pub mod realm;
pub mod settings;
pub mod theme;
pub mod types;
pub mod ui;
