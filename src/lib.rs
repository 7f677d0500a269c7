pub mod api_router;
pub mod config;
pub mod contacts;
pub mod shared;
pub mod sheet;
