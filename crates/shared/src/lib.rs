pub mod config;
pub mod db;
pub mod error;
pub mod domain {
    pub mod booking;
    pub mod event;
}
pub mod form;
pub mod normalize;
pub mod records;
pub mod repo;
pub mod seed;
pub mod upload;

pub use config::AppConfig;
