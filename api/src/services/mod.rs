pub mod db;
pub mod detection;
pub mod error;
