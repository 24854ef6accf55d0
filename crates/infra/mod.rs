pub mod db;
pub mod storages;
