pub mod careervice;
pub mod models;
