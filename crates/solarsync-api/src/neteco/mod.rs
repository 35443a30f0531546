pub mod auth;
pub mod client;
pub mod models;
pub mod plants;

pub use client::NetEcoClient;
