pub mod commands;
pub mod config;
pub mod context;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;
pub mod utils;
pub mod validation;

#[cfg(test)]
mod test_support;
