mod client;
mod error;
mod service;

#[cfg(test)]
pub mod test_server;

pub use client::ApiClient;
pub use error::ApiError;
pub use service::AccountService;
