pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

#[cfg(test)]
mod testutil;

pub use domain::user;
pub use outbound::repositories;
