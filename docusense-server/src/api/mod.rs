//! HTTP API handlers for docusense-server

pub mod health;
pub mod ingest;
pub mod tickets;

pub use health::health_routes;
pub use ingest::ingest_routes;
pub use tickets::ticket_routes;
