//! Database access for docusense-server

pub mod tickets;
