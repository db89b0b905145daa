pub mod amp;
pub mod inventory;
pub mod server;
pub mod version;
pub mod web;
