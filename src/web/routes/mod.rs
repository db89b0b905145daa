pub mod amp_routes;
pub mod dedicated_routes;
