pub mod admin_routes;
pub mod match_routes;
pub mod network_routes;
pub mod post_routes;
pub mod profile_routes;
pub mod project_routes;
pub mod tag_routes;
