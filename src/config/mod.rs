pub mod cache_kinds;
pub mod redis_config;
pub mod server_config;
