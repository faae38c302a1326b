pub mod broadcaster;
pub mod registry;
pub mod subscriber;
pub mod update_store;
