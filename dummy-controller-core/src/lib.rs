pub mod config;
pub mod helpers;
pub mod kubernetes;
pub mod resources;

pub const RESOURCE_GROUP: &str = "dummy.alexxsilvers";

pub const DUMMY_FINALIZER: &str = "dummy/finalizer";
