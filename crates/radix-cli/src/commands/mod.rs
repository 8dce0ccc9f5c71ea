pub mod config_ops;
pub mod pack_ops;
