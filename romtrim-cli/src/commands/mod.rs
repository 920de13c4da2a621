pub(crate) mod config;
pub(crate) mod formats;
pub(crate) mod restore;
pub(crate) mod trim;
