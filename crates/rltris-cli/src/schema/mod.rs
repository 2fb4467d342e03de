pub(crate) mod checkpoint;
pub(crate) mod evaluation;
pub(crate) mod run_config;
