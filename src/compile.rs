pub(crate) mod snapshot;
pub(crate) mod story;
