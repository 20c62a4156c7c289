pub(crate) mod adjust;
