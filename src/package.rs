pub(crate) mod archive;
pub(crate) mod html;
pub(crate) mod session;
