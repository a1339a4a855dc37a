pub(crate) mod chrome;
pub(crate) mod layout;
pub(crate) mod scale;
pub(crate) mod style;
