pub(crate) mod pdf;
pub(crate) mod sink;
