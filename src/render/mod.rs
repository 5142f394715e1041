pub(crate) mod cpu;
pub(crate) mod page;
pub(crate) mod plan;
pub(crate) mod surface;
