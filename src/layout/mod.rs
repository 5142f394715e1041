pub(crate) mod arrangement;
pub(crate) mod chunker;
pub(crate) mod fit;
pub(crate) mod geometry;
pub(crate) mod metrics;
pub(crate) mod planner;
