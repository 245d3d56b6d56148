mod constraint;
mod plan;
mod select;

pub use constraint::{parse_constraint, Bound, VersionRange};
pub use plan::{plan_install, resolve_install_decision, InstallDecision};
pub use select::select_release;

#[cfg(test)]
mod tests;
