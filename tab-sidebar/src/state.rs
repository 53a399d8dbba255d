pub mod plan;
pub mod reconcile;
pub mod registry;
pub mod selection;
pub mod tab;
pub mod view;
