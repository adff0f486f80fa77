pub mod api;
pub mod cache;
pub mod goal;
pub mod recommendation;
pub mod tracker;
