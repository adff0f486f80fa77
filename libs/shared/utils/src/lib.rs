pub mod debounce;
pub mod test_utils;

pub use debounce::Debouncer;
