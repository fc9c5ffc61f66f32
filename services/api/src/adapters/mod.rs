pub mod object_store;
pub mod probe;
pub mod rest_store;

pub use object_store::BucketStore;
pub use rest_store::RestStore;
