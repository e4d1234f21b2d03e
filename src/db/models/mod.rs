mod snapshot;

pub use snapshot::{NewSnapshot, Snapshot};
