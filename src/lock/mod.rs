// Sqlauth - Lock Module
//
// Mutual exclusion scoped to a dynamic string key. Writers for one identity
// serialize, writers for different identities never contend.

mod keyed;

pub use keyed::{KeyedGuard, KeyedMutex};
