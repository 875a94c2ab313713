//! Bookkeeping structures shared by the eviction policies.

pub mod freq_buckets;
pub mod key_list;
pub mod shard;

pub use freq_buckets::FreqBuckets;
pub use key_list::{KeyList, NodeId};
pub use shard::ShardSelector;
