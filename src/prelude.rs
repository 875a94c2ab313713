pub use crate::builder::{CacheBuilder, PolicyKind};
pub use crate::cache::{
    FifoCache, HalvingLfuCache, LfuCache, LruCache, MruCache, PolicyCache, RedisLfuCache,
    SlruCache, TwoQCache,
};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::key::CompositeKey;
pub use crate::policy::{
    EvictionPolicy, FifoPolicy, HalvingLfuPolicy, LfuPolicy, LruPolicy, MruPolicy, RedisLfuPolicy,
    SlruPolicy, TwoQPolicy,
};
pub use crate::registry::MethodCacheRegistry;
pub use crate::sharded::ShardedCache;
pub use crate::shared::{SharedCache, SharedShardedCache};
pub use crate::sync::{Exclusive, Shared, Unsync};
pub use crate::traits::Cache;
