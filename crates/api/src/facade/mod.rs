//! Facades - typed views over the transport's collections
//!
//! Each facade wraps one family of transport commands and moves values
//! through the codec on the way in and out:
//! - Implicit encoding: any `Serialize` value can be stored
//! - Type-driven decoding: the caller names the target type
//! - One transport call per method, so store-side atomicity is preserved
//!
//! ## Design Philosophy
//!
//! A facade is syntactic sugar over the transport. Every facade call
//! desugars to exactly one transport call, plus codec work.
//!
//! ## Module Structure
//!
//! - `value`: scalar values and counters
//! - `hash`: field/value maps under one key
//! - `list`: double-ended sequences and blocking pops
//! - `set`: unordered unique members and set algebra
//! - `sorted_set`: members ordered by score
//!
//! ## Empty Inputs
//!
//! Bulk methods given an empty collection return an empty result without
//! calling the transport.
//!
//! ## Desugaring Examples
//!
//! | Facade Call | Transport Equivalent |
//! |-------------|---------------------|
//! | `values().get::<T>(key)` | `get(key)` then `decode::<T>` |
//! | `hashes().put(key, f, v)` | `hset(key, encode(f), encode(v))` |
//! | `lists().left_push(key, v)` | `lpush(key, [encode(v)])` |
//! | `sets().add(key, vs)` | `sadd(key, encode_all(vs))` |
//! | `sorted_sets().add(key, v, s)` | `zadd(key, [(encode(v), s)])` |

pub(crate) mod cursor;
pub mod hash;
pub mod list;
pub mod set;
pub mod sorted_set;
pub mod value;

pub use hash::HashFacade;
pub use list::ListFacade;
pub use set::SetFacade;
pub use sorted_set::SortedSetFacade;
pub use value::ValueFacade;

use typedkv_core::{Error, Result};

/// Convert a caller's count into the signed count the transport expects
pub(crate) fn signed_count(count: usize) -> Result<i64> {
    i64::try_from(count)
        .map_err(|_| Error::precondition(format!("count {} is out of range", count)))
}
