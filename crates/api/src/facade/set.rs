//! Set facade - typed unordered members and set algebra
//!
//! ## Desugaring
//!
//! | Facade | Transport |
//! |--------|-----------|
//! | `add(key, vs)` | `sadd(key, encode_all(vs))` |
//! | `difference(key, others)` | `sdiff([key, others..])` |
//! | `union_all_and_store(keys, dst)` | `sunion_store(dst, keys)` |
//! | `random_members(key, n)` | `srandmembers(key, -n)` |
//! | `distinct_random_members(key, n)` | `srandmembers(key, n)` |
//! | `move_to(key, v, dst)` | `smove(key, dst, encode(v))` |
//!
//! The `*_and_store` variants are single store commands: the result is
//! computed and written atomically, replacing whatever `destination` held.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use typedkv_core::codec::{decode, decode_all, decode_opt, decode_set, encode, encode_all};
use typedkv_core::{Result, SetCommands, Transport};

use super::cursor::CursorGuard;
use super::signed_count;
use crate::config::FacadeConfig;

/// Typed access to sets
#[derive(Clone)]
pub struct SetFacade {
    transport: Arc<dyn Transport>,
    config: Arc<FacadeConfig>,
}

impl fmt::Debug for SetFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetFacade")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// `key` followed by `others`
fn with_others<I>(key: &str, others: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    std::iter::once(key.to_string())
        .chain(others.into_iter().map(|k| k.as_ref().to_string()))
        .collect()
}

fn owned_keys<I>(keys: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    keys.into_iter().map(|k| k.as_ref().to_string()).collect()
}

impl SetFacade {
    pub(crate) fn new(transport: Arc<dyn Transport>, config: Arc<FacadeConfig>) -> Self {
        Self { transport, config }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Number of members
    pub fn size(&self, key: &str) -> Result<u64> {
        self.transport.scard(key)
    }

    /// Whether `member` is in the set
    pub fn is_member<V: Serialize + ?Sized>(&self, key: &str, member: &V) -> Result<bool> {
        self.transport.sismember(key, &encode(member)?)
    }

    /// Members matching `pattern`, via a cursor that is always released
    pub fn scan<T>(&self, key: &str, pattern: &str) -> Result<HashSet<T>>
    where
        T: DeserializeOwned + Eq + Hash,
    {
        let cursor = self
            .transport
            .sscan(key, &self.config.scan_options(pattern))?;
        CursorGuard::new(cursor).drain_map(|member| decode::<T>(&member))
    }

    /// Every member
    pub fn members<T: DeserializeOwned + Eq + Hash>(&self, key: &str) -> Result<HashSet<T>> {
        decode_set(self.transport.smembers(key)?)
    }

    // ========================================================================
    // Updates
    // ========================================================================

    /// Add members, returning how many were new
    pub fn add<I>(&self, key: &str, members: I) -> Result<u64>
    where
        I: IntoIterator,
        I::Item: Serialize,
    {
        let members = encode_all(members)?;
        if members.is_empty() {
            return Ok(0);
        }
        self.transport.sadd(key, &members)
    }

    /// Remove members, returning how many existed
    pub fn remove<I>(&self, key: &str, members: I) -> Result<u64>
    where
        I: IntoIterator,
        I::Item: Serialize,
    {
        let members = encode_all(members)?;
        if members.is_empty() {
            return Ok(0);
        }
        self.transport.srem(key, &members)
    }

    /// Atomically move `member` from `key` to `destination`
    ///
    /// Returns `false` if `member` was not in `key`.
    pub fn move_to<V: Serialize + ?Sized>(
        &self,
        key: &str,
        member: &V,
        destination: &str,
    ) -> Result<bool> {
        self.transport.smove(key, destination, &encode(member)?)
    }

    // ========================================================================
    // Set algebra
    // ========================================================================

    /// Members of `key` not in any of `others`
    pub fn difference<T, I>(&self, key: &str, others: I) -> Result<HashSet<T>>
    where
        T: DeserializeOwned + Eq + Hash,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        decode_set(self.transport.sdiff(&with_others(key, others))?)
    }

    /// Members of the first key not in any later key
    pub fn difference_all<T, I>(&self, keys: I) -> Result<HashSet<T>>
    where
        T: DeserializeOwned + Eq + Hash,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let keys = owned_keys(keys);
        if keys.is_empty() {
            return Ok(HashSet::new());
        }
        decode_set(self.transport.sdiff(&keys)?)
    }

    /// Members common to `key` and every one of `others`
    pub fn intersect<T, I>(&self, key: &str, others: I) -> Result<HashSet<T>>
    where
        T: DeserializeOwned + Eq + Hash,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        decode_set(self.transport.sinter(&with_others(key, others))?)
    }

    /// Members common to every key
    pub fn intersect_all<T, I>(&self, keys: I) -> Result<HashSet<T>>
    where
        T: DeserializeOwned + Eq + Hash,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let keys = owned_keys(keys);
        if keys.is_empty() {
            return Ok(HashSet::new());
        }
        decode_set(self.transport.sinter(&keys)?)
    }

    /// Members of `key` or any of `others`
    pub fn union<T, I>(&self, key: &str, others: I) -> Result<HashSet<T>>
    where
        T: DeserializeOwned + Eq + Hash,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        decode_set(self.transport.sunion(&with_others(key, others))?)
    }

    /// Members of any key
    pub fn union_all<T, I>(&self, keys: I) -> Result<HashSet<T>>
    where
        T: DeserializeOwned + Eq + Hash,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let keys = owned_keys(keys);
        if keys.is_empty() {
            return Ok(HashSet::new());
        }
        decode_set(self.transport.sunion(&keys)?)
    }

    /// Store [`SetFacade::difference`] at `destination`, returning its size
    pub fn difference_and_store<I>(&self, key: &str, others: I, destination: &str) -> Result<u64>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.transport
            .sdiff_store(destination, &with_others(key, others))
    }

    /// Store [`SetFacade::difference_all`] at `destination`, returning its size
    ///
    /// An empty `keys` leaves `destination` untouched and returns 0.
    pub fn difference_all_and_store<I>(&self, keys: I, destination: &str) -> Result<u64>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let keys = owned_keys(keys);
        if keys.is_empty() {
            return Ok(0);
        }
        self.transport.sdiff_store(destination, &keys)
    }

    /// Store [`SetFacade::intersect`] at `destination`, returning its size
    pub fn intersect_and_store<I>(&self, key: &str, others: I, destination: &str) -> Result<u64>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.transport
            .sinter_store(destination, &with_others(key, others))
    }

    /// Store [`SetFacade::intersect_all`] at `destination`, returning its size
    ///
    /// An empty `keys` leaves `destination` untouched and returns 0.
    pub fn intersect_all_and_store<I>(&self, keys: I, destination: &str) -> Result<u64>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let keys = owned_keys(keys);
        if keys.is_empty() {
            return Ok(0);
        }
        self.transport.sinter_store(destination, &keys)
    }

    /// Store [`SetFacade::union`] at `destination`, returning its size
    pub fn union_and_store<I>(&self, key: &str, others: I, destination: &str) -> Result<u64>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.transport
            .sunion_store(destination, &with_others(key, others))
    }

    /// Store [`SetFacade::union_all`] at `destination`, returning its size
    ///
    /// An empty `keys` leaves `destination` untouched and returns 0.
    pub fn union_all_and_store<I>(&self, keys: I, destination: &str) -> Result<u64>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let keys = owned_keys(keys);
        if keys.is_empty() {
            return Ok(0);
        }
        self.transport.sunion_store(destination, &keys)
    }

    // ========================================================================
    // Random access
    // ========================================================================

    /// Remove and return a random member
    pub fn pop<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        decode_opt(self.transport.spop(key)?)
    }

    /// Remove and return up to `count` random members
    pub fn pop_count<T: DeserializeOwned>(&self, key: &str, count: usize) -> Result<Vec<T>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        decode_all(self.transport.spop_count(key, count)?)
    }

    /// A random member, left in place
    pub fn random_member<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        decode_opt(self.transport.srandmember(key)?)
    }

    /// `count` random members; the same member may appear more than once
    pub fn random_members<T: DeserializeOwned>(&self, key: &str, count: usize) -> Result<Vec<T>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        decode_all(self.transport.srandmembers(key, -signed_count(count)?)?)
    }

    /// Up to `count` distinct random members
    pub fn distinct_random_members<T>(&self, key: &str, count: usize) -> Result<HashSet<T>>
    where
        T: DeserializeOwned + Eq + Hash,
    {
        if count == 0 {
            return Ok(HashSet::new());
        }
        decode_set(self.transport.srandmembers(key, signed_count(count)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typedkv_core::{Error, KeyCommands, StringCommands};
    use typedkv_storage::MemoryStore;

    fn facade() -> (MemoryStore, SetFacade) {
        let store = MemoryStore::new();
        let facade = SetFacade::new(
            Arc::new(store.clone()),
            Arc::new(FacadeConfig::new().with_scan_count(2)),
        );
        (store, facade)
    }

    fn nums(values: &[i32]) -> HashSet<i32> {
        values.iter().copied().collect()
    }

    #[test]
    fn test_add_remove_and_membership() {
        let (store, sets) = facade();
        assert_eq!(sets.add("s", [1, 2, 2, 3]).unwrap(), 3);
        assert_eq!(sets.add("s", [3, 4]).unwrap(), 1);
        assert!(sets.is_member("s", &4).unwrap());
        assert_eq!(sets.remove("s", [1, 9]).unwrap(), 1);
        assert_eq!(sets.size("s").unwrap(), 3);
        assert_eq!(sets.add("s", Vec::<i32>::new()).unwrap(), 0);
        sets.remove("s", [2, 3, 4]).unwrap();
        assert!(!store.exists("s").unwrap());
    }

    #[test]
    fn test_algebra() {
        let (_, sets) = facade();
        sets.add("a", [1, 2, 3]).unwrap();
        sets.add("b", [2, 3, 4]).unwrap();
        sets.add("c", [3, 5]).unwrap();

        assert_eq!(sets.difference::<i32, _>("a", ["b"]).unwrap(), nums(&[1]));
        assert_eq!(sets.intersect::<i32, _>("a", ["b", "c"]).unwrap(), nums(&[3]));
        assert_eq!(
            sets.union::<i32, _>("a", ["b", "c"]).unwrap(),
            nums(&[1, 2, 3, 4, 5])
        );
        assert_eq!(
            sets.intersect_all::<i32, _>(["a", "missing"]).unwrap(),
            HashSet::new()
        );
        assert_eq!(sets.difference::<i32, _>("a", Vec::<String>::new()).unwrap(), nums(&[1, 2, 3]));
    }

    #[test]
    fn test_empty_key_lists() {
        let (store, sets) = facade();
        assert!(sets.union_all::<i32, _>(Vec::<String>::new()).unwrap().is_empty());
        assert!(sets.difference_all::<i32, _>(Vec::<String>::new()).unwrap().is_empty());
        StringCommands::set(&store, "dst", "kept").unwrap();
        assert_eq!(sets.union_all_and_store(Vec::<String>::new(), "dst").unwrap(), 0);
        assert_eq!(StringCommands::get(&store, "dst").unwrap(), Some("kept".into()));
    }

    #[test]
    fn test_store_variants_replace_destination() {
        let (_, sets) = facade();
        sets.add("a", [1, 2, 3]).unwrap();
        sets.add("b", [2, 3, 4]).unwrap();
        sets.add("dst", [99]).unwrap();

        assert_eq!(sets.intersect_and_store("a", ["b"], "dst").unwrap(), 2);
        assert_eq!(sets.members::<i32>("dst").unwrap(), nums(&[2, 3]));
        assert_eq!(sets.union_all_and_store(["a", "b"], "u").unwrap(), 4);
        assert_eq!(sets.difference_and_store("b", ["a"], "d").unwrap(), 1);
        assert_eq!(sets.members::<i32>("d").unwrap(), nums(&[4]));
        assert_eq!(sets.difference_all_and_store(["a", "b"], "d2").unwrap(), 1);
        assert_eq!(sets.intersect_all_and_store(["a", "b"], "i2").unwrap(), 2);
        assert_eq!(sets.union_and_store("a", ["b"], "u2").unwrap(), 4);
    }

    #[test]
    fn test_algebra_on_wrong_type_is_transport_error() {
        let (store, sets) = facade();
        StringCommands::set(&store, "text", "x").unwrap();
        sets.add("a", [1]).unwrap();
        let err = sets.union::<i32, _>("a", ["text"]).unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_scan_releases_cursor() {
        let (store, sets) = facade();
        sets.add("tags", ["red", "green", "blue", "grey"]).unwrap();
        let matched: HashSet<String> = sets.scan("tags", "gr*").unwrap();
        assert_eq!(
            matched,
            HashSet::from(["green".to_string(), "grey".to_string()])
        );
        assert_eq!(store.open_cursors(), 0);
    }

    #[test]
    fn test_scan_decoding_failure_releases_cursor() {
        let (store, sets) = facade();
        sets.add("s", ["1", "2", "x", "3"]).unwrap();
        let result: Result<HashSet<i32>> = sets.scan("s", "*");
        assert!(matches!(result, Err(Error::DecodingError { .. })));
        assert_eq!(store.open_cursors(), 0);
    }

    #[test]
    fn test_pops() {
        let (store, sets) = facade();
        sets.add("s", [1, 2, 3]).unwrap();
        let popped: i32 = sets.pop("s").unwrap().unwrap();
        assert!(!sets.is_member("s", &popped).unwrap());
        let rest: Vec<i32> = sets.pop_count("s", 10).unwrap();
        assert_eq!(rest.len(), 2);
        assert!(!store.exists("s").unwrap());
        assert_eq!(sets.pop::<i32>("s").unwrap(), None);
    }

    #[test]
    fn test_random_members() {
        let (_, sets) = facade();
        sets.add("s", [1, 2]).unwrap();
        let repeated: Vec<i32> = sets.random_members("s", 6).unwrap();
        assert_eq!(repeated.len(), 6);
        let distinct: HashSet<i32> = sets.distinct_random_members("s", 6).unwrap();
        assert_eq!(distinct, nums(&[1, 2]));
        assert!(sets.random_member::<i32>("s").unwrap().is_some());
        assert!(sets.random_members::<i32>("none", 3).unwrap().is_empty());
    }

    #[test]
    fn test_move_to() {
        let (_, sets) = facade();
        sets.add("todo", ["write"]).unwrap();
        assert!(sets.move_to("todo", "write", "done").unwrap());
        assert!(!sets.move_to("todo", "write", "done").unwrap());
        assert!(sets.is_member("done", "write").unwrap());
    }
}
