//! Set commands

use std::collections::HashSet;

use rand::seq::IteratorRandom;
use typedkv_core::{Result, ScanCursor, ScanOptions, SetCommands, TransportError};

use super::hashes::pick_random;
use super::{Keyspace, MemoryStore};
use crate::cursor::{select_page, MemoryCursor, PageFn};
use crate::entry::{Data, Entry};
use crate::glob::glob_match;

#[derive(Clone, Copy)]
enum Algebra {
    Difference,
    Intersection,
    Union,
}

/// Evaluate set algebra over `keys`; missing keys count as empty sets
fn evaluate(keyspace: &mut Keyspace, keys: &[String], op: Algebra) -> Result<HashSet<String>> {
    let Some((first, rest)) = keys.split_first() else {
        return Err(TransportError::Protocol("set algebra needs at least one key".into()).into());
    };
    let mut result = keyspace.set_mut(first)?.cloned().unwrap_or_default();
    for key in rest {
        let other = keyspace.set_mut(key)?;
        match op {
            Algebra::Difference => {
                if let Some(other) = other {
                    result.retain(|member| !other.contains(member));
                }
            }
            Algebra::Intersection => match other {
                Some(other) => result.retain(|member| other.contains(member)),
                None => result.clear(),
            },
            Algebra::Union => {
                if let Some(other) = other {
                    result.extend(other.iter().cloned());
                }
            }
        }
    }
    Ok(result)
}

impl MemoryStore {
    fn algebra(&self, keys: &[String], op: Algebra) -> Result<HashSet<String>> {
        evaluate(&mut *self.lock()?, keys, op)
    }

    fn algebra_store(&self, destination: &str, keys: &[String], op: Algebra) -> Result<u64> {
        let mut keyspace = self.lock()?;
        let result = evaluate(&mut keyspace, keys, op)?;
        let size = result.len() as u64;
        keyspace.take(destination);
        if !result.is_empty() {
            keyspace.put(destination, Entry::new(Data::Set(result)));
        }
        Ok(size)
    }
}

impl SetCommands for MemoryStore {
    fn scard(&self, key: &str) -> Result<u64> {
        let mut keyspace = self.lock()?;
        Ok(keyspace.set_mut(key)?.map_or(0, |s| s.len() as u64))
    }

    fn sismember(&self, key: &str, member: &str) -> Result<bool> {
        let mut keyspace = self.lock()?;
        Ok(keyspace.set_mut(key)?.map_or(false, |s| s.contains(member)))
    }

    fn sscan(&self, key: &str, options: &ScanOptions) -> Result<Box<dyn ScanCursor<String>>> {
        self.lock()?.set_mut(key)?;
        let key = key.to_string();
        let pattern = options.pattern.clone();
        let fetch: PageFn<String> = Box::new(move |keyspace, resume_after, page_size| {
            let Some(set) = keyspace.set_mut(&key)? else {
                return Ok(Vec::new());
            };
            let candidates = set
                .iter()
                .filter(|member| pattern.as_deref().map_or(true, |p| glob_match(p, member)))
                .map(|member| (member.clone(), member.clone()));
            Ok(select_page(candidates, resume_after, page_size))
        });
        Ok(Box::new(MemoryCursor::open(
            self.shared(),
            options.count,
            fetch,
        )))
    }

    fn sadd(&self, key: &str, members: &[String]) -> Result<u64> {
        let mut keyspace = self.lock()?;
        let set = keyspace.set_or_insert(key)?;
        let added = members
            .iter()
            .filter(|member| set.insert((*member).clone()))
            .count();
        keyspace.drop_if_empty(key);
        Ok(added as u64)
    }

    fn srem(&self, key: &str, members: &[String]) -> Result<u64> {
        let mut keyspace = self.lock()?;
        let removed = match keyspace.set_mut(key)? {
            Some(set) => members.iter().filter(|m| set.remove(*m)).count(),
            None => 0,
        };
        keyspace.drop_if_empty(key);
        Ok(removed as u64)
    }

    fn sdiff(&self, keys: &[String]) -> Result<HashSet<String>> {
        self.algebra(keys, Algebra::Difference)
    }

    fn sinter(&self, keys: &[String]) -> Result<HashSet<String>> {
        self.algebra(keys, Algebra::Intersection)
    }

    fn sunion(&self, keys: &[String]) -> Result<HashSet<String>> {
        self.algebra(keys, Algebra::Union)
    }

    fn sdiff_store(&self, destination: &str, keys: &[String]) -> Result<u64> {
        self.algebra_store(destination, keys, Algebra::Difference)
    }

    fn sinter_store(&self, destination: &str, keys: &[String]) -> Result<u64> {
        self.algebra_store(destination, keys, Algebra::Intersection)
    }

    fn sunion_store(&self, destination: &str, keys: &[String]) -> Result<u64> {
        self.algebra_store(destination, keys, Algebra::Union)
    }

    fn spop(&self, key: &str) -> Result<Option<String>> {
        Ok(self.spop_count(key, 1)?.pop())
    }

    fn spop_count(&self, key: &str, count: usize) -> Result<Vec<String>> {
        let mut keyspace = self.lock()?;
        let popped = match keyspace.set_mut(key)? {
            Some(set) => {
                let chosen: Vec<String> = set
                    .iter()
                    .cloned()
                    .choose_multiple(&mut rand::thread_rng(), count);
                for member in &chosen {
                    set.remove(member);
                }
                chosen
            }
            None => Vec::new(),
        };
        keyspace.drop_if_empty(key);
        Ok(popped)
    }

    fn srandmember(&self, key: &str) -> Result<Option<String>> {
        Ok(self.srandmembers(key, 1)?.pop())
    }

    fn srandmembers(&self, key: &str, count: i64) -> Result<Vec<String>> {
        let mut keyspace = self.lock()?;
        Ok(match keyspace.set_mut(key)? {
            Some(set) => pick_random(set.iter(), count),
            None => Vec::new(),
        })
    }

    fn smembers(&self, key: &str) -> Result<HashSet<String>> {
        let mut keyspace = self.lock()?;
        Ok(keyspace.set_mut(key)?.cloned().unwrap_or_default())
    }

    fn smove(&self, source: &str, destination: &str, member: &str) -> Result<bool> {
        let mut keyspace = self.lock()?;
        keyspace.ensure_kind(destination, |data| matches!(data, Data::Set(_)))?;
        let removed = match keyspace.set_mut(source)? {
            Some(set) => set.remove(member),
            None => false,
        };
        if !removed {
            return Ok(false);
        }
        keyspace.drop_if_empty(source);
        keyspace
            .set_or_insert(destination)?
            .insert(member.to_string());
        Ok(true)
    }
}
