//! List commands

use std::collections::VecDeque;
use std::time::Duration;

use typedkv_core::{Error, ListCommands, Result, TransportError};

use super::{resolve_index, resolve_range, Keyspace, MemoryStore};
use crate::entry::Data;

#[derive(Clone, Copy)]
enum End {
    Head,
    Tail,
}

fn pop_from(keyspace: &mut Keyspace, key: &str, end: End, count: usize) -> Result<Vec<String>> {
    let popped = match keyspace.list_mut(key)? {
        Some(list) => {
            let take = count.min(list.len());
            match end {
                End::Head => list.drain(..take).collect(),
                End::Tail => (0..take).filter_map(|_| list.pop_back()).collect(),
            }
        }
        None => Vec::new(),
    };
    keyspace.drop_if_empty(key);
    Ok(popped)
}

fn pop_one(keyspace: &mut Keyspace, key: &str, end: End) -> Result<Option<String>> {
    Ok(pop_from(keyspace, key, end, 1)?.pop())
}

fn move_tail_to_head(
    keyspace: &mut Keyspace,
    source: &str,
    destination: &str,
) -> Result<Option<String>> {
    keyspace.ensure_kind(destination, |data| matches!(data, Data::List(_)))?;
    let Some(value) = pop_one(keyspace, source, End::Tail)? else {
        return Ok(None);
    };
    keyspace
        .list_or_insert(destination)?
        .push_front(value.clone());
    Ok(Some(value))
}

fn push_to(
    keyspace: &mut Keyspace,
    key: &str,
    values: &[String],
    end: End,
    create: bool,
) -> Result<u64> {
    if values.is_empty() {
        return Err(TransportError::Protocol("wrong number of arguments for push".into()).into());
    }
    let list: &mut VecDeque<String> = if create {
        keyspace.list_or_insert(key)?
    } else {
        match keyspace.list_mut(key)? {
            Some(list) => list,
            None => return Ok(0),
        }
    };
    for value in values {
        match end {
            End::Head => list.push_front(value.clone()),
            End::Tail => list.push_back(value.clone()),
        }
    }
    Ok(list.len() as u64)
}

impl MemoryStore {
    fn push(&self, key: &str, values: &[String], end: End, create: bool) -> Result<u64> {
        let len = push_to(&mut *self.lock()?, key, values, end, create)?;
        if len > 0 {
            self.notify_pushed();
        }
        Ok(len)
    }
}

impl ListCommands for MemoryStore {
    fn llen(&self, key: &str) -> Result<u64> {
        let mut keyspace = self.lock()?;
        Ok(keyspace.list_mut(key)?.map_or(0, |l| l.len() as u64))
    }

    fn lindex(&self, key: &str, index: i64) -> Result<Option<String>> {
        let mut keyspace = self.lock()?;
        Ok(keyspace.list_mut(key)?.and_then(|list| {
            resolve_index(index, list.len()).and_then(|i| list.get(i).cloned())
        }))
    }

    fn lpos(&self, key: &str, value: &str, rank: i64) -> Result<Option<u64>> {
        if rank == 0 {
            return Err(TransportError::Protocol("RANK can't be zero".into()).into());
        }
        let mut keyspace = self.lock()?;
        let Some(list) = keyspace.list_mut(key)? else {
            return Ok(None);
        };
        let nth = (rank.unsigned_abs() - 1) as usize;
        let position = if rank > 0 {
            list.iter()
                .enumerate()
                .filter(|(_, v)| v.as_str() == value)
                .nth(nth)
                .map(|(i, _)| i)
        } else {
            list.iter()
                .enumerate()
                .rev()
                .filter(|(_, v)| v.as_str() == value)
                .nth(nth)
                .map(|(i, _)| i)
        };
        Ok(position.map(|i| i as u64))
    }

    fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        let mut keyspace = self.lock()?;
        let Some(list) = keyspace.list_mut(key)? else {
            return Ok(Vec::new());
        };
        Ok(match resolve_range(start, stop, list.len()) {
            Some((from, to)) => list.range(from..=to).cloned().collect(),
            None => Vec::new(),
        })
    }

    fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<()> {
        let mut keyspace = self.lock()?;
        if let Some(list) = keyspace.list_mut(key)? {
            match resolve_range(start, stop, list.len()) {
                Some((from, to)) => {
                    list.truncate(to + 1);
                    list.drain(..from);
                }
                None => list.clear(),
            }
        }
        keyspace.drop_if_empty(key);
        Ok(())
    }

    fn lrem(&self, key: &str, count: i64, value: &str) -> Result<u64> {
        let mut keyspace = self.lock()?;
        let removed = match keyspace.list_mut(key)? {
            Some(list) => {
                let limit = if count == 0 {
                    usize::MAX
                } else {
                    count.unsigned_abs() as usize
                };
                let mut matches: Vec<usize> = list
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| v.as_str() == value)
                    .map(|(i, _)| i)
                    .collect();
                if count < 0 {
                    matches.reverse();
                }
                matches.truncate(limit);
                // Remove back to front so earlier indexes stay valid
                matches.sort_unstable_by(|a, b| b.cmp(a));
                for index in &matches {
                    list.remove(*index);
                }
                matches.len() as u64
            }
            None => 0,
        };
        keyspace.drop_if_empty(key);
        Ok(removed)
    }

    fn lset(&self, key: &str, index: i64, value: &str) -> Result<()> {
        let mut keyspace = self.lock()?;
        let list = keyspace
            .list_mut(key)?
            .ok_or_else(|| TransportError::no_such_key(key))?;
        let slot = resolve_index(index, list.len())
            .and_then(|i| list.get_mut(i))
            .ok_or_else(|| {
                Error::precondition(format!("index {} out of range for list '{}'", index, key))
            })?;
        *slot = value.to_string();
        Ok(())
    }

    fn lpush(&self, key: &str, values: &[String]) -> Result<u64> {
        self.push(key, values, End::Head, true)
    }

    fn rpush(&self, key: &str, values: &[String]) -> Result<u64> {
        self.push(key, values, End::Tail, true)
    }

    fn lpushx(&self, key: &str, values: &[String]) -> Result<u64> {
        self.push(key, values, End::Head, false)
    }

    fn rpushx(&self, key: &str, values: &[String]) -> Result<u64> {
        self.push(key, values, End::Tail, false)
    }

    fn lpop(&self, key: &str) -> Result<Option<String>> {
        pop_one(&mut *self.lock()?, key, End::Head)
    }

    fn rpop(&self, key: &str) -> Result<Option<String>> {
        pop_one(&mut *self.lock()?, key, End::Tail)
    }

    fn lpop_count(&self, key: &str, count: usize) -> Result<Vec<String>> {
        pop_from(&mut *self.lock()?, key, End::Head, count)
    }

    fn rpop_count(&self, key: &str, count: usize) -> Result<Vec<String>> {
        pop_from(&mut *self.lock()?, key, End::Tail, count)
    }

    fn blpop(&self, key: &str, timeout: Option<Duration>) -> Result<Option<String>> {
        self.blocking(timeout, |keyspace| pop_one(keyspace, key, End::Head))
    }

    fn brpop(&self, key: &str, timeout: Option<Duration>) -> Result<Option<String>> {
        self.blocking(timeout, |keyspace| pop_one(keyspace, key, End::Tail))
    }

    fn rpoplpush(&self, source: &str, destination: &str) -> Result<Option<String>> {
        let moved = move_tail_to_head(&mut *self.lock()?, source, destination)?;
        if moved.is_some() {
            self.notify_pushed();
        }
        Ok(moved)
    }

    fn brpoplpush(
        &self,
        source: &str,
        destination: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<String>> {
        let moved = self.blocking(timeout, |keyspace| {
            move_tail_to_head(keyspace, source, destination)
        })?;
        if moved.is_some() {
            self.notify_pushed();
        }
        Ok(moved)
    }
}
