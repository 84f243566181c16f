//! Work queue built on lists
//!
//! Producers push jobs, consumers take them with blocking pops and park
//! them on a processing list with `pop_and_requeue` until acknowledged.

use super::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::thread;
use std::time::Duration;
use typedkv::{Error, MaxWait};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct Job {
    id: u32,
    kind: String,
}

fn job(id: u32) -> Job {
    Job {
        id,
        kind: "resize".into(),
    }
}

#[test]
fn reliable_queue_moves_jobs_through_processing() {
    let (_, conn) = connect();
    let lists = conn.lists();
    lists.left_push_all("jobs", (1..=3).map(job)).unwrap();

    // Oldest job sits at the tail.
    let taken: Job = lists.pop_and_requeue("jobs", "processing").unwrap().unwrap();
    assert_eq!(taken.id, 1);
    assert_eq!(lists.size("processing").unwrap(), 1);

    // Acknowledge.
    assert_eq!(lists.remove_first("processing", &taken).unwrap(), 1);
    assert_eq!(lists.size("processing").unwrap(), 0);
    assert_eq!(lists.size("jobs").unwrap(), 2);
}

#[test]
fn blocking_consumers_each_get_distinct_jobs() {
    let (store, _) = connect();
    let conn = Arc::new(Connection::from_store(store));

    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let conn = Arc::clone(&conn);
            thread::spawn(move || {
                let mut seen = Vec::new();
                while let Some(job) = conn
                    .lists()
                    .right_pop_blocking::<Job>("jobs", Duration::from_millis(200))
                    .unwrap()
                {
                    seen.push(job.id);
                }
                seen
            })
        })
        .collect();

    for id in 0..40 {
        conn.lists().left_push("jobs", &job(id)).unwrap();
    }

    let mut all: Vec<u32> = consumers
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    all.sort_unstable();
    assert_eq!(all, (0..40).collect::<Vec<_>>());
}

#[test]
fn blocking_requeue_waits_for_producer() {
    let (store, conn) = connect();
    let producer = Connection::from_store(store);
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        producer.lists().right_push("jobs", &job(9)).unwrap();
    });

    let moved: Option<Job> = conn
        .lists()
        .pop_and_requeue_blocking("jobs", "processing", Duration::from_secs(2))
        .unwrap();
    handle.join().unwrap();
    assert_eq!(moved, Some(job(9)));
    assert_eq!(conn.lists().range_all::<Job>("processing").unwrap(), vec![job(9)]);
}

#[test]
fn unbounded_wait_is_opt_in() {
    let (_, conn) = connect();
    let err = conn
        .lists()
        .left_pop_blocking::<Job>("jobs", MaxWait::Unbounded)
        .unwrap_err();
    assert!(matches!(err, Error::PreconditionError(_)));
}

#[test]
fn closing_the_store_wakes_unbounded_waiters() {
    let (store, conn) = connect_with(FacadeConfig::new().with_unbounded_blocking());
    let conn = Arc::new(conn);
    let waiter = {
        let conn = Arc::clone(&conn);
        thread::spawn(move || conn.lists().left_pop_blocking::<Job>("jobs", MaxWait::Unbounded))
    };
    thread::sleep(Duration::from_millis(30));
    store.close();
    let result = waiter.join().unwrap();
    assert!(result.unwrap_err().is_transport());
}

#[test]
fn batch_pop_drains_in_order() {
    let (store, conn) = connect();
    conn.lists().right_push_all("jobs", (0..5).map(job)).unwrap();
    let batch: Vec<Job> = conn.lists().left_pop_count("jobs", 3).unwrap();
    assert_eq!(batch.iter().map(|j| j.id).collect::<Vec<_>>(), vec![0, 1, 2]);
    let rest: Vec<Job> = conn.lists().right_pop_count("jobs", 10).unwrap();
    let ids: HashSet<u32> = rest.iter().map(|j| j.id).collect();
    assert_eq!(ids, HashSet::from([3, 4]));
    assert!(store.is_empty());
}
