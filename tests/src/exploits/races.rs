//! # Concurrent Request Races
//!
//! | Attack | Target | Expected |
//! |--------|--------|----------|
//! | Double heart | VoteLedger | Counter moves by exactly one |
//! | Heart/unheart flapping | VoteLedger | Counter equals vote-set size |
//! | Username squatting | UserStore | One account per username |
//! | Email squatting | UserStore | One account per email, loser's name released |
//! | ID stampede | IDAllocator | Every post gets a distinct ID |

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier};
    use std::thread;

    use beacon_storage::test_utils::{make_new_beacon, make_test_service, TestService, ORIGIN};
    use beacon_storage::{BeaconStorageApi, StorageConfig, StorageError};
    use parking_lot::Mutex;

    use crate::init_tracing;

    const THREADS: usize = 16;

    fn shared_service() -> Arc<TestService> {
        init_tracing();
        Arc::new(make_test_service(StorageConfig::test()).0)
    }

    /// Run `op` on `THREADS` threads released at the same instant.
    fn stampede<T, F>(service: &Arc<TestService>, op: F) -> Vec<T>
    where
        T: Send + 'static,
        F: Fn(&TestService, usize) -> T + Send + Sync + 'static,
    {
        let barrier = Arc::new(Barrier::new(THREADS));
        let op = Arc::new(op);
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let service = Arc::clone(service);
                let barrier = Arc::clone(&barrier);
                let op = Arc::clone(&op);
                thread::spawn(move || {
                    barrier.wait();
                    op(&service, i)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    }

    #[test]
    fn test_double_heart_counts_once() {
        let service = shared_service();
        let beacon = service.add_beacon(make_new_beacon(1, ORIGIN)).unwrap();

        let results = stampede(&service, move |s, _| s.heart(beacon, 42));

        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, StorageError::AlreadyVoted { .. })));
        assert_eq!(service.get_beacon(beacon).unwrap().hearts, 1);
    }

    #[test]
    fn test_heart_flapping_keeps_counter_consistent() {
        let service = shared_service();
        let beacon = service.add_beacon(make_new_beacon(1, ORIGIN)).unwrap();

        stampede(&service, move |s, i| {
            let user = (i % 4) as u64 + 100;
            for round in 0..50 {
                let _ = if (round + i) % 2 == 0 {
                    s.heart(beacon, user)
                } else {
                    s.unheart(beacon, user)
                };
            }
        });

        let hearted = (100..104)
            .filter(|user| service.has_hearted(beacon, *user).unwrap())
            .count();
        assert_eq!(service.get_beacon(beacon).unwrap().hearts as usize, hearted);
    }

    #[test]
    fn test_username_squatting() {
        let service = shared_service();

        let results = stampede(&service, |s, i| {
            s.create_user("popular", b"secret", &format!("user{}@x.com", i))
        });

        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, StorageError::UsernameExists { .. })));

        // Exactly one email got claimed, and it belongs to the winner.
        let claimed: Vec<_> = (0..THREADS)
            .filter(|i| service.email_exists(&format!("user{}@x.com", i)).unwrap())
            .collect();
        assert_eq!(claimed.len(), 1);
        assert_eq!(service.get_username(*winners[0]).unwrap(), "popular");
    }

    #[test]
    fn test_email_squatting() {
        let service = shared_service();

        let results = stampede(&service, |s, i| {
            s.create_user(&format!("user{}", i), b"secret", "shared@x.com")
        });

        let winners: Vec<_> = results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_ok())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(winners.len(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, StorageError::EmailExists { .. })));

        // Losers do not keep their usernames reserved.
        for i in 0..THREADS {
            let reserved = service.username_exists(&format!("user{}", i)).unwrap();
            assert_eq!(reserved, winners.contains(&i), "user{}", i);
        }
    }

    #[test]
    fn test_id_stampede_yields_distinct_ids() {
        let service = shared_service();
        let seen = Arc::new(Mutex::new(HashSet::new()));

        let collector = Arc::clone(&seen);
        stampede(&service, move |s, i| {
            for _ in 0..25 {
                let id = s.add_beacon(make_new_beacon(i as u64, ORIGIN)).unwrap();
                assert!(collector.lock().insert(id), "duplicate id {}", id);
            }
        });

        let seen = seen.lock();
        assert_eq!(seen.len(), THREADS * 25);
        assert_eq!(seen.iter().max().copied(), Some((THREADS * 25) as u64));
    }
}
