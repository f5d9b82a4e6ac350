//! # Integration Test Flows
//!
//! End-to-end flows across posts, threads, votes and accounts:
//!
//! 1. **Account lifecycle**: create, reject duplicates, authenticate, rotate
//! 2. **Thread lifecycle**: beacon, comments in order, votes on both kinds
//! 3. **Expiry**: a thread and its votes lapse together under a TTL
//! 4. **Development mode**: fixture data is readable through the facade

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use beacon_storage::domain::keys;
    use beacon_storage::service::fixtures::{FIXTURE_CENTER, FIXTURE_USERS};
    use beacon_storage::test_utils::{
        make_new_beacon, make_new_comment, make_test_service, TestService, ORIGIN,
    };
    use beacon_storage::{
        BeaconApiHandler, BeaconStorageApi, Credentials, KeyValueStore, StorageConfig,
        StorageError, StorageMode,
    };

    use crate::init_tracing;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn production() -> TestService {
        init_tracing();
        make_test_service(StorageConfig::new()).0
    }

    fn user_counter(service: &TestService) -> Option<Vec<u8>> {
        service.store().get(keys::USER_COUNTER).unwrap()
    }

    // =============================================================================
    // ACCOUNTS
    // =============================================================================

    #[test]
    fn test_account_scenario() {
        let service = production();

        let alice = service.create_user("alice", b"s1", "a@x.com").unwrap();
        assert_eq!(alice, 1);

        let counter_before = user_counter(&service);
        let err = service.create_user("alice", b"s9", "other@x.com").unwrap_err();
        assert!(matches!(err, StorageError::UsernameExists { .. }));
        // No ID was burned on the rejected username.
        assert_eq!(user_counter(&service), counter_before);

        let err = service.create_user("bob", b"s2", "a@x.com").unwrap_err();
        assert!(matches!(err, StorageError::EmailExists { .. }));
        // The rejected username is released again.
        assert!(!service.username_exists("bob").unwrap());
        assert_eq!(service.create_user("bob", b"s2", "b@x.com").unwrap(), 2);

        assert!(service.authenticate(alice, b"s1").unwrap());
        assert!(!service.authenticate(alice, b"s2").unwrap());
        assert!(!service.authenticate(404, b"s1").unwrap());
        assert_eq!(service.user_id_by_email("a@x.com").unwrap(), alice);
        assert_eq!(service.get_username(alice).unwrap(), "alice");

        let fresh = service.issue_secret(alice).unwrap();
        assert!(service.authenticate(alice, fresh.as_bytes()).unwrap());
        assert!(!service.authenticate(alice, b"s1").unwrap());

        let user = service.get_user(alice).unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.auth_secret, fresh.as_bytes());
    }

    // =============================================================================
    // THREADS AND VOTES
    // =============================================================================

    #[test]
    fn test_thread_lifecycle() {
        let service = production();
        let alice = service.create_user("alice", b"s1", "a@x.com").unwrap();
        let bob = service.create_user("bob", b"s2", "b@x.com").unwrap();

        let beacon = service.add_beacon(make_new_beacon(alice, ORIGIN)).unwrap();
        assert!(service.get_thread(beacon).unwrap().comments.is_empty());

        let texts = ["first", "second", "third"];
        let ids: Vec<_> = texts
            .iter()
            .map(|text| {
                service
                    .add_comment(make_new_comment(beacon, bob, text))
                    .unwrap()
            })
            .collect();

        let thread = service.get_thread(beacon).unwrap();
        let got: Vec<_> = thread.comments.iter().map(|c| c.id).collect();
        assert_eq!(got, ids);
        assert!(thread.comments.iter().all(|c| c.beacon_id == beacon));
        assert_eq!(service.comment_count(beacon).unwrap(), 3);

        // Hearts on a beacon and on a comment use the same ledger.
        for post in [beacon, ids[1]] {
            service.heart(post, bob).unwrap();
            assert!(service.has_hearted(post, bob).unwrap());
            assert!(matches!(
                service.heart(post, bob),
                Err(StorageError::AlreadyVoted { .. })
            ));
        }
        let thread = service.get_thread(beacon).unwrap();
        assert_eq!(thread.hearts, 1);
        assert_eq!(thread.comments[1].hearts, 1);
        assert_eq!(thread.comments[0].hearts, 0);

        service.unheart(beacon, bob).unwrap();
        assert!(!service.has_hearted(beacon, bob).unwrap());
        assert!(matches!(
            service.unheart(beacon, bob),
            Err(StorageError::NotVoted { .. })
        ));
        assert_eq!(service.get_beacon(beacon).unwrap().hearts, 0);

        service.flag(beacon, alice).unwrap();
        assert!(service.has_flagged(beacon, alice).unwrap());
        assert_eq!(service.get_beacon(beacon).unwrap().flags, 1);
    }

    #[test]
    fn test_handler_over_shared_service() {
        let service = Arc::new(production());
        let alice = service.create_user("alice", b"s1", "a@x.com").unwrap();
        let handler = BeaconApiHandler::new(Arc::clone(&service));

        let beacon = service.add_beacon(make_new_beacon(alice, ORIGIN)).unwrap();
        let creds = Credentials::new(alice, "s1");
        assert!(handler.handle_heart(&creds, beacon).is_success());

        let response = handler.handle_get_thread(beacon, Some(&creds));
        assert_eq!(response.body["hearts"], 1);
        assert_eq!(response.body["hearted"], true);
        assert_eq!(response.body["username"], "alice");
    }

    // =============================================================================
    // EXPIRY
    // =============================================================================

    #[test]
    fn test_thread_expires_with_votes() {
        init_tracing();
        let ttl = Duration::from_secs(3600);
        let (service, clock) = make_test_service(StorageConfig::test().with_post_ttl(ttl));

        let beacon = service.add_beacon(make_new_beacon(1, ORIGIN)).unwrap();
        service.heart(beacon, 2).unwrap();

        clock.advance(Duration::from_secs(1800));
        // A new comment keeps the whole thread alive.
        service
            .add_comment(make_new_comment(beacon, 3, "still here"))
            .unwrap();

        clock.advance(Duration::from_secs(3000));
        let thread = service.get_thread(beacon).unwrap();
        assert_eq!(thread.comments.len(), 1);
        assert!(service.has_hearted(beacon, 2).unwrap());

        clock.advance(ttl);
        assert!(service.get_thread(beacon).unwrap_err().is_not_found());
        assert!(!service.has_hearted(beacon, 2).unwrap());
        assert!(service.beacons_within(ORIGIN, 10.0).unwrap().is_empty());
    }

    // =============================================================================
    // MODES
    // =============================================================================

    #[test]
    fn test_development_fixtures_readable() {
        init_tracing();
        let (service, _clock) = make_test_service(StorageConfig::development());
        assert_eq!(service.config().mode, StorageMode::Development);

        let nearby = service.beacons_within(FIXTURE_CENTER, 5.0).unwrap();
        assert!(!nearby.is_empty());
        for beacon in &nearby {
            let thread = service.get_thread(beacon.id).unwrap();
            for comment in &thread.comments {
                assert_eq!(comment.beacon_id, beacon.id);
                assert!(service.get_username(comment.poster_id).is_ok());
            }
        }
        for (username, _, email) in FIXTURE_USERS {
            assert!(service.username_exists(username).unwrap());
            assert!(service.email_exists(email).unwrap());
        }

        // Development mode skips secret checks for known users only.
        let id = service.user_id_by_email(FIXTURE_USERS[0].2).unwrap();
        assert!(service.authenticate(id, b"anything").unwrap());
        assert!(!service.authenticate(9_999, b"anything").unwrap());

        service.flush_namespace().unwrap();
        assert!(service.beacons_within(FIXTURE_CENTER, 5.0).unwrap().is_empty());
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let service = production();
        let beacon = service.add_beacon(make_new_beacon(1, ORIGIN)).unwrap();

        service.select_namespace(7).unwrap();
        assert!(service.get_beacon(beacon).unwrap_err().is_not_found());
        assert_eq!(service.add_beacon(make_new_beacon(1, ORIGIN)).unwrap(), 1);

        service.select_namespace(0).unwrap();
        assert_eq!(service.get_beacon(beacon).unwrap().id, beacon);
        assert!(service.flush_namespace().is_err());
    }
}
