//! # Integration Test Flows
//!
//! End-to-end paths through the public API:
//!
//! 1. **Connect → broadcast**: a source connected through a container
//!    receives operations with arguments in packed order
//! 2. **Default-registry lookup**: wildcard and exact lookups under both
//!    lookup policies
//! 3. **Disconnect**: removed sources stop receiving, handles stay unique
//! 4. **Deadline dispatch**: slow subscribers are skipped at the deadline,
//!    a failing subscriber still stops dispatch

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use cp_registry::{
        connect, disconnect, subscriber_fn, Broadcaster, BusConfig, BusConfigBuilder,
        CapabilityContainer, LookupPolicy, Subscriber, SubscriberRef,
    };
    use cp_types::{
        pack_args, ArgKind, ArgumentPacker, CapabilityId, ConnectionError, OperationId,
        PackedArguments, SubscriberError, SubscriptionHandle, Variant,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// One observed call: operation plus arguments in packed order.
    type Call = (OperationId, Vec<Variant>);

    /// Records every call it receives.
    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<Call>>,
        /// `args()` was `None` for the call at the same index.
        absent: Mutex<Vec<bool>>,
    }

    #[async_trait]
    impl Subscriber for RecordingSink {
        async fn invoke(
            &self,
            operation: OperationId,
            args: &PackedArguments<'_>,
        ) -> Result<(), SubscriberError> {
            self.calls
                .lock()
                .push((operation, args.iter().cloned().collect()));
            self.absent.lock().push(args.args().is_none());
            Ok(())
        }
    }

    impl RecordingSink {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }
    }

    /// Sleeps before answering.
    struct SlowSink {
        delay: Duration,
    }

    #[async_trait]
    impl Subscriber for SlowSink {
        async fn invoke(
            &self,
            _operation: OperationId,
            _args: &PackedArguments<'_>,
        ) -> Result<(), SubscriberError> {
            tokio::time::sleep(self.delay).await;
            Ok(())
        }
    }

    fn recording() -> (Arc<RecordingSink>, SubscriberRef) {
        let sink = Arc::new(RecordingSink::default());
        let as_ref: SubscriberRef = sink.clone();
        (sink, as_ref)
    }

    // =============================================================================
    // CONNECT → BROADCAST
    // =============================================================================

    #[tokio::test]
    async fn test_sink_receives_empty_then_packed_operation() {
        crate::init_test_logging();

        let container = CapabilityContainer::new();
        let (sink, source) = recording();
        let connected = connect(Some(source), CapabilityId::Wildcard, &container);
        assert_eq!(connected.handle, SubscriptionHandle::new(1));

        let broadcaster = Broadcaster::default();

        // Operation without arguments: list is absent, not an empty slice
        broadcaster
            .invoke(&connected.registry, OperationId(0xa0), &PackedArguments::empty())
            .await
            .unwrap();

        // Operation with two arguments: last supplied lands at index 0
        let magic = 0xdead_beef_u32 as i32;
        let mut buf = vec![Variant::Empty; 2];
        let packed = pack_args!(buf, magic, "Deadbeef").unwrap();
        broadcaster
            .invoke(&connected.registry, OperationId(0xa1), &packed)
            .await
            .unwrap();

        let calls = sink.calls();
        assert_eq!(calls.len(), 2);

        assert_eq!(calls[0].0, OperationId(0xa0));
        assert!(calls[0].1.is_empty());

        assert_eq!(calls[1].0, OperationId(0xa1));
        assert_eq!(calls[1].1[0].kind(), ArgKind::Str);
        assert_eq!(calls[1].1[0].as_str(), Some("Deadbeef"));
        assert_eq!(calls[1].1[1].kind(), ArgKind::I4);
        assert_eq!(calls[1].1[1].as_i4(), Some(magic));

        assert_eq!(*sink.absent.lock(), vec![true, false]);
    }

    #[tokio::test]
    async fn test_every_live_sink_called_in_handle_order() {
        let container = CapabilityContainer::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for tag in 0..3_u32 {
            let order = order.clone();
            let source = subscriber_fn(move |_, _| {
                order.lock().push(tag);
                Ok(())
            });
            handles.push(connect(Some(source), CapabilityId::Dispatch, &container).handle);
        }

        let registry = container.find_or_create(CapabilityId::Dispatch);
        Broadcaster::default()
            .invoke(&registry, OperationId(1), &PackedArguments::empty())
            .await
            .unwrap();

        assert_eq!(*order.lock(), vec![0, 1, 2]);
        assert_eq!(
            handles,
            vec![
                SubscriptionHandle::new(1),
                SubscriptionHandle::new(2),
                SubscriptionHandle::new(3)
            ]
        );
    }

    #[tokio::test]
    async fn test_null_source_skipped_by_broadcast() {
        let container = CapabilityContainer::new();
        let null = connect(None, CapabilityId::Wildcard, &container);
        let (sink, source) = recording();
        let live = connect(Some(source), CapabilityId::Wildcard, &container);

        assert_eq!(null.handle, SubscriptionHandle::new(1));
        assert_eq!(live.handle, SubscriptionHandle::new(2));
        assert_eq!(live.registry.len(), 2);

        Broadcaster::default()
            .invoke(&live.registry, OperationId(7), &PackedArguments::empty())
            .await
            .unwrap();
        assert_eq!(sink.calls().len(), 1);

        // The null slot can still be released like any other
        live.registry.unadvise(null.handle).unwrap();
        assert_eq!(live.registry.len(), 1);
    }

    #[tokio::test]
    async fn test_failing_sink_stops_broadcast() {
        let container = CapabilityContainer::new();
        let (before, first) = recording();
        let (after, last) = recording();

        connect(Some(first), CapabilityId::Dispatch, &container);
        let failing = connect(
            Some(subscriber_fn(|_, _| Err(SubscriberError::failed("rejected")))),
            CapabilityId::Dispatch,
            &container,
        );
        connect(Some(last), CapabilityId::Dispatch, &container);

        let broadcaster = Broadcaster::default();
        let err = broadcaster
            .invoke(&failing.registry, OperationId(2), &PackedArguments::empty())
            .await
            .unwrap_err();

        match err {
            ConnectionError::SubscriberFailure { handle, source } => {
                assert_eq!(handle, failing.handle);
                assert_eq!(source.code, SubscriberError::E_FAIL);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(before.calls().len(), 1);
        assert!(after.calls().is_empty());

        let snapshot = broadcaster.metrics().snapshot();
        assert_eq!(snapshot.broadcasts, 1);
        assert_eq!(snapshot.deliveries, 1);
        assert_eq!(snapshot.failures, 1);
    }

    #[tokio::test]
    async fn test_object_argument_reaches_sink_by_identity() {
        let container = CapabilityContainer::new();
        let (sink, source) = recording();
        let connected = connect(Some(source), CapabilityId::Wildcard, &container);

        let payload = Arc::new(String::from("shared"));
        let mut buf = vec![Variant::Empty; 1];
        let packed =
            ArgumentPacker::pack(Some(&mut buf[..]), vec![Variant::dispatch(payload.clone())])
                .unwrap();

        Broadcaster::default()
            .invoke(&connected.registry, OperationId(3), &packed)
            .await
            .unwrap();

        let calls = sink.calls();
        let object = calls[0].1[0].as_object().unwrap();
        let received = object.clone().downcast::<String>().unwrap();
        assert!(Arc::ptr_eq(&received, &payload));
    }

    // =============================================================================
    // LOOKUP POLICY
    // =============================================================================

    #[test]
    fn test_compatible_lookup_shares_default_registry() {
        let container = CapabilityContainer::new();
        let custom = CapabilityId::Custom(uuid::Uuid::new_v4());

        let exact = connect(
            Some(subscriber_fn(|_, _| Ok(()))),
            custom,
            &container,
        );
        let wildcard = connect(
            Some(subscriber_fn(|_, _| Ok(()))),
            CapabilityId::Wildcard,
            &container,
        );

        // Wildcard resolves to the first registry ever created
        assert!(Arc::ptr_eq(&exact.registry, &wildcard.registry));
        assert_eq!(exact.registry.capability(), custom);
        assert_eq!(wildcard.handle, SubscriptionHandle::new(2));
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_compatible_exact_dispatch_not_merged_with_wildcard_default() {
        let container = CapabilityContainer::new();

        let wildcard = connect(None, CapabilityId::Wildcard, &container);
        let dispatch = connect(None, CapabilityId::Dispatch, &container);

        assert!(!Arc::ptr_eq(&wildcard.registry, &dispatch.registry));
        assert_eq!(wildcard.registry.capability(), CapabilityId::Dispatch);
        assert_eq!(dispatch.registry.capability(), CapabilityId::Dispatch);
        assert_eq!(dispatch.handle, SubscriptionHandle::new(1));
        assert_eq!(container.len(), 2);
    }

    #[test]
    fn test_isolated_lookup_separates_capabilities() {
        let config = BusConfigBuilder::new()
            .lookup_policy(LookupPolicy::Isolated)
            .build()
            .unwrap();
        let container = CapabilityContainer::from_config(&config);
        let custom = CapabilityId::Custom(uuid::Uuid::new_v4());

        let exact = connect(None, custom, &container);
        let wildcard = connect(None, CapabilityId::Wildcard, &container);
        let dispatch = connect(None, CapabilityId::Dispatch, &container);

        assert!(!Arc::ptr_eq(&exact.registry, &wildcard.registry));
        assert!(Arc::ptr_eq(&wildcard.registry, &dispatch.registry));
        assert_eq!(wildcard.registry.capability(), CapabilityId::Dispatch);
        assert_eq!(container.len(), 2);

        // Handles are per registry
        assert_eq!(exact.handle, SubscriptionHandle::new(1));
        assert_eq!(wildcard.handle, SubscriptionHandle::new(1));
        assert_eq!(dispatch.handle, SubscriptionHandle::new(2));
    }

    #[test]
    fn test_registry_knows_its_container() {
        let container = CapabilityContainer::new();
        let connected = connect(None, CapabilityId::PropertyNotify, &container);

        let owner = connected.registry.container().unwrap();
        assert!(Arc::ptr_eq(&owner, &container));

        let listed: Vec<_> = container.enumerate().collect();
        assert_eq!(listed.len(), 1);
        assert!(Arc::ptr_eq(&listed[0], &connected.registry));
    }

    // =============================================================================
    // DISCONNECT
    // =============================================================================

    #[tokio::test]
    async fn test_disconnected_sink_no_longer_called() {
        let container = CapabilityContainer::new();
        let (gone, first) = recording();
        let (kept, second) = recording();

        let a = connect(Some(first), CapabilityId::Wildcard, &container);
        let b = connect(Some(second), CapabilityId::Wildcard, &container);

        let registry = disconnect(CapabilityId::Wildcard, &container, a.handle).unwrap();
        Broadcaster::default()
            .invoke(&registry, OperationId(4), &PackedArguments::empty())
            .await
            .unwrap();

        assert!(gone.calls().is_empty());
        assert_eq!(kept.calls().len(), 1);

        // A fresh connection never reuses the released handle
        let c = connect(None, CapabilityId::Wildcard, &container);
        assert_eq!(c.handle, SubscriptionHandle::new(3));
        assert_eq!(registry.highest_handle(), Some(SubscriptionHandle::new(3)));

        let err = disconnect(CapabilityId::Wildcard, &container, a.handle).unwrap_err();
        assert_eq!(err, ConnectionError::NotFound { handle: a.handle });
        assert_ne!(b.handle, c.handle);
    }

    #[test]
    fn test_unadvise_rejects_unknown_handles() {
        let container = CapabilityContainer::new();
        let connected = connect(None, CapabilityId::Wildcard, &container);

        for raw in [0_u64, 2, u64::MAX] {
            let handle = SubscriptionHandle::new(raw);
            assert_eq!(
                connected.registry.unadvise(handle),
                Err(ConnectionError::NotFound { handle })
            );
        }
        assert_eq!(connected.registry.len(), 1);
    }

    // =============================================================================
    // DEADLINE DISPATCH
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_deadline_dispatch_skips_slow_stops_on_error() {
        let config = BusConfig {
            invoke_timeout_ms: 50,
            ..Default::default()
        };
        config.validate().unwrap();

        let container = CapabilityContainer::from_config(&config);
        let broadcaster = Broadcaster::new(config);

        let slow = connect(
            Some(Arc::new(SlowSink {
                delay: Duration::from_secs(1),
            }) as SubscriberRef),
            CapabilityId::Dispatch,
            &container,
        );
        let (reached, before) = recording();
        connect(Some(before), CapabilityId::Dispatch, &container);
        let failing = connect(
            Some(subscriber_fn(|_, _| Err(SubscriberError::new(-1, "bad")))),
            CapabilityId::Dispatch,
            &container,
        );
        let (skipped, after) = recording();
        connect(Some(after), CapabilityId::Dispatch, &container);

        let report = broadcaster
            .invoke_with_default_deadline(&slow.registry, OperationId(5), &PackedArguments::empty())
            .await;

        // Timeout moves on, the subscriber error ends dispatch
        assert_eq!(report.delivered, 1);
        assert_eq!(report.timeouts(), 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].handle(), Some(slow.handle));
        assert_eq!(report.failures[1].handle(), Some(failing.handle));
        assert_eq!(reached.calls().len(), 1);
        assert!(skipped.calls().is_empty());

        let snapshot = broadcaster.metrics().snapshot();
        assert_eq!(snapshot.timeouts, 1);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.deliveries, 1);

        assert!(matches!(
            report.into_result(),
            Err(ConnectionError::Timeout { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_dispatch_all_in_time() {
        let container = CapabilityContainer::new();
        let fast = connect(
            Some(Arc::new(SlowSink {
                delay: Duration::from_millis(10),
            }) as SubscriberRef),
            CapabilityId::Wildcard,
            &container,
        );

        let report = Broadcaster::default()
            .invoke_with_deadline(
                &fast.registry,
                OperationId(6),
                &PackedArguments::empty(),
                Duration::from_millis(100),
            )
            .await;

        assert!(report.is_success());
        assert_eq!(report.into_result(), Ok(1));
    }
}
