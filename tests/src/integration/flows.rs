//! # Creation Flows
//!
//! Creation paths, registry bookkeeping and the one-network-per-token rule,
//! driven through `NetworkFactoryApi`.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use lsd_network_factory::{
        topics, ComponentKind, DeterministicDeployer, FactoryError, FactoryEvent,
        FactoryEventPublisher, FactoryServiceConfig, IdentityToken, ManualChainContext,
        NetworkFactoryApi, NetworkFactoryService,
    };
    use lsd_shared_types::{compute_contract_address, Address};
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    // =========================================================================
    // UNIQUENESS
    // =========================================================================

    #[tokio::test]
    async fn test_authorized_token_backs_exactly_one_network() {
        let h = initialized().await;
        let token = IdentityToken::new(Address::repeat_byte(0x70), "Existing", "EXT");
        h.factory.add_authorized_token(ADMIN, token.clone()).await.unwrap();

        let bundle = h
            .factory
            .create_instance_with_token(CREATOR, token.address, NETWORK_ADMIN, vec![voter(1)], 1)
            .await
            .unwrap();
        assert_eq!(bundle.token, token);

        let second = h
            .factory
            .create_instance_with_token(CREATOR, token.address, NETWORK_ADMIN, vec![voter(1)], 1)
            .await;
        assert_eq!(second, Err(FactoryError::TokenAlreadyUsed(token.address)));
        assert!(second.unwrap_err().is_permanent());

        // The first bundle is untouched
        assert_eq!(h.factory.bundle_of(token.address).await.unwrap(), bundle);
        assert_eq!(h.factory.total_instances().await, 1);
    }

    #[tokio::test]
    async fn test_unauthorized_token_rejected() {
        let h = initialized().await;
        let result = h
            .factory
            .create_instance_with_token(CREATOR, Address::repeat_byte(0x71), NETWORK_ADMIN, vec![voter(1)], 1)
            .await;
        assert_eq!(result, Err(FactoryError::TokenNotAuthorized(Address::repeat_byte(0x71))));
    }

    #[tokio::test]
    async fn test_same_name_twice_gives_distinct_networks() {
        let h = initialized().await;
        let mut tokens = Vec::new();
        for _ in 0..2 {
            tokens.push(
                h.factory
                    .create_instance(
                        CREATOR,
                        "X".into(),
                        "X".into(),
                        NETWORK_ADMIN,
                        vec![voter(1), voter(2)],
                        2,
                    )
                    .await
                    .unwrap(),
            );
        }

        assert_ne!(tokens[0].address, tokens[1].address);
        let a = h.factory.bundle_of(tokens[0].address).await.unwrap();
        let b = h.factory.bundle_of(tokens[1].address).await.unwrap();
        assert_ne!(a.governance, b.governance);
        assert_ne!(a.fee_pool, b.fee_pool);

        let created = h.factory.instances_of(CREATOR).await;
        assert_eq!(created.len(), 2);
        assert_eq!(created, tokens);
    }

    #[tokio::test]
    async fn test_minted_tokens_follow_factory_nonce() {
        let h = initialized().await;
        let factory_address = h.factory.config().factory_address;
        for nonce in 0..3u64 {
            let token = h
                .factory
                .create_instance(CREATOR, "Net".into(), "NET".into(), NETWORK_ADMIN, vec![voter(1)], 1)
                .await
                .unwrap();
            assert_eq!(token.address, compute_contract_address(factory_address, nonce));
        }
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    #[tokio::test]
    async fn test_threshold_bounds_leave_no_entry() {
        let h = initialized().await;
        for threshold in [0usize, 3] {
            let result = h
                .factory
                .create_instance(
                    CREATOR,
                    "Net".into(),
                    "NET".into(),
                    NETWORK_ADMIN,
                    vec![voter(1), voter(2)],
                    threshold,
                )
                .await;
            assert_eq!(
                result,
                Err(FactoryError::InvalidThreshold {
                    threshold,
                    voters: 2
                })
            );
        }
        assert!(h.factory.instances_of(CREATOR).await.is_empty());
        assert_eq!(h.factory.total_instances().await, 0);
    }

    #[tokio::test]
    async fn test_empty_voters_rejected() {
        let h = initialized().await;
        let result = h
            .factory
            .create_instance(CREATOR, "Net".into(), "NET".into(), NETWORK_ADMIN, vec![], 1)
            .await;
        assert_eq!(result, Err(FactoryError::EmptyVoters));
    }

    #[tokio::test]
    async fn test_duplicate_voter_rejected() {
        let h = initialized().await;
        let result = h
            .factory
            .create_instance(
                CREATOR,
                "Net".into(),
                "NET".into(),
                NETWORK_ADMIN,
                vec![voter(1), voter(1)],
                1,
            )
            .await;
        assert!(matches!(result, Err(FactoryError::Governance(_))));
    }

    #[tokio::test]
    async fn test_operations_before_initialize() {
        let h = harness_with(DeterministicDeployer::new());
        assert_eq!(
            h.factory
                .create_instance_with_entrusted_voters(CREATOR, "Net".into(), "NET".into(), NETWORK_ADMIN)
                .await,
            Err(FactoryError::NotInitialized)
        );
        assert_eq!(
            h.factory.set_entrusted_voters(ADMIN, vec![voter(1)], 1).await,
            Err(FactoryError::NotInitialized)
        );
        assert_eq!(h.factory.admin().await, Err(FactoryError::NotInitialized));
    }

    // =========================================================================
    // ENTRUSTED VOTERS
    // =========================================================================

    #[tokio::test]
    async fn test_entrusted_creation_needs_voters() {
        let h = initialized().await;
        assert_eq!(
            h.factory
                .create_instance_with_entrusted_voters(CREATOR, "Net".into(), "NET".into(), NETWORK_ADMIN)
                .await,
            Err(FactoryError::EmptyEntrustedVoters)
        );
    }

    #[tokio::test]
    async fn test_entrusted_creation_uses_configured_set() {
        let h = initialized().await;
        h.factory
            .set_entrusted_voters(ADMIN, vec![voter(1)], 1)
            .await
            .unwrap();

        let token = h
            .factory
            .create_instance_with_entrusted_voters(CREATOR, "Net".into(), "NET".into(), NETWORK_ADMIN)
            .await
            .unwrap();
        let governance = h.factory.governance_of(token.address).await.unwrap();
        assert_eq!(governance.voters(), &[voter(1)]);
        assert_eq!(governance.threshold(), 1);
    }

    #[tokio::test]
    async fn test_entrusted_set_change_only_affects_new_networks() {
        let h = initialized().await;
        h.factory
            .set_entrusted_voters(ADMIN, vec![voter(1)], 1)
            .await
            .unwrap();
        let first = h
            .factory
            .create_instance_with_entrusted_voters(CREATOR, "A".into(), "A".into(), NETWORK_ADMIN)
            .await
            .unwrap();

        h.factory
            .set_entrusted_voters(ADMIN, vec![voter(2), voter(3)], 2)
            .await
            .unwrap();
        let second = h
            .factory
            .create_instance_with_entrusted_voters(CREATOR, "B".into(), "B".into(), NETWORK_ADMIN)
            .await
            .unwrap();

        let g1 = h.factory.governance_of(first.address).await.unwrap();
        let g2 = h.factory.governance_of(second.address).await.unwrap();
        assert_eq!(g1.voters(), &[voter(1)]);
        assert_eq!(g2.voters(), &[voter(2), voter(3)]);
    }

    // =========================================================================
    // REGISTRY
    // =========================================================================

    #[tokio::test]
    async fn test_instances_of_keeps_order_per_creator() {
        let h = initialized().await;
        let other = Address::repeat_byte(0xc2);

        let a = h
            .factory
            .create_instance(CREATOR, "A".into(), "A".into(), NETWORK_ADMIN, vec![voter(1)], 1)
            .await
            .unwrap();
        let b = h
            .factory
            .create_instance(other, "B".into(), "B".into(), NETWORK_ADMIN, vec![voter(1)], 1)
            .await
            .unwrap();
        let c = h
            .factory
            .create_instance(CREATOR, "C".into(), "C".into(), NETWORK_ADMIN, vec![voter(1)], 1)
            .await
            .unwrap();

        assert_eq!(h.factory.instances_of(CREATOR).await, vec![a, c]);
        assert_eq!(h.factory.instances_of(other).await, vec![b]);
        assert!(h.factory.instances_of(Address::repeat_byte(0x99)).await.is_empty());
    }

    #[tokio::test]
    async fn test_bundle_components_are_distinct_and_non_zero() {
        let h = initialized().await;
        let token = h
            .factory
            .create_instance(CREATOR, "Net".into(), "NET".into(), NETWORK_ADMIN, vec![voter(1)], 1)
            .await
            .unwrap();
        let bundle = h.factory.bundle_of(token.address).await.unwrap();

        let components = bundle.components();
        assert_eq!(components.len(), ComponentKind::BUNDLE.len());
        let unique: BTreeSet<Address> = components.iter().map(|(_, a)| *a).collect();
        assert_eq!(unique.len(), components.len());
        assert!(unique.iter().all(|a| !a.is_zero()));
        assert_eq!(bundle.external_deposit_target, DEPOSIT_TARGET);
        assert_eq!(bundle.admin, NETWORK_ADMIN);
    }

    #[tokio::test]
    async fn test_bundle_of_unknown_token() {
        let h = initialized().await;
        assert_eq!(
            h.factory.bundle_of(Address::repeat_byte(0x42)).await,
            Err(FactoryError::NotFound(Address::repeat_byte(0x42)))
        );
    }

    // =========================================================================
    // ATOMICITY
    // =========================================================================

    #[tokio::test]
    async fn test_failed_component_deploy_leaves_no_trace() {
        let h = harness_with(DeterministicDeployer::new().rejecting(ComponentKind::NetworkWithdraw));
        h.factory.initialize(ADMIN, init_params()).await.unwrap();
        let mut events = h.bus.subscribe();

        let result = h
            .factory
            .create_instance(CREATOR, "Net".into(), "NET".into(), NETWORK_ADMIN, vec![voter(1)], 1)
            .await;
        assert!(matches!(result, Err(FactoryError::Deployment(_))));

        assert_eq!(h.factory.total_instances().await, 0);
        assert!(h.factory.instances_of(CREATOR).await.is_empty());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_mint_leaves_no_trace() {
        let h = harness_with(DeterministicDeployer::new().rejecting_mints());
        h.factory.initialize(ADMIN, init_params()).await.unwrap();

        let result = h
            .factory
            .create_instance(CREATOR, "Net".into(), "NET".into(), NETWORK_ADMIN, vec![voter(1)], 1)
            .await;
        assert!(matches!(result, Err(FactoryError::Deployment(_))));
        assert_eq!(h.factory.total_instances().await, 0);
        assert_eq!(h.factory.stats().rejected_operations, 1);
    }

    #[tokio::test]
    async fn test_template_change_applies_to_new_networks_only() {
        let h = initialized().await;
        let first = h
            .factory
            .create_instance(CREATOR, "A".into(), "A".into(), NETWORK_ADMIN, vec![voter(1)], 1)
            .await
            .unwrap();
        let before = h.factory.bundle_of(first.address).await.unwrap();

        let mut updated = templates();
        updated.fee_pool = Address::repeat_byte(0x21);
        h.factory.set_logic_templates(ADMIN, updated).await.unwrap();

        assert_eq!(h.factory.bundle_of(first.address).await.unwrap(), before);
        let second = h
            .factory
            .create_instance(CREATOR, "B".into(), "B".into(), NETWORK_ADMIN, vec![voter(1)], 1)
            .await
            .unwrap();
        assert!(h.factory.bundle_of(second.address).await.is_ok());
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[tokio::test]
    async fn test_creation_emits_network_created() {
        let h = initialized().await;
        let mut events = h.bus.subscribe();

        let token = h
            .factory
            .create_instance(
                CREATOR,
                "Net".into(),
                "NET".into(),
                NETWORK_ADMIN,
                vec![voter(1), voter(2)],
                2,
            )
            .await
            .unwrap();

        let envelope = timeout(Duration::from_millis(100), events.recv())
            .await
            .expect("timeout waiting for event")
            .expect("should receive event");
        assert_eq!(envelope.topic, topics::NETWORK_CREATED);

        match envelope.event {
            FactoryEvent::NetworkCreated(payload) => {
                assert_eq!(payload.token, token.address);
                assert_eq!(payload.creator, CREATOR);
                assert_eq!(payload.voters, vec![voter(1), voter(2)]);
                assert_eq!(payload.threshold, 2);
                assert!(payload.minted);
            }
            other => panic!("Expected NetworkCreated, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_event_sequence_is_gapless() {
        let h = initialized().await;
        let mut events = h.bus.subscribe();

        h.factory
            .set_entrusted_voters(ADMIN, vec![voter(1)], 1)
            .await
            .unwrap();
        h.factory
            .create_instance_with_entrusted_voters(CREATOR, "Net".into(), "NET".into(), NETWORK_ADMIN)
            .await
            .unwrap();
        // Rejected operation publishes nothing
        let _ = h.factory.set_entrusted_voters(CREATOR, vec![voter(2)], 1).await;
        h.factory.transfer_admin(ADMIN, voter(9)).await.unwrap();

        let mut sequences = Vec::new();
        while let Ok(envelope) = events.try_recv() {
            sequences.push(envelope.sequence);
        }
        assert_eq!(sequences.len(), 3);
        assert!(sequences.windows(2).all(|w| w[1] == w[0] + 1));
        // initialize + 3 committed operations
        assert_eq!(h.bus.events_published(), 4);
    }

    #[tokio::test]
    async fn test_event_payload_serializes() {
        let h = initialized().await;
        let mut events = h.bus.subscribe();
        h.factory
            .create_instance(CREATOR, "Net".into(), "NET".into(), NETWORK_ADMIN, vec![voter(1)], 1)
            .await
            .unwrap();

        let envelope = events.recv().await.unwrap();
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["topic"], "factory.network.created");
        assert_eq!(json["event"]["type"], "NetworkCreated");
    }

    #[tokio::test]
    async fn test_custom_publisher_sees_every_commit() {
        init_test_logging();
        let publisher = Arc::new(RecordingPublisher::default());
        let factory = NetworkFactoryService::new(
            FactoryServiceConfig::for_testing(),
            Arc::new(DeterministicDeployer::new()),
            Arc::new(ManualChainContext::new(1, 0)),
            publisher.clone(),
        );

        factory.initialize(ADMIN, init_params()).await.unwrap();
        factory
            .create_instance(CREATOR, "Net".into(), "NET".into(), NETWORK_ADMIN, vec![voter(1)], 1)
            .await
            .unwrap();
        let _ = factory.transfer_admin(CREATOR, voter(3)).await;

        let topics_seen: Vec<String> = publisher.envelopes().into_iter().map(|e| e.topic).collect();
        assert_eq!(topics_seen, vec![topics::FACTORY_INITIALIZED, topics::NETWORK_CREATED]);
        assert_eq!(factory.publisher().events_published(), 2);
    }

    #[tokio::test]
    async fn test_creations_show_up_in_metrics() {
        let h = initialized().await;
        h.factory
            .create_instance(CREATOR, "Net".into(), "NET".into(), NETWORK_ADMIN, vec![voter(1)], 1)
            .await
            .unwrap();
        let _ = h
            .factory
            .create_instance(CREATOR, "Net".into(), "NET".into(), NETWORK_ADMIN, vec![], 1)
            .await;

        let text = lsd_telemetry::encode_metrics().unwrap();
        assert!(text.contains("lsd_factory_networks_created_total"));
        assert!(text.contains("lsd_factory_rejections_total"));
    }
}
