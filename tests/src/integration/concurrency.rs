//! # Concurrent Creation
//!
//! Many creators racing against one factory.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use lsd_network_factory::{FactoryError, IdentityToken, NetworkFactoryApi};
    use lsd_shared_types::Address;
    use rand::seq::SliceRandom;
    use std::collections::BTreeSet;

    const CREATORS: u8 = 16;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creations_get_unique_tokens() {
        let h = initialized().await;
        let mut events = h.bus.subscribe();

        let mut handles = Vec::new();
        for n in 1..=CREATORS {
            let factory = h.factory.clone();
            handles.push(tokio::spawn(async move {
                factory
                    .create_instance(
                        Address::repeat_byte(0x80 + n),
                        format!("Net {n}"),
                        "NET".into(),
                        NETWORK_ADMIN,
                        vec![voter(n), voter(n + 0x20)],
                        1,
                    )
                    .await
            }));
        }

        let mut tokens = BTreeSet::new();
        for handle in handles {
            let token = handle.await.unwrap().unwrap();
            assert!(tokens.insert(token.address), "duplicate token {}", token.address);
        }

        assert_eq!(tokens.len(), CREATORS as usize);
        assert_eq!(h.factory.total_instances().await, CREATORS as usize);

        let mut sequences = Vec::new();
        while let Ok(envelope) = events.try_recv() {
            sequences.push(envelope.sequence);
        }
        assert_eq!(sequences.len(), CREATORS as usize);
        assert!(sequences.windows(2).all(|w| w[1] > w[0]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_for_one_authorized_token() {
        let h = initialized().await;
        let token = IdentityToken::new(Address::repeat_byte(0x70), "Shared", "SHR");
        h.factory.add_authorized_token(ADMIN, token.clone()).await.unwrap();

        let mut handles = Vec::new();
        for n in 1..=8u8 {
            let factory = h.factory.clone();
            let address = token.address;
            handles.push(tokio::spawn(async move {
                factory
                    .create_instance_with_token(
                        Address::repeat_byte(0x80 + n),
                        address,
                        NETWORK_ADMIN,
                        vec![voter(n)],
                        1,
                    )
                    .await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(bundle) => {
                    winners += 1;
                    assert_eq!(bundle.token, token);
                }
                Err(err) => assert_eq!(err, FactoryError::TokenAlreadyUsed(token.address)),
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(h.factory.total_instances().await, 1);
        assert!(h.factory.authorized_tokens().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_votes_from_many_tasks() {
        let h = initialized().await;
        let mut voters: Vec<Address> = (1..=10u8).map(voter).collect();
        let token = h
            .factory
            .create_instance(CREATOR, "Net".into(), "NET".into(), NETWORK_ADMIN, voters.clone(), 7)
            .await
            .unwrap()
            .address;
        let action = lsd_shared_types::keccak256(b"concurrent-action");

        voters.shuffle(&mut rand::thread_rng());
        let mut handles = Vec::new();
        for v in voters.into_iter().take(7) {
            let factory = h.factory.clone();
            handles.push(tokio::spawn(async move { factory.vote(token, v, action).await }));
        }

        let mut approved = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() == lsd_governance::VoteOutcome::Approved {
                approved += 1;
            }
        }
        // Exactly the seventh distinct vote crosses the threshold
        assert_eq!(approved, 1);
    }
}
