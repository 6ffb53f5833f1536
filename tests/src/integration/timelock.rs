//! # Timelocked Networks
//!
//! Networks whose admin is a delay-enforcing controller contract.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use lsd_governance::GovernanceError;
    use lsd_network_factory::{ComponentKind, FactoryError, NetworkFactoryApi, TimelockParams};
    use lsd_shared_types::{keccak256, Address};

    const CONTROLLER: Address = Address::repeat_byte(0xcc);
    const DELAY: i64 = 3_600;

    async fn timelocked(h: &Harness) -> Address {
        h.factory
            .create_instance_with_timelock(
                CREATOR,
                "Timed".into(),
                "TMD".into(),
                vec![voter(1), voter(2)],
                1,
                TimelockParams {
                    delay: DELAY,
                    controllers: vec![CONTROLLER],
                },
            )
            .await
            .unwrap()
            .address
    }

    #[tokio::test]
    async fn test_timelock_is_network_admin() {
        let h = initialized().await;
        let token = timelocked(&h).await;

        let bundle = h.factory.bundle_of(token).await.unwrap();
        let timelock = h.factory.timelock_of(token).await.unwrap();
        assert_eq!(bundle.admin, timelock.address());
        assert_eq!(bundle.timelock, Some(timelock.address()));
        assert_eq!(bundle.component(ComponentKind::Timelock), Some(timelock.address()));
        assert_eq!(timelock.min_delay(), DELAY as u64);
        assert_eq!(timelock.controllers(), &[CONTROLLER]);
    }

    #[tokio::test]
    async fn test_delay_enforced() {
        let h = initialized().await;
        let token = timelocked(&h).await;
        let action = keccak256(b"set-admin");
        let start = 1_700_000_000u64;

        assert_eq!(
            h.factory.schedule_admin_action(token, CONTROLLER, action).await,
            Ok(start + DELAY as u64)
        );

        h.chain.advance(DELAY as u64 - 1);
        assert_eq!(
            h.factory.execute_admin_action(token, CONTROLLER, action).await,
            Err(FactoryError::Governance(GovernanceError::ActionNotReady {
                ready_at: start + DELAY as u64,
                now: start + DELAY as u64 - 1,
            }))
        );

        h.chain.advance(1);
        h.factory
            .execute_admin_action(token, CONTROLLER, action)
            .await
            .unwrap();
        assert!(h.factory.timelock_of(token).await.unwrap().is_executed(&action));
    }

    #[tokio::test]
    async fn test_execute_only_once() {
        let h = initialized().await;
        let token = timelocked(&h).await;
        let action = keccak256(b"upgrade");

        h.factory.schedule_admin_action(token, CONTROLLER, action).await.unwrap();
        h.chain.advance(DELAY as u64);
        h.factory.execute_admin_action(token, CONTROLLER, action).await.unwrap();

        let again = h.factory.execute_admin_action(token, CONTROLLER, action).await;
        assert_eq!(
            again,
            Err(FactoryError::Governance(GovernanceError::ActionAlreadyExecuted(action)))
        );
        let reschedule = h.factory.schedule_admin_action(token, CONTROLLER, action).await;
        assert!(reschedule.is_err());
    }

    #[tokio::test]
    async fn test_non_controller_rejected() {
        let h = initialized().await;
        let token = timelocked(&h).await;
        let action = keccak256(b"upgrade");

        // Voters and the factory admin hold no timelock role
        for outsider in [voter(1), ADMIN] {
            assert_eq!(
                h.factory.schedule_admin_action(token, outsider, action).await,
                Err(FactoryError::Unauthorized(outsider))
            );
        }

        h.factory.schedule_admin_action(token, CONTROLLER, action).await.unwrap();
        h.chain.advance(DELAY as u64);
        assert_eq!(
            h.factory.execute_admin_action(token, voter(2), action).await,
            Err(FactoryError::Unauthorized(voter(2)))
        );
    }

    #[tokio::test]
    async fn test_unscheduled_action() {
        let h = initialized().await;
        let token = timelocked(&h).await;
        let action = keccak256(b"never-scheduled");
        assert_eq!(
            h.factory.execute_admin_action(token, CONTROLLER, action).await,
            Err(FactoryError::Governance(GovernanceError::ActionNotScheduled(action)))
        );
    }

    #[tokio::test]
    async fn test_zero_delay_executes_immediately() {
        let h = initialized().await;
        let token = h
            .factory
            .create_instance_with_timelock(
                CREATOR,
                "Instant".into(),
                "NOW".into(),
                vec![voter(1)],
                1,
                TimelockParams {
                    delay: 0,
                    controllers: vec![CONTROLLER],
                },
            )
            .await
            .unwrap()
            .address;
        let action = keccak256(b"instant");

        h.factory.schedule_admin_action(token, CONTROLLER, action).await.unwrap();
        h.factory.execute_admin_action(token, CONTROLLER, action).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_timelock_params_leave_no_trace() {
        let h = initialized().await;

        let negative = h
            .factory
            .create_instance_with_timelock(
                CREATOR,
                "Bad".into(),
                "BAD".into(),
                vec![voter(1)],
                1,
                TimelockParams {
                    delay: -1,
                    controllers: vec![CONTROLLER],
                },
            )
            .await;
        assert_eq!(negative, Err(FactoryError::InvalidDelay(-1)));

        let no_controllers = h
            .factory
            .create_instance_with_timelock(
                CREATOR,
                "Bad".into(),
                "BAD".into(),
                vec![voter(1)],
                1,
                TimelockParams {
                    delay: 10,
                    controllers: vec![],
                },
            )
            .await;
        assert_eq!(
            no_controllers,
            Err(FactoryError::Governance(GovernanceError::EmptyTimelockControllers))
        );

        assert_eq!(h.factory.total_instances().await, 0);
    }
}
