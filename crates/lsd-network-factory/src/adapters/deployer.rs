//! # Deterministic Deployer
//!
//! Derives component and token addresses the way the chain would:
//!
//! - components: CREATE2 from the factory, salt per network and kind,
//!   init code `logic ‖ kind`
//! - tokens: CREATE from the factory and its nonce
//!
//! The adapter is pure, so discarding a result leaves nothing behind.

use crate::domain::entities::ComponentKind;
use crate::errors::DeployError;
use crate::ports::outbound::{ComponentDeployer, DeployRequest, TokenRequest};
use lsd_shared_types::{compute_contract_address, compute_contract_address_create2, Address};
use std::collections::BTreeSet;
use tracing::debug;

/// Address-deriving deployer.
#[derive(Clone, Debug, Default)]
pub struct DeterministicDeployer {
    /// Kinds this deployer refuses to deploy.
    rejected_kinds: BTreeSet<ComponentKind>,
    /// Refuse every token mint.
    reject_mints: bool,
}

impl DeterministicDeployer {
    /// Deployer that accepts every request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse deployments of `kind`.
    #[must_use]
    pub fn rejecting(mut self, kind: ComponentKind) -> Self {
        self.rejected_kinds.insert(kind);
        self
    }

    /// Refuse every token mint.
    #[must_use]
    pub fn rejecting_mints(mut self) -> Self {
        self.reject_mints = true;
        self
    }

    /// Init code for a component: logic address followed by the kind tag.
    pub fn init_code(kind: ComponentKind, logic: Option<Address>) -> Vec<u8> {
        let mut code = Vec::with_capacity(20 + kind.as_str().len());
        if let Some(logic) = logic {
            code.extend_from_slice(logic.as_bytes());
        }
        code.extend_from_slice(kind.as_str().as_bytes());
        code
    }
}

impl ComponentDeployer for DeterministicDeployer {
    fn deploy(&self, request: &DeployRequest) -> Result<Address, DeployError> {
        if self.rejected_kinds.contains(&request.kind) {
            return Err(DeployError::Rejected {
                kind: request.kind,
                reason: "deployment refused".to_string(),
            });
        }
        if request.kind.is_proxied() && request.logic.is_none() {
            return Err(DeployError::MissingLogic(request.kind));
        }

        let code = Self::init_code(request.kind, request.logic);
        let address = compute_contract_address_create2(request.deployer, request.salt, &code);
        debug!(kind = %request.kind, address = %address, "Component deployed");
        Ok(address)
    }

    fn mint_token(&self, request: &TokenRequest) -> Result<Address, DeployError> {
        if self.reject_mints {
            return Err(DeployError::TokenMintRejected(format!(
                "mint of {} refused",
                request.symbol
            )));
        }
        let address = compute_contract_address(request.deployer, request.nonce);
        debug!(
            symbol = %request.symbol,
            nonce = request.nonce,
            address = %address,
            "Token minted"
        );
        Ok(address)
    }
}
