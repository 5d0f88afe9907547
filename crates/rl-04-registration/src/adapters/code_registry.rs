use crate::ports::outbound::RegistrationStore;
use async_trait::async_trait;
use rl_02_verification_code::{CodeError, CodeRegistry, CodeResult, VerificationCode};

/// Exposes a [`RegistrationStore`] as the code generator's uniqueness registry.
pub struct StoreCodeRegistry<'a> {
    store: &'a dyn RegistrationStore,
}

impl<'a> StoreCodeRegistry<'a> {
    pub fn new(store: &'a dyn RegistrationStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CodeRegistry for StoreCodeRegistry<'_> {
    async fn is_taken(&self, code: &VerificationCode) -> CodeResult<bool> {
        self.store
            .code_in_use(code)
            .await
            .map_err(|e| CodeError::Registry {
                reason: e.to_string(),
            })
    }
}
