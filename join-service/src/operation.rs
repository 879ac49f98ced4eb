use log::{debug, error, info, warn};
use std::sync::Arc;

use basket_shared::{
    callable::UNAUTHENTICATED_MESSAGE,
    error::{Result, ServiceError},
    models::Basket,
    store::{BasketStore, MemberAddition},
};

/// Basket returned to the caller after a join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedBasket {
    pub basket_id: String,
    pub basket: Basket,
}

/// Joins callers to the basket behind an invitation code.
///
/// Membership is keyed on the caller id alone: a caller who is already a member
/// is returned the basket untouched, even if they present a new token.
pub struct BasketJoinOperation<S: BasketStore + ?Sized> {
    store: Arc<S>,
}

impl<S: BasketStore + ?Sized> BasketJoinOperation<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn join(
        &self,
        invitation_code: &str,
        caller_id: Option<&str>,
        caller_token: Option<&str>,
    ) -> Result<JoinedBasket> {
        let caller_id = caller_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ServiceError::unauthenticated(UNAUTHENTICATED_MESSAGE))?;

        // Codes are opaque: only a blank one is refused, the rest match exactly
        if invitation_code.trim().is_empty() {
            return Err(ServiceError::invalid_argument(
                "An invitation code is required.",
            ));
        }

        let caller_token = caller_token.filter(|token| !token.is_empty());

        let mut matches = self
            .store
            .find_by_invitation_code(invitation_code)
            .await
            .map_err(fetch_error)?;

        if matches.len() > 1 {
            error!(
                "Invitation code {} matches {} or more baskets, refusing to pick one",
                invitation_code,
                matches.len()
            );
            return Err(ServiceError::unknown(format!(
                "Error fetching basket: invitation code {} is not unique",
                invitation_code
            )));
        }

        let Some(basket) = matches.pop() else {
            info!("No basket for invitation code {}", invitation_code);
            return Err(ServiceError::not_found(
                "No basket found with this invitation code.",
            ));
        };

        if basket.has_member(caller_id) {
            debug!(
                "User {} is already a member of basket {}, nothing to update",
                caller_id, basket.id
            );
            return Ok(JoinedBasket {
                basket_id: basket.id.clone(),
                basket,
            });
        }

        let basket = match self
            .store
            .add_member(&basket.id, caller_id, caller_token)
            .await
            .map_err(fetch_error)?
        {
            MemberAddition::Added(updated) => {
                info!("User {} joined basket {}", caller_id, updated.id);
                updated
            }
            MemberAddition::AlreadyMember => {
                // A concurrent join got there first, or the basket vanished
                warn!(
                    "Conditional add for user {} on basket {} was a no-op, re-reading",
                    caller_id, basket.id
                );
                self.store
                    .get_basket(&basket.id)
                    .await
                    .map_err(fetch_error)?
                    .ok_or_else(|| {
                        ServiceError::not_found("No basket found with this invitation code.")
                    })?
            }
        };

        Ok(JoinedBasket {
            basket_id: basket.id.clone(),
            basket,
        })
    }
}

fn fetch_error(err: ServiceError) -> ServiceError {
    match err {
        ServiceError::Unknown(msg) => {
            ServiceError::unknown(format!("Error fetching basket: {}", msg))
        }
        other => other,
    }
}
