use async_trait::async_trait;

use crate::error::Result;
use crate::models::Basket;

// Expose the DynamoDB store module
pub mod dynamo;

/// Outcome of an atomic "add member if absent" update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberAddition {
    /// The member was appended; carries the basket as stored after the update
    Added(Basket),
    /// The member id was already present, nothing was written
    AlreadyMember,
}

/// BasketStore trait defining the interface for basket storage implementations
#[async_trait]
pub trait BasketStore: Send + Sync + 'static {
    /// Stores a basket as given. Joins never create baskets; this is how
    /// baskets are seeded into a store, e.g. for local and DynamoDB tests.
    async fn create_basket(&self, basket: Basket) -> Result<Basket>;

    /// Gets a basket by ID, `None` when it does not exist
    async fn get_basket(&self, id: &str) -> Result<Option<Basket>>;

    /// Finds baskets carrying the invitation code.
    ///
    /// Implementations return at most two matches: enough for the caller to tell
    /// a unique code from an ambiguous one without reading the whole index.
    async fn find_by_invitation_code(&self, invitation_code: &str) -> Result<Vec<Basket>>;

    /// Appends `member_id` (and `member_token`, if any) to the basket unless the
    /// id is already a member. The check and the write must be one atomic step.
    async fn add_member(
        &self,
        basket_id: &str,
        member_id: &str,
        member_token: Option<&str>,
    ) -> Result<MemberAddition>;
}
