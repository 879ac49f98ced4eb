use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, ServiceError};
use crate::models::{now_str, Basket};
use crate::store::{BasketStore, MemberAddition};

/// Mock implementation of BasketStore for testing
///
/// Keeps baskets in a map and counts reads and writes so tests can assert how
/// many collaborator calls an operation made.
pub struct MockBasketStore {
    baskets: Mutex<HashMap<String, Basket>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    error_mode: bool,
    // Pretends another request joined first: add_member reports AlreadyMember
    // after recording the member itself
    lose_join_race: bool,
}

impl MockBasketStore {
    /// Create a new empty MockBasketStore
    pub fn new() -> Self {
        Self {
            baskets: Mutex::new(HashMap::new()),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            error_mode: false,
            lose_join_race: false,
        }
    }

    /// Create a MockBasketStore with initial data
    pub fn with_data(baskets: Vec<Basket>) -> Self {
        let store = Self::new();
        {
            let mut map = store.baskets.lock().unwrap();
            for basket in baskets {
                map.insert(basket.id.clone(), basket);
            }
        }
        store
    }

    /// Create a new MockBasketStore in error mode where all operations fail
    pub fn new_error() -> Self {
        Self {
            error_mode: true,
            ..Self::new()
        }
    }

    /// Create a store whose conditional add always loses to a concurrent join
    pub fn with_lost_race(baskets: Vec<Basket>) -> Self {
        Self {
            lose_join_race: true,
            ..Self::with_data(baskets)
        }
    }

    /// Number of query/get calls made so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of add_member calls made so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of a stored basket, bypassing the call counters
    pub fn basket(&self, id: &str) -> Option<Basket> {
        self.baskets.lock().unwrap().get(id).cloned()
    }

    fn check_error_mode(&self) -> Result<()> {
        if self.error_mode {
            return Err(ServiceError::unknown("Mock store failure"));
        }
        Ok(())
    }
}

impl Default for MockBasketStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BasketStore for MockBasketStore {
    async fn create_basket(&self, basket: Basket) -> Result<Basket> {
        self.check_error_mode()?;
        self.baskets
            .lock()
            .unwrap()
            .insert(basket.id.clone(), basket.clone());
        Ok(basket)
    }

    async fn get_basket(&self, id: &str) -> Result<Option<Basket>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_error_mode()?;
        Ok(self.baskets.lock().unwrap().get(id).cloned())
    }

    async fn find_by_invitation_code(&self, invitation_code: &str) -> Result<Vec<Basket>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_error_mode()?;

        let mut matches: Vec<Basket> = self
            .baskets
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.invitation_code == invitation_code)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        matches.truncate(2);

        Ok(matches)
    }

    async fn add_member(
        &self,
        basket_id: &str,
        member_id: &str,
        member_token: Option<&str>,
    ) -> Result<MemberAddition> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_error_mode()?;

        // Single lock scope keeps check and append atomic, like the conditional update
        let mut baskets = self.baskets.lock().unwrap();
        let Some(basket) = baskets.get_mut(basket_id) else {
            return Ok(MemberAddition::AlreadyMember);
        };

        if basket.has_member(member_id) {
            return Ok(MemberAddition::AlreadyMember);
        }

        basket.member_ids.push(member_id.to_string());
        if let Some(token) = member_token {
            basket.member_tokens.push(token.to_string());
        }
        basket.updated_at = Some(now_str());

        if self.lose_join_race {
            return Ok(MemberAddition::AlreadyMember);
        }

        Ok(MemberAddition::Added(basket.clone()))
    }
}
