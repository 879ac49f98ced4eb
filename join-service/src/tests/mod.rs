mod join_operation_tests;

use basket_shared::models::Basket;

pub(crate) fn basket(id: &str, code: &str, members: &[&str]) -> Basket {
    Basket {
        id: id.to_string(),
        invitation_code: code.to_string(),
        member_ids: members.iter().map(|m| m.to_string()).collect(),
        member_tokens: vec![],
        updated_at: None,
    }
}
