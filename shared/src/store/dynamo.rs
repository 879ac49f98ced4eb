use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_item};
use std::collections::HashMap;

use super::{BasketStore, MemberAddition};
use crate::config;
use crate::error::{map_dynamo_error, Result, ServiceError};
use crate::models::{now_str, Basket};

// Enough to tell a unique invitation code from a duplicated one
const INVITATION_CODE_QUERY_LIMIT: i32 = 2;

/// DynamoDB store for baskets
pub struct DynamoBasketStore {
    client: Client,
    table_name: String,
    invitation_code_index: String,
}

impl DynamoBasketStore {
    /// Creates a new DynamoDB store
    pub async fn new() -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        let client = Client::new(&config);

        Self {
            client,
            table_name: config::basket_table_name(),
            invitation_code_index: config::invitation_code_index_name(),
        }
    }

    /// Creates a new DynamoDB store with the specified client and table name.
    /// This is mainly useful for testing with a local DynamoDB instance.
    pub fn with_client_and_table(client: Client, table_name: String) -> Self {
        Self {
            client,
            table_name,
            invitation_code_index: config::DEFAULT_INVITATION_CODE_INDEX.to_string(),
        }
    }

    fn id_key(id: &str) -> HashMap<String, AttributeValue> {
        HashMap::from([("id".to_string(), AttributeValue::S(id.to_string()))])
    }
}

#[async_trait]
impl BasketStore for DynamoBasketStore {
    async fn create_basket(&self, basket: Basket) -> Result<Basket> {
        let item = to_item(&basket)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| map_dynamo_error("put_item", e))?;

        Ok(basket)
    }

    async fn get_basket(&self, id: &str) -> Result<Option<Basket>> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::id_key(id)))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| map_dynamo_error("get_item", e))?;

        match response.item() {
            Some(item) => Ok(Some(from_item(item.clone())?)),
            None => Ok(None),
        }
    }

    async fn find_by_invitation_code(&self, invitation_code: &str) -> Result<Vec<Basket>> {
        let response = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(&self.invitation_code_index)
            .key_condition_expression("#code = :code")
            .expression_attribute_names("#code", "invitationCode")
            .expression_attribute_values(":code", AttributeValue::S(invitation_code.to_string()))
            .limit(INVITATION_CODE_QUERY_LIMIT)
            .send()
            .await
            .map_err(|e| map_dynamo_error("query", e))?;

        let mut baskets = Vec::new();
        for item in response.items() {
            baskets.push(from_item(item.clone())?);
        }

        Ok(baskets)
    }

    /// Appends the member with a single conditional update.
    ///
    /// `NOT contains(memberIds, :member_id)` makes the membership check and the
    /// append atomic, so concurrent joins of the same user write the id once.
    async fn add_member(
        &self,
        basket_id: &str,
        member_id: &str,
        member_token: Option<&str>,
    ) -> Result<MemberAddition> {
        let mut update_expression = String::from(
            "SET #member_ids = list_append(if_not_exists(#member_ids, :empty), :member_list), #updated_at = :now",
        );

        let mut request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::id_key(basket_id)))
            .condition_expression("attribute_exists(id) AND NOT contains(#member_ids, :member_id)")
            .expression_attribute_names("#member_ids", "memberIds")
            .expression_attribute_names("#updated_at", "updatedAt")
            .expression_attribute_values(":empty", AttributeValue::L(vec![]))
            .expression_attribute_values(":member_id", AttributeValue::S(member_id.to_string()))
            .expression_attribute_values(
                ":member_list",
                AttributeValue::L(vec![AttributeValue::S(member_id.to_string())]),
            )
            .expression_attribute_values(":now", AttributeValue::S(now_str()))
            .return_values(ReturnValue::AllNew);

        if let Some(token) = member_token {
            update_expression.push_str(
                ", #member_tokens = list_append(if_not_exists(#member_tokens, :empty), :token_list)",
            );
            request = request
                .expression_attribute_names("#member_tokens", "memberTokens")
                .expression_attribute_values(
                    ":token_list",
                    AttributeValue::L(vec![AttributeValue::S(token.to_string())]),
                );
        }

        let response = match request.update_expression(update_expression).send().await {
            Ok(response) => response,
            Err(err) if is_conditional_check_failure(&err) => {
                log::debug!(
                    "Conditional add skipped: basket_id={}, member_id={}",
                    basket_id,
                    member_id
                );
                return Ok(MemberAddition::AlreadyMember);
            }
            Err(err) => return Err(map_dynamo_error("update_item", err)),
        };

        let attributes = response.attributes().ok_or_else(|| {
            ServiceError::unknown(format!(
                "DynamoDB update_item returned no attributes for basket {}",
                basket_id
            ))
        })?;

        Ok(MemberAddition::Added(from_item(attributes.clone())?))
    }
}

fn is_conditional_check_failure<R>(err: &SdkError<UpdateItemError, R>) -> bool {
    match err {
        SdkError::ServiceError(service_err) => {
            service_err.err().is_conditional_check_failed_exception()
        }
        _ => false,
    }
}
