use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, GlobalSecondaryIndex, IndexStatus, KeySchemaElement,
    KeyType, Projection, ProjectionType, ProvisionedThroughput, ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client;
use log::{debug, error, info};
use std::error::Error;

use crate::config::DEFAULT_INVITATION_CODE_INDEX;

/// # DynamoDB test utilities
///
/// Integration tests run against DynamoDB Local when `USE_DYNAMODB=true`;
/// otherwise the mock stores are used. Call
/// `test_logging::init_test_logging()` first to see the log output.
pub const DYNAMO_LOCAL_URI: &str = "http://localhost:8000";

// Helper to check if DynamoDB integration tests should be used
pub fn use_dynamodb() -> bool {
    std::env::var("USE_DYNAMODB").unwrap_or_default() == "true"
}

// Helper to set up a DynamoDB client for local testing
pub async fn create_dynamo_client() -> Client {
    let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .endpoint_url(DYNAMO_LOCAL_URI)
        .region("us-east-1")
        .load()
        .await;

    Client::new(&config)
}

fn throughput() -> Result<ProvisionedThroughput, Box<dyn Error>> {
    Ok(ProvisionedThroughput::builder()
        .read_capacity_units(5)
        .write_capacity_units(5)
        .build()?)
}

/// Creates the basket table (hash key `id`) with the invitation code GSI,
/// dropping any previous table of the same name first
pub async fn create_basket_table(client: &Client, table_name: &str) -> Result<(), Box<dyn Error>> {
    info!("Creating basket table '{}'...", table_name);

    let tables = client.list_tables().send().await?;
    if tables.table_names().contains(&table_name.to_string()) {
        info!("Table '{}' already exists, deleting it first...", table_name);
        client.delete_table().table_name(table_name).send().await?;

        loop {
            let tables = client.list_tables().send().await?;
            if !tables.table_names().contains(&table_name.to_string()) {
                break;
            }
            debug!("Table '{}' still exists, waiting...", table_name);
            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        }
    }

    let invitation_code_index = GlobalSecondaryIndex::builder()
        .index_name(DEFAULT_INVITATION_CODE_INDEX)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("invitationCode")
                .key_type(KeyType::Hash)
                .build()?,
        )
        .projection(
            Projection::builder()
                .projection_type(ProjectionType::All)
                .build(),
        )
        .provisioned_throughput(throughput()?)
        .build()?;

    client
        .create_table()
        .table_name(table_name)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("id")
                .key_type(KeyType::Hash)
                .build()?,
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("id")
                .attribute_type(ScalarAttributeType::S)
                .build()?,
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("invitationCode")
                .attribute_type(ScalarAttributeType::S)
                .build()?,
        )
        .global_secondary_indexes(invitation_code_index)
        .provisioned_throughput(throughput()?)
        .send()
        .await?;

    // Wait for the table (and GSI) to become ACTIVE before running tests
    loop {
        let resp = client.describe_table().table_name(table_name).send().await?;
        if let Some(table_desc) = resp.table() {
            let table_active = table_desc.table_status() == Some(&TableStatus::Active);
            let indexes_active = table_desc
                .global_secondary_indexes()
                .iter()
                .all(|idx| idx.index_status() == Some(&IndexStatus::Active));
            if table_active && indexes_active {
                break;
            }
            debug!("Table '{}' status: {:?}", table_name, table_desc.table_status());
        }
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    }

    info!("Table '{}' is ready for testing!", table_name);
    Ok(())
}

// Helper to clean the DynamoDB table between tests
pub async fn clear_dynamo_table(client: &Client, table_name: &str) {
    let mut last_key = None;
    loop {
        let scan_resp = match client
            .scan()
            .table_name(table_name)
            .set_exclusive_start_key(last_key.clone())
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!("Failed to scan table '{}': {}", table_name, e);
                break;
            }
        };

        for item in scan_resp.items() {
            if let Some(Ok(id)) = item.get("id").map(|v| v.as_s()) {
                if let Err(e) = client
                    .delete_item()
                    .table_name(table_name)
                    .key("id", AttributeValue::S(id.to_string()))
                    .send()
                    .await
                {
                    error!("Failed to delete item '{}' from '{}': {}", id, table_name, e);
                }
            }
        }

        last_key = scan_resp.last_evaluated_key().cloned();
        if last_key.is_none() {
            break;
        }
    }
}
