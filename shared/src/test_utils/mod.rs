pub mod dynamo_test_utils;
pub mod http_test_utils;
pub mod mock_basket_store;
pub mod mock_push_dispatcher;
pub mod test_logging;
