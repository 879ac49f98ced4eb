mod fanout_operation_tests;

pub(crate) fn tokens(values: &[&str]) -> Vec<String> {
    values.iter().map(|t| t.to_string()).collect()
}
