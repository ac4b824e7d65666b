use crate::{
    error::{CancellationReason, Error, Result},
    store::Store,
};

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    Client,
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation, types,
};

/// Classify an SDK error by its service error code.
pub(crate) fn classify<E>(error: SdkError<E>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&error).to_string();
    match error.code() {
        Some("ConditionalCheckFailedException") => Error::ConditionFailed(message),
        Some("ResourceNotFoundException") => Error::NotFound(message),
        Some("ResourceInUseException") => Error::ResourceInUse(message),
        Some(
            "ProvisionedThroughputExceededException"
            | "RequestLimitExceeded"
            | "ThrottlingException",
        ) => Error::Throttled(message),
        _ => Error::Transport(message),
    }
}

fn cancelled(exception: &types::error::TransactionCanceledException) -> Error {
    let reasons = exception
        .cancellation_reasons()
        .iter()
        .map(|reason| CancellationReason {
            code: reason.code().map(str::to_string),
            message: reason.message().map(str::to_string),
        })
        .collect();
    Error::TransactionCancelled {
        reasons,
        message: exception.message().unwrap_or_default().to_string(),
    }
}

#[async_trait]
impl Store for Client {
    async fn get_item(
        &self,
        input: operation::get_item::GetItemInput,
    ) -> Result<operation::get_item::GetItemOutput> {
        self.get_item()
            .set_consistent_read(input.consistent_read)
            .set_expression_attribute_names(input.expression_attribute_names)
            .set_key(input.key)
            .set_projection_expression(input.projection_expression)
            .set_return_consumed_capacity(input.return_consumed_capacity)
            .set_table_name(input.table_name)
            .send()
            .await
            .map_err(classify)
    }

    async fn put_item(
        &self,
        input: operation::put_item::PutItemInput,
    ) -> Result<operation::put_item::PutItemOutput> {
        self.put_item()
            .set_condition_expression(input.condition_expression)
            .set_expression_attribute_names(input.expression_attribute_names)
            .set_expression_attribute_values(input.expression_attribute_values)
            .set_item(input.item)
            .set_return_consumed_capacity(input.return_consumed_capacity)
            .set_return_item_collection_metrics(input.return_item_collection_metrics)
            .set_return_values(input.return_values)
            .set_return_values_on_condition_check_failure(
                input.return_values_on_condition_check_failure,
            )
            .set_table_name(input.table_name)
            .send()
            .await
            .map_err(classify)
    }

    async fn delete_item(
        &self,
        input: operation::delete_item::DeleteItemInput,
    ) -> Result<operation::delete_item::DeleteItemOutput> {
        self.delete_item()
            .set_condition_expression(input.condition_expression)
            .set_expression_attribute_names(input.expression_attribute_names)
            .set_expression_attribute_values(input.expression_attribute_values)
            .set_key(input.key)
            .set_return_consumed_capacity(input.return_consumed_capacity)
            .set_return_item_collection_metrics(input.return_item_collection_metrics)
            .set_return_values(input.return_values)
            .set_return_values_on_condition_check_failure(
                input.return_values_on_condition_check_failure,
            )
            .set_table_name(input.table_name)
            .send()
            .await
            .map_err(classify)
    }

    async fn update_item(
        &self,
        input: operation::update_item::UpdateItemInput,
    ) -> Result<operation::update_item::UpdateItemOutput> {
        self.update_item()
            .set_condition_expression(input.condition_expression)
            .set_expression_attribute_names(input.expression_attribute_names)
            .set_expression_attribute_values(input.expression_attribute_values)
            .set_key(input.key)
            .set_return_consumed_capacity(input.return_consumed_capacity)
            .set_return_item_collection_metrics(input.return_item_collection_metrics)
            .set_return_values(input.return_values)
            .set_return_values_on_condition_check_failure(
                input.return_values_on_condition_check_failure,
            )
            .set_table_name(input.table_name)
            .set_update_expression(input.update_expression)
            .send()
            .await
            .map_err(classify)
    }

    async fn scan(
        &self,
        input: operation::scan::ScanInput,
    ) -> Result<operation::scan::ScanOutput> {
        self.scan()
            .set_consistent_read(input.consistent_read)
            .set_exclusive_start_key(input.exclusive_start_key)
            .set_expression_attribute_names(input.expression_attribute_names)
            .set_expression_attribute_values(input.expression_attribute_values)
            .set_filter_expression(input.filter_expression)
            .set_index_name(input.index_name)
            .set_limit(input.limit)
            .set_projection_expression(input.projection_expression)
            .set_return_consumed_capacity(input.return_consumed_capacity)
            .set_segment(input.segment)
            .set_select(input.select)
            .set_table_name(input.table_name)
            .set_total_segments(input.total_segments)
            .send()
            .await
            .map_err(classify)
    }

    async fn query(
        &self,
        input: operation::query::QueryInput,
    ) -> Result<operation::query::QueryOutput> {
        self.query()
            .set_consistent_read(input.consistent_read)
            .set_exclusive_start_key(input.exclusive_start_key)
            .set_expression_attribute_names(input.expression_attribute_names)
            .set_expression_attribute_values(input.expression_attribute_values)
            .set_filter_expression(input.filter_expression)
            .set_index_name(input.index_name)
            .set_key_condition_expression(input.key_condition_expression)
            .set_limit(input.limit)
            .set_projection_expression(input.projection_expression)
            .set_return_consumed_capacity(input.return_consumed_capacity)
            .set_scan_index_forward(input.scan_index_forward)
            .set_select(input.select)
            .set_table_name(input.table_name)
            .send()
            .await
            .map_err(classify)
    }

    async fn create_table(
        &self,
        input: operation::create_table::CreateTableInput,
    ) -> Result<operation::create_table::CreateTableOutput> {
        self.create_table()
            .set_attribute_definitions(input.attribute_definitions)
            .set_billing_mode(input.billing_mode)
            .set_global_secondary_indexes(input.global_secondary_indexes)
            .set_key_schema(input.key_schema)
            .set_provisioned_throughput(input.provisioned_throughput)
            .set_table_name(input.table_name)
            .send()
            .await
            .map_err(classify)
    }

    async fn describe_table(
        &self,
        input: operation::describe_table::DescribeTableInput,
    ) -> Result<operation::describe_table::DescribeTableOutput> {
        self.describe_table()
            .set_table_name(input.table_name)
            .send()
            .await
            .map_err(classify)
    }

    async fn update_table(
        &self,
        input: operation::update_table::UpdateTableInput,
    ) -> Result<operation::update_table::UpdateTableOutput> {
        self.update_table()
            .set_attribute_definitions(input.attribute_definitions)
            .set_billing_mode(input.billing_mode)
            .set_global_secondary_index_updates(input.global_secondary_index_updates)
            .set_provisioned_throughput(input.provisioned_throughput)
            .set_table_name(input.table_name)
            .send()
            .await
            .map_err(classify)
    }

    async fn delete_table(
        &self,
        input: operation::delete_table::DeleteTableInput,
    ) -> Result<operation::delete_table::DeleteTableOutput> {
        self.delete_table()
            .set_table_name(input.table_name)
            .send()
            .await
            .map_err(classify)
    }

    async fn transact_write_items(
        &self,
        input: operation::transact_write_items::TransactWriteItemsInput,
    ) -> Result<operation::transact_write_items::TransactWriteItemsOutput> {
        self.transact_write_items()
            .set_client_request_token(input.client_request_token)
            .set_return_consumed_capacity(input.return_consumed_capacity)
            .set_return_item_collection_metrics(input.return_item_collection_metrics)
            .set_transact_items(input.transact_items)
            .send()
            .await
            .map_err(|error| match error.as_service_error() {
                Some(
                    operation::transact_write_items::TransactWriteItemsError::TransactionCanceledException(
                        exception,
                    ),
                ) => cancelled(exception),
                _ => classify(error),
            })
    }

    async fn transact_get_items(
        &self,
        input: operation::transact_get_items::TransactGetItemsInput,
    ) -> Result<operation::transact_get_items::TransactGetItemsOutput> {
        self.transact_get_items()
            .set_return_consumed_capacity(input.return_consumed_capacity)
            .set_transact_items(input.transact_items)
            .send()
            .await
            .map_err(|error| match error.as_service_error() {
                Some(
                    operation::transact_get_items::TransactGetItemsError::TransactionCanceledException(
                        exception,
                    ),
                ) => cancelled(exception),
                _ => classify(error),
            })
    }
}
