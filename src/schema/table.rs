use crate::{
    error::{Error, Result},
    store::{Executor, Store},
};

use aws_sdk_dynamodb::{operation, types};
use std::collections;
use tokio_util::sync::CancellationToken;

/// Scalar type of a key attribute.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ScalarType {
    /// String.
    String,
    /// Number.
    Number,
    /// Binary.
    Binary,
}

impl From<ScalarType> for types::ScalarAttributeType {
    fn from(scalar_type: ScalarType) -> Self {
        match scalar_type {
            ScalarType::String => Self::S,
            ScalarType::Number => Self::N,
            ScalarType::Binary => Self::B,
        }
    }
}

/// Role of an attribute in a key schema.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum KeyRole {
    /// Partition (hash) key.
    Partition,
    /// Sort (range) key.
    Sort,
}

impl From<KeyRole> for types::KeyType {
    fn from(role: KeyRole) -> Self {
        match role {
            KeyRole::Partition => Self::Hash,
            KeyRole::Sort => Self::Range,
        }
    }
}

/// A declared key attribute.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AttributeDefinition {
    /// The attribute name.
    pub name: String,
    /// The attribute type.
    pub scalar_type: ScalarType,
}

/// One element of a key schema.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct KeySchemaElement {
    /// The attribute name.
    pub name: String,
    /// The attribute role.
    pub role: KeyRole,
}

/// Provisioned capacity; `(0, 0)` means on-demand.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Capacity {
    /// Read capacity units.
    pub read_units: i64,
    /// Write capacity units.
    pub write_units: i64,
}

impl Capacity {
    /// Whether this is on-demand billing with no fixed provisioning.
    pub fn is_on_demand(&self) -> bool {
        self.read_units == 0 && self.write_units == 0
    }

    fn validate(&self) -> Result<()> {
        if self.is_on_demand() || (self.read_units > 0 && self.write_units > 0) {
            Ok(())
        } else {
            Err(Error::Argument(format!(
                "invalid capacity ({}, {})",
                self.read_units, self.write_units
            )))
        }
    }

    fn billing_mode(&self) -> types::BillingMode {
        if self.is_on_demand() {
            types::BillingMode::PayPerRequest
        } else {
            types::BillingMode::Provisioned
        }
    }

    fn provisioned_throughput(&self) -> Result<Option<types::ProvisionedThroughput>> {
        if self.is_on_demand() {
            return Ok(None);
        }
        let throughput = types::ProvisionedThroughput::builder()
            .read_capacity_units(self.read_units)
            .write_capacity_units(self.write_units)
            .build()?;
        Ok(Some(throughput))
    }
}

/// A global secondary index, projecting every attribute.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SecondaryIndex {
    /// The index name.
    pub name: String,
    /// The index key schema.
    pub key_schema: Vec<KeySchemaElement>,
}

fn validate_key_schema(
    owner: &str,
    key_schema: &[KeySchemaElement],
    declared: &collections::HashSet<&str>,
) -> Result<()> {
    let partitions = key_schema
        .iter()
        .filter(|element| element.role == KeyRole::Partition)
        .count();
    let sorts = key_schema.len() - partitions;
    if partitions != 1 || sorts > 1 {
        return Err(Error::Argument(format!(
            "{owner} needs exactly one partition key and at most one sort key"
        )));
    }
    if key_schema[0].role != KeyRole::Partition {
        return Err(Error::Argument(format!(
            "{owner} must list its partition key first"
        )));
    }
    if let Some(element) = key_schema
        .iter()
        .find(|element| !declared.contains(element.name.as_str()))
    {
        return Err(Error::Argument(format!(
            "{owner} key {} is not a declared attribute",
            element.name
        )));
    }
    Ok(())
}

fn key_schema(elements: Vec<KeySchemaElement>) -> Result<Vec<types::KeySchemaElement>> {
    elements
        .into_iter()
        .map(|element| {
            let element = types::KeySchemaElement::builder()
                .attribute_name(element.name)
                .key_type(element.role.into())
                .build()?;
            Ok(element)
        })
        .collect()
}

/// Everything needed to create a table.
///
/// ```rust
/// use dynamodb_access::schema::table::*;
///
/// let definition = TableDefinition {
///     table_name: "posts".to_string(),
///     attributes: vec![
///         AttributeDefinition { name: "user_id".to_string(), scalar_type: ScalarType::String },
///         AttributeDefinition { name: "created_at".to_string(), scalar_type: ScalarType::Number },
///     ],
///     key_schema: vec![
///         KeySchemaElement { name: "user_id".to_string(), role: KeyRole::Partition },
///         KeySchemaElement { name: "created_at".to_string(), role: KeyRole::Sort },
///     ],
///     ..Default::default()
/// };
/// assert!(definition.validate().is_ok());
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TableDefinition {
    /// The table name.
    pub table_name: String,
    /// The key attributes, in declaration order.
    pub attributes: Vec<AttributeDefinition>,
    /// The primary key, partition key first.
    pub key_schema: Vec<KeySchemaElement>,
    /// Table capacity; also applied to every index when provisioned.
    pub capacity: Capacity,
    /// Global secondary indexes.
    pub global_secondary_indexes: Vec<SecondaryIndex>,
}

impl TableDefinition {
    /// Check the definition before anything is sent.
    pub fn validate(&self) -> Result<()> {
        if self.table_name.is_empty() {
            return Err(Error::Argument("missing table name".to_string()));
        }
        self.capacity.validate()?;
        let declared: collections::HashSet<&str> = self
            .attributes
            .iter()
            .map(|attribute| attribute.name.as_str())
            .collect();
        if declared.len() != self.attributes.len() {
            return Err(Error::Argument("duplicate attribute definition".to_string()));
        }
        validate_key_schema(&self.table_name, &self.key_schema, &declared)?;
        for index in &self.global_secondary_indexes {
            validate_key_schema(&index.name, &index.key_schema, &declared)?;
        }
        Ok(())
    }
}

/// Create table operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CreateTable {
    /// The table to create.
    pub definition: TableDefinition,
}

impl CreateTable {
    /// Lower into the request sent to the store.
    pub fn build(self) -> Result<operation::create_table::CreateTableInput> {
        self.definition.validate()?;
        let definition = self.definition;
        let throughput = definition.capacity.provisioned_throughput()?;
        let attribute_definitions = definition
            .attributes
            .into_iter()
            .map(|attribute| {
                let attribute = types::AttributeDefinition::builder()
                    .attribute_name(attribute.name)
                    .attribute_type(attribute.scalar_type.into())
                    .build()?;
                Ok(attribute)
            })
            .collect::<Result<Vec<_>>>()?;
        let global_secondary_indexes = definition
            .global_secondary_indexes
            .into_iter()
            .map(|index| {
                let index = types::GlobalSecondaryIndex::builder()
                    .index_name(index.name)
                    .set_key_schema(Some(key_schema(index.key_schema)?))
                    .projection(
                        types::Projection::builder()
                            .projection_type(types::ProjectionType::All)
                            .build(),
                    )
                    .set_provisioned_throughput(throughput.clone())
                    .build()?;
                Ok(index)
            })
            .collect::<Result<Vec<_>>>()?;
        let input = operation::create_table::CreateTableInput::builder()
            .table_name(definition.table_name)
            .set_attribute_definitions(Some(attribute_definitions))
            .set_key_schema(Some(key_schema(definition.key_schema)?))
            .set_global_secondary_indexes(
                (!global_secondary_indexes.is_empty()).then_some(global_secondary_indexes),
            )
            .billing_mode(definition.capacity.billing_mode())
            .set_provisioned_throughput(throughput)
            .build()?;
        Ok(input)
    }

    /// Execute the create table operation.
    ///
    /// The table is usually still `CREATING` when this returns; see
    /// [`wait_for_table_status`](crate::schema::wait::wait_for_table_status).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.create_table", skip_all, err)
    )]
    pub async fn send<S: Store>(
        self,
        executor: &Executor<S>,
        cancel: &CancellationToken,
    ) -> Result<Option<types::TableDescription>> {
        let input = self.build()?;
        let output = executor.create_table(input, cancel).await?;
        Ok(output.table_description)
    }
}

/// Describe table operation.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct DescribeTable {
    /// The table to describe.
    pub table_name: String,
}

impl DescribeTable {
    /// Execute the describe table operation; an absent table is `None`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.describe_table", skip_all, err)
    )]
    pub async fn send<S: Store>(
        self,
        executor: &Executor<S>,
        cancel: &CancellationToken,
    ) -> Result<Option<types::TableDescription>> {
        let input = operation::describe_table::DescribeTableInput::builder()
            .table_name(self.table_name)
            .build()?;
        match executor.describe_table(input, cancel).await {
            Ok(output) => Ok(output.table),
            Err(Error::NotFound(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }
}

/// Update table operation.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct UpdateTable {
    /// The table to update.
    pub table_name: String,
    /// New capacity, or `None` to leave it as is.
    pub capacity: Option<Capacity>,
}

impl UpdateTable {
    /// Lower into the request sent to the store.
    pub fn build(self) -> Result<operation::update_table::UpdateTableInput> {
        let builder = operation::update_table::UpdateTableInput::builder().table_name(self.table_name);
        let builder = match self.capacity {
            Some(capacity) => {
                capacity.validate()?;
                builder
                    .billing_mode(capacity.billing_mode())
                    .set_provisioned_throughput(capacity.provisioned_throughput()?)
            }
            None => builder,
        };
        let input = builder.build()?;
        Ok(input)
    }

    /// Execute the update table operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.update_table", skip_all, err)
    )]
    pub async fn send<S: Store>(
        self,
        executor: &Executor<S>,
        cancel: &CancellationToken,
    ) -> Result<Option<types::TableDescription>> {
        let input = self.build()?;
        let output = executor.update_table(input, cancel).await?;
        Ok(output.table_description)
    }
}

/// Delete table operation.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct DeleteTable {
    /// The table to delete.
    pub table_name: String,
}

impl DeleteTable {
    /// Execute the delete table operation.
    ///
    /// Deleting a table that does not exist is not an error: it returns `Ok(None)`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.delete_table", skip_all, err)
    )]
    pub async fn send<S: Store>(
        self,
        executor: &Executor<S>,
        cancel: &CancellationToken,
    ) -> Result<Option<types::TableDescription>> {
        let input = operation::delete_table::DeleteTableInput::builder()
            .table_name(self.table_name)
            .build()?;
        match executor.delete_table(input, cancel).await {
            Ok(output) => Ok(output.table_description),
            Err(Error::NotFound(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }
}
