use crate::{
    common::{self, codec},
    error::{Error, Result},
    store::{Executor, Store},
    write,
};

use aws_sdk_dynamodb::operation;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// SET operation for updating attributes.
///
/// ```rust
/// use dynamodb_access::write::update_item;
///
/// let assign = update_item::SetInput::Assign("value".to_string());
/// let increment = update_item::SetInput::Increment(10);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum SetInput<T> {
    /// Assign a new value to the attribute (replaces existing value).
    Assign(T),
    /// Increment a numeric attribute by the specified value.
    Increment(T),
    /// Decrement a numeric attribute by the specified value.
    Decrement(T),
    /// Append values to the end of a list attribute.
    ListAppend(T),
    /// Prepend values to the beginning of a list attribute.
    ListPrepend(T),
    /// Assign a value only if the attribute doesn't exist.
    IfNotExists(T),
}

impl<T> SetInput<T> {
    fn operation(&self) -> &'static str {
        match self {
            Self::Assign(_) => "set",
            Self::Increment(_) => "inc",
            Self::Decrement(_) => "dec",
            Self::ListAppend(_) => "append",
            Self::ListPrepend(_) => "prepend",
            Self::IfNotExists(_) => "if_not_exists",
        }
    }

    fn get_set_expression(self, path: &str, value_placeholder: &str) -> (T, String) {
        match self {
            Self::Assign(value) => (value, format!("{path} = {value_placeholder}")),
            Self::Increment(value) => (value, format!("{path} = {path} + {value_placeholder}")),
            Self::Decrement(value) => (value, format!("{path} = {path} - {value_placeholder}")),
            Self::ListAppend(value) => (
                value,
                format!("{path} = list_append({path}, {value_placeholder})"),
            ),
            Self::ListPrepend(value) => (
                value,
                format!("{path} = list_append({value_placeholder}, {path})"),
            ),
            Self::IfNotExists(value) => (
                value,
                format!("{path} = if_not_exists({path}, {value_placeholder})"),
            ),
        }
    }
}

/// Operand of an ADD or DELETE clause.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand<T> {
    /// A plain value, e.g. the number ADD adds.
    Value(T),
    /// Set elements of the given kind; a scalar is a single element.
    Set(codec::SetKind, T),
}

impl<T: Serialize> Operand<T> {
    fn encode(self) -> Result<aws_sdk_dynamodb::types::AttributeValue> {
        match self {
            Self::Value(value) => codec::encode(value),
            Self::Set(kind, value) => codec::encode_as_set(value, kind),
        }
    }
}

/// Update expression: one independent group of clauses per category.
///
/// Attribute names may be dotted paths. A name appears at most once per category; the same name
/// may appear in several categories, in which case the store decides whether that is valid.
///
/// ```rust
/// use dynamodb_access::{common::codec::SetKind, write::update_item};
///
/// let mut update: update_item::UpdateExpression<serde_json::Value> = Default::default();
/// update.remove.insert("draft".to_string());
/// update.set.insert(
///     "views".to_string(),
///     update_item::SetInput::Increment(1.into()),
/// );
/// update.add.insert(
///     "tags".to_string(),
///     update_item::Operand::Set(SetKind::String, "new".into()),
/// );
/// let lowered = update.build_update().unwrap();
/// assert_eq!(
///     lowered.expression,
///     "SET #views = #views + :views_inc0 REMOVE #draft ADD #tags :tags_add1"
/// );
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateExpression<T> {
    /// Attributes to remove.
    pub remove: IndexSet<String>,
    /// Attributes to set.
    pub set: IndexMap<String, SetInput<T>>,
    /// Numbers to add to, or set elements to add.
    pub add: IndexMap<String, Operand<T>>,
    /// Set elements to delete.
    pub delete: IndexMap<String, Operand<T>>,
}

impl<T> Default for UpdateExpression<T> {
    fn default() -> Self {
        Self {
            remove: IndexSet::new(),
            set: IndexMap::new(),
            add: IndexMap::new(),
            delete: IndexMap::new(),
        }
    }
}

impl<T> UpdateExpression<T> {
    /// Whether no clause at all is present.
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.set.is_empty() && self.add.is_empty() && self.delete.is_empty()
    }
}

fn get_clause(keyword: &str, operations: Vec<common::ExpressionInput>) -> common::ExpressionInput {
    let mut operation = common::ExpressionInput::merge(", ", operations);
    if !operation.expression.is_empty() {
        operation.expression = format!("{keyword} {}", operation.expression);
    }
    operation
}

fn get_operand_clause<T: Serialize>(
    keyword: &str,
    operation_name: &str,
    operands: IndexMap<String, Operand<T>>,
    index: &mut usize,
) -> Result<common::ExpressionInput> {
    let mut operations = Vec::with_capacity(operands.len());
    for (name, operand) in operands {
        let (path_placeholder, expression_attribute_names) = common::path_placeholder(&name);
        let value_placeholder = common::value_placeholder(&name, operation_name, index);
        let value = operand.encode()?;
        operations.push(common::ExpressionInput {
            expression: format!("{path_placeholder} {value_placeholder}"),
            expression_attribute_names,
            expression_attribute_values: [(value_placeholder, value)].into(),
        });
    }
    Ok(get_clause(keyword, operations))
}

impl<T: Serialize> UpdateExpression<T> {
    /// Lower the update, continuing the placeholder counter at `index`.
    ///
    /// Clauses come out in SET, REMOVE, ADD, DELETE order.
    pub(crate) fn lower(self, index: &mut usize) -> Result<common::ExpressionInput> {
        if self.is_empty() {
            return Err(Error::Argument("empty update expression".to_string()));
        }
        let mut set_operations = Vec::with_capacity(self.set.len());
        for (name, set_input) in self.set {
            let (path_placeholder, expression_attribute_names) = common::path_placeholder(&name);
            let value_placeholder = common::value_placeholder(&name, set_input.operation(), index);
            let (value, expression) =
                set_input.get_set_expression(&path_placeholder, &value_placeholder);
            let value = codec::encode(value)?;
            set_operations.push(common::ExpressionInput {
                expression,
                expression_attribute_names,
                expression_attribute_values: [(value_placeholder, value)].into(),
            });
        }
        let remove_operations = self
            .remove
            .into_iter()
            .map(|name| {
                let (expression, expression_attribute_names) = common::path_placeholder(&name);
                common::ExpressionInput {
                    expression,
                    expression_attribute_names,
                    ..Default::default()
                }
            })
            .collect();
        let clauses = vec![
            get_clause("SET", set_operations),
            get_clause("REMOVE", remove_operations),
            get_operand_clause("ADD", "add", self.add, index)?,
            get_operand_clause("DELETE", "delete", self.delete, index)?,
        ];
        Ok(common::ExpressionInput::merge(" ", clauses))
    }

    /// Lower the update into a single expression.
    pub fn build_update(self) -> Result<common::ExpressionInput> {
        self.lower(&mut 0)
    }
}

impl<T: Serialize> TryFrom<UpdateExpression<T>> for common::ExpressionInput {
    type Error = Error;

    fn try_from(update_expression: UpdateExpression<T>) -> Result<Self> {
        update_expression.build_update()
    }
}

/// update item operation
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct UpdateItemInput {
    pub(crate) keys: common::Item,
    pub(crate) update_expression: String,
    pub(crate) write_operation: write::common::WriteInput,
}

/// Update item operation.
///
/// ```rust,no_run
/// use dynamodb_access::{common, store::Executor, write};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(executor: &Executor<aws_sdk_dynamodb::Client>) -> dynamodb_access::error::Result<()> {
/// let mut update = write::update_item::UpdateExpression::default();
/// update.set.insert(
///     "name".to_string(),
///     write::update_item::SetInput::Assign("New".to_string()),
/// );
/// let update_item = write::update_item::UpdateItem {
///     keys: common::key::Keys {
///         partition_key: common::key::Key {
///             name: "id".to_string(),
///             value: "1".to_string(),
///         },
///         ..Default::default()
///     },
///     update,
///     write_args: write::common::WriteArgs {
///         table_name: "users".to_string(),
///         ..Default::default()
///     },
/// };
/// update_item.send(executor, &CancellationToken::new()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateItem<T> {
    /// The primary key of the item to update.
    pub keys: common::key::Keys<T>,
    /// The changes to make.
    pub update: UpdateExpression<T>,
    /// Additional write operation arguments (table name, condition, return values, etc.).
    pub write_args: write::common::WriteArgs<T>,
}

impl<T: Serialize> TryFrom<UpdateItem<T>> for UpdateItemInput {
    type Error = Error;

    fn try_from(update_item: UpdateItem<T>) -> Result<Self> {
        let keys = update_item.keys.try_into()?;
        let mut index = 0;
        let operation = update_item.update.lower(&mut index)?;
        let mut write_operation = update_item.write_args.lower(&mut index)?;
        let update_expression = write_operation.merge_expression(operation);
        let operation = Self {
            keys,
            update_expression,
            write_operation,
        };
        Ok(operation)
    }
}

impl<T: Serialize> UpdateItem<T> {
    /// Execute the update item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.update_item", skip_all, err)
    )]
    pub async fn send<S: Store>(
        self,
        executor: &Executor<S>,
        cancel: &CancellationToken,
    ) -> Result<operation::update_item::UpdateItemOutput> {
        let update_item: UpdateItemInput = self.try_into()?;
        let builder = operation::update_item::UpdateItemInput::builder()
            .set_key(Some(update_item.keys))
            .update_expression(update_item.update_expression);
        let input = crate::apply_write_operation!(builder, update_item.write_operation).build()?;
        executor.update_item(input, cancel).await
    }
}
