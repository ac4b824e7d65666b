use crate::{
    common::{self, codec},
    error::{Error, Result},
};

use aws_sdk_dynamodb::types;
use serde::Serialize;
use std::{collections, ops};

/// Logical operator for combining conditions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogicalOperator {
    /// Logical AND - all conditions must be true.
    And,
    /// Logical OR - at least one condition must be true.
    Or,
}

impl ops::Deref for LogicalOperator {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// Comparison applied to a single attribute.
///
/// ```rust
/// use dynamodb_access::common::condition;
///
/// let eq = condition::Condition::Equals("value".to_string());
/// let gt = condition::Condition::GreaterThan(100);
/// let null: condition::Condition<String> = condition::Condition::Null;
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Condition<T> {
    /// Checks if an attribute begins with a specified prefix (string types only).
    BeginsWith(String),
    /// Checks if an attribute value is between two values (inclusive).
    Between(T, T),
    /// Checks if an attribute contains a specified value.
    Contains(T),
    /// Checks if an attribute value equals a specified value.
    Equals(T),
    /// Checks if an attribute value is greater than a specified value.
    GreaterThan(T),
    /// Checks if an attribute value is greater than or equal to a specified value.
    GreaterThanOrEqual(T),
    /// Checks if an attribute value is in a list of specified values.
    In(Vec<T>),
    /// Checks if an attribute value is less than a specified value.
    LessThan(T),
    /// Checks if an attribute value is less than or equal to a specified value.
    LessThanOrEqual(T),
    /// Checks if an attribute does not contain a specified value.
    NotContains(T),
    /// Checks if an attribute value does not equal a specified value.
    NotEqual(T),
    /// Checks if an attribute exists.
    NotNull,
    /// Checks if an attribute does not exist.
    Null,
}

impl<T: Serialize> Condition<T> {
    fn get_expression(
        self,
        path: &str,
        path_placeholder: &str,
        index: &mut usize,
    ) -> Result<(String, collections::HashMap<String, types::AttributeValue>)> {
        let mut expression_attribute_values = collections::HashMap::new();
        let mut insert = |operation: &str, value: types::AttributeValue, index: &mut usize| {
            let value_placeholder = common::value_placeholder(path, operation, index);
            expression_attribute_values.insert(value_placeholder.clone(), value);
            value_placeholder
        };
        let expression = match self {
            Self::BeginsWith(prefix) => {
                let value_placeholder =
                    insert("begins_with", types::AttributeValue::S(prefix), index);
                format!("begins_with({path_placeholder}, {value_placeholder})")
            }
            Self::Between(low, high) => {
                let low = insert("between", codec::encode(low)?, index);
                let high = insert("between", codec::encode(high)?, index);
                format!("{path_placeholder} BETWEEN {low} AND {high}")
            }
            Self::Contains(value) => {
                let value_placeholder = insert("contains", codec::encode(value)?, index);
                format!("contains({path_placeholder}, {value_placeholder})")
            }
            Self::Equals(value) => {
                let value_placeholder = insert("eq", codec::encode(value)?, index);
                format!("{path_placeholder} = {value_placeholder}")
            }
            Self::GreaterThan(value) => {
                let value_placeholder = insert("gt", codec::encode(value)?, index);
                format!("{path_placeholder} > {value_placeholder}")
            }
            Self::GreaterThanOrEqual(value) => {
                let value_placeholder = insert("gte", codec::encode(value)?, index);
                format!("{path_placeholder} >= {value_placeholder}")
            }
            Self::In(values) => {
                if values.is_empty() {
                    return Err(Error::Argument(format!("empty IN list for {path}")));
                }
                let mut placeholders = Vec::with_capacity(values.len());
                for value in values {
                    placeholders.push(insert("in", codec::encode(value)?, index));
                }
                format!("{path_placeholder} IN ({})", placeholders.join(", "))
            }
            Self::LessThan(value) => {
                let value_placeholder = insert("lt", codec::encode(value)?, index);
                format!("{path_placeholder} < {value_placeholder}")
            }
            Self::LessThanOrEqual(value) => {
                let value_placeholder = insert("lte", codec::encode(value)?, index);
                format!("{path_placeholder} <= {value_placeholder}")
            }
            Self::NotContains(value) => {
                let value_placeholder = insert("not_contains", codec::encode(value)?, index);
                format!("NOT contains({path_placeholder}, {value_placeholder})")
            }
            Self::NotEqual(value) => {
                let value_placeholder = insert("ne", codec::encode(value)?, index);
                format!("{path_placeholder} <> {value_placeholder}")
            }
            Self::NotNull => format!("attribute_exists({path_placeholder})"),
            Self::Null => format!("attribute_not_exists({path_placeholder})"),
        };
        Ok((expression, expression_attribute_values))
    }
}

/// Condition applied to an attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyCondition<T> {
    /// The condition to apply to the attribute.
    pub condition: Condition<T>,
    /// The name (or dotted path) of the attribute to apply the condition to.
    pub name: String,
}

impl<T: Serialize> KeyCondition<T> {
    fn get_expression_operation(self, index: &mut usize) -> Result<common::ExpressionInput> {
        let (path_placeholder, expression_attribute_names) =
            common::path_placeholder(&self.name);
        let (expression, expression_attribute_values) =
            self.condition
                .get_expression(&self.name, &path_placeholder, index)?;
        Ok(common::ExpressionInput {
            expression,
            expression_attribute_names,
            expression_attribute_values,
        })
    }

    /// Conjunction of key conditions, as used by key-condition expressions.
    pub(crate) fn get_conjunction(
        keys: Vec<Self>,
        index: &mut usize,
    ) -> Result<common::ExpressionInput> {
        let mut operations = Vec::with_capacity(keys.len());
        for key in keys {
            operations.push(key.get_expression_operation(index)?);
        }
        Ok(common::ExpressionInput::merge(&LogicalOperator::And, operations))
    }
}

/// Where a sub-expression sits, to decide whether it needs parentheses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Context {
    Root,
    Operator(LogicalOperator),
    Not,
}

/// Condition expression tree.
///
/// ```rust
/// use dynamodb_access::common::{ExpressionInput, condition::ConditionExpr};
///
/// let condition = ConditionExpr::NotExists("id".to_string())
///     .and(ConditionExpr::Equals("status".to_string(), "draft"));
/// let lowered = ExpressionInput::try_from(condition).unwrap();
/// assert_eq!(
///     lowered.expression,
///     "attribute_not_exists(#id) AND #status = :status_eq0"
/// );
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum ConditionExpr<T> {
    /// The attribute equals the value.
    Equals(String, T),
    /// The attribute exists.
    Exists(String),
    /// The attribute does not exist.
    NotExists(String),
    /// Any other comparison on an attribute.
    Compare(KeyCondition<T>),
    /// Both conditions hold.
    And(Box<ConditionExpr<T>>, Box<ConditionExpr<T>>),
    /// At least one condition holds.
    Or(Box<ConditionExpr<T>>, Box<ConditionExpr<T>>),
    /// The condition does not hold.
    Not(Box<ConditionExpr<T>>),
}

impl<T> ConditionExpr<T> {
    /// Conjunction of `self` and `other`.
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Disjunction of `self` and `other`.
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Conjunction of every condition; `None` when there is none.
    pub fn all(conditions: impl IntoIterator<Item = Self>) -> Option<Self> {
        conditions.into_iter().reduce(Self::and)
    }
}

impl<T: Serialize> ConditionExpr<T> {
    /// Lower the condition, continuing the placeholder counter at `index`.
    pub(crate) fn lower(self, index: &mut usize) -> Result<common::ExpressionInput> {
        self.get_expression_recursive(index, Context::Root)
    }

    fn get_expression_recursive(
        self,
        index: &mut usize,
        context: Context,
    ) -> Result<common::ExpressionInput> {
        let (operator, left, right) = match self {
            Self::Equals(name, value) => {
                return KeyCondition {
                    condition: Condition::Equals(value),
                    name,
                }
                .get_expression_operation(index);
            }
            Self::Exists(name) => {
                return KeyCondition {
                    condition: Condition::<T>::NotNull,
                    name,
                }
                .get_expression_operation(index);
            }
            Self::NotExists(name) => {
                return KeyCondition {
                    condition: Condition::<T>::Null,
                    name,
                }
                .get_expression_operation(index);
            }
            Self::Compare(key_condition) => return key_condition.get_expression_operation(index),
            Self::Not(inner) => {
                let mut operation = inner.get_expression_recursive(index, Context::Not)?;
                operation.expression = format!("NOT {}", operation.expression);
                return Ok(operation);
            }
            Self::And(left, right) => (LogicalOperator::And, left, right),
            Self::Or(left, right) => (LogicalOperator::Or, left, right),
        };
        let left = left.get_expression_recursive(index, Context::Operator(operator))?;
        let right = right.get_expression_recursive(index, Context::Operator(operator))?;
        let mut operation = common::ExpressionInput::merge(&operator, vec![left, right]);
        if !matches!(context, Context::Root) && context != Context::Operator(operator) {
            operation.expression = format!("({})", operation.expression);
        }
        Ok(operation)
    }
}

impl<T: Serialize> TryFrom<ConditionExpr<T>> for common::ExpressionInput {
    type Error = Error;

    fn try_from(condition: ConditionExpr<T>) -> Result<Self> {
        condition.lower(&mut 0)
    }
}

/// Every named attribute exists; `None` for no names.
///
/// ```rust
/// use dynamodb_access::common::condition;
///
/// assert!(condition::exists_all::<String, _, &str>([]).is_none());
/// ```
pub fn exists_all<T, I, S>(names: I) -> Option<ConditionExpr<T>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ConditionExpr::all(
        names
            .into_iter()
            .map(|name| ConditionExpr::Exists(name.into())),
    )
}

/// No named attribute exists; `None` for no names.
pub fn not_exists_all<T, I, S>(names: I) -> Option<ConditionExpr<T>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ConditionExpr::all(
        names
            .into_iter()
            .map(|name| ConditionExpr::NotExists(name.into())),
    )
}

/// Every named attribute equals its value; `None` for an empty mapping.
///
/// Entries are ordered by name first, so the same mapping always lowers to the same
/// expression whatever its iteration order.
pub fn equals_all<T, I, S>(values: I) -> Option<ConditionExpr<T>>
where
    I: IntoIterator<Item = (S, T)>,
    S: Into<String>,
{
    let mut values: Vec<(String, T)> = values
        .into_iter()
        .map(|(name, value)| (name.into(), value))
        .collect();
    values.sort_by(|(left, _), (right, _)| left.cmp(right));
    ConditionExpr::all(
        values
            .into_iter()
            .map(|(name, value)| ConditionExpr::Equals(name, value)),
    )
}
