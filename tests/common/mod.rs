#![allow(dead_code)]

use async_trait::async_trait;
use aws_sdk_dynamodb::{operation, types};
use dynamodb_access::{
    error::{CancellationReason, Error, Result},
    metrics::{MetricsSink, OperationRecord},
    store::Store,
};
use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
    time::Duration,
};

pub type Item = HashMap<String, types::AttributeValue>;

type Names = Option<HashMap<String, String>>;
type Values = Option<HashMap<String, types::AttributeValue>>;

#[derive(Debug, Default)]
struct Table {
    key_names: Vec<String>,
    items: Vec<Item>,
    statuses: VecDeque<String>,
    index_statuses: HashMap<String, VecDeque<String>>,
}

impl Table {
    fn key_of(&self, item: &Item) -> Item {
        self.key_names
            .iter()
            .filter_map(|name| item.get(name).map(|value| (name.clone(), value.clone())))
            .collect()
    }

    fn position(&self, key: &Item) -> Option<usize> {
        self.items.iter().position(|item| &self.key_of(item) == key)
    }

    fn get(&self, key: &Item) -> Option<&Item> {
        self.position(key).map(|position| &self.items[position])
    }

    fn upsert(&mut self, item: Item) {
        let key = self.key_of(&item);
        match self.position(&key) {
            Some(position) => self.items[position] = item,
            None => self.items.push(item),
        }
    }

    fn remove(&mut self, key: &Item) -> Option<Item> {
        self.position(key).map(|position| self.items.remove(position))
    }

    fn next_status(&mut self) -> String {
        next(&mut self.statuses, "ACTIVE")
    }

    fn description(&mut self, name: &str) -> types::TableDescription {
        let indexes: Vec<_> = self
            .index_statuses
            .iter_mut()
            .map(|(index_name, statuses)| {
                types::GlobalSecondaryIndexDescription::builder()
                    .index_name(index_name.clone())
                    .index_status(types::IndexStatus::from(next(statuses, "ACTIVE").as_str()))
                    .build()
            })
            .collect();
        types::TableDescription::builder()
            .table_name(name)
            .table_status(types::TableStatus::from(self.next_status().as_str()))
            .set_global_secondary_indexes((!indexes.is_empty()).then_some(indexes))
            .build()
    }
}

fn next(statuses: &mut VecDeque<String>, default: &str) -> String {
    if statuses.len() > 1 {
        statuses.pop_front().unwrap()
    } else {
        statuses
            .front()
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}

/// In-memory store evaluating the expressions the crate emits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Table>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    delay: Mutex<Duration>,
    failures: Mutex<HashMap<&'static str, VecDeque<Error>>>,
    last_scan: Mutex<Option<operation::scan::ScanInput>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, name: &str, key_names: &[&str]) -> Self {
        self.tables.lock().unwrap().insert(
            name.to_string(),
            Table {
                key_names: key_names.iter().map(|name| name.to_string()).collect(),
                ..Default::default()
            },
        );
        self
    }

    pub fn insert(&self, table: &str, item: Item) {
        self.tables
            .lock()
            .unwrap()
            .get_mut(table)
            .unwrap()
            .upsert(item);
    }

    pub fn items(&self, table: &str) -> Vec<Item> {
        self.tables.lock().unwrap()[table].items.clone()
    }

    pub fn get(&self, table: &str, key: &Item) -> Option<Item> {
        self.tables.lock().unwrap()[table].get(key).cloned()
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.lock().unwrap().contains_key(table)
    }

    /// Statuses returned by successive describes; the last one repeats.
    pub fn script_table_status(&self, table: &str, statuses: &[&str]) {
        self.tables.lock().unwrap().get_mut(table).unwrap().statuses =
            statuses.iter().map(|status| status.to_string()).collect();
    }

    pub fn script_index_status(&self, table: &str, index: &str, statuses: &[&str]) {
        self.tables
            .lock()
            .unwrap()
            .get_mut(table)
            .unwrap()
            .index_statuses
            .insert(
                index.to_string(),
                statuses.iter().map(|status| status.to_string()).collect(),
            );
    }

    /// Make every call sleep for `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    /// Make the next call to `operation` fail with `error`.
    pub fn fail_next(&self, operation: &'static str, error: Error) {
        self.failures
            .lock()
            .unwrap()
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn last_scan(&self) -> Option<operation::scan::ScanInput> {
        self.last_scan.lock().unwrap().clone()
    }

    async fn enter(&self, operation: &'static str) -> Result<()> {
        *self.calls.lock().unwrap().entry(operation).or_default() += 1;
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(operation)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn with_table_mut<R>(&self, table: &str, f: impl FnOnce(&mut Table) -> Result<R>) -> Result<R> {
        let mut tables = self.tables.lock().unwrap();
        let table = tables
            .get_mut(table)
            .ok_or_else(|| Error::NotFound(format!("table {table}")))?;
        f(table)
    }
}

fn not_found(table: &str) -> Error {
    Error::NotFound(format!("table {table}"))
}

fn resolve<'a>(path: &str, item: &'a Item, names: &Names) -> Option<&'a types::AttributeValue> {
    let mut segments = path.trim().split('.').map(|placeholder| {
        names
            .as_ref()
            .and_then(|names| names.get(placeholder))
            .unwrap_or_else(|| panic!("unbound name {placeholder}"))
    });
    let mut value = item.get(segments.next()?)?;
    for segment in segments {
        value = value.as_m().ok()?.get(segment)?;
    }
    Some(value)
}

fn value<'a>(placeholder: &str, values: &'a Values) -> &'a types::AttributeValue {
    values
        .as_ref()
        .and_then(|values| values.get(placeholder.trim()))
        .unwrap_or_else(|| panic!("unbound value {placeholder}"))
}

fn number(value: &types::AttributeValue) -> Option<f64> {
    value.as_n().ok().and_then(|n| n.parse().ok())
}

fn compare(
    left: &types::AttributeValue,
    right: &types::AttributeValue,
) -> Option<std::cmp::Ordering> {
    match (left, right) {
        (types::AttributeValue::N(_), types::AttributeValue::N(_)) => {
            number(left)?.partial_cmp(&number(right)?)
        }
        (types::AttributeValue::S(left), types::AttributeValue::S(right)) => Some(left.cmp(right)),
        _ => (left == right).then_some(std::cmp::Ordering::Equal),
    }
}

fn holds(term: &str, item: &Item, names: &Names, values: &Values) -> bool {
    let term = term.trim();
    if let Some(inner) = term.strip_prefix("NOT ") {
        return !holds(inner, item, names, values);
    }
    if let Some(inner) = term
        .strip_prefix("attribute_exists(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return resolve(inner, item, names).is_some();
    }
    if let Some(inner) = term
        .strip_prefix("attribute_not_exists(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return resolve(inner, item, names).is_none();
    }
    if let Some(inner) = term
        .strip_prefix("begins_with(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let (path, placeholder) = inner.split_once(", ").unwrap();
        return match (resolve(path, item, names), value(placeholder, values)) {
            (Some(types::AttributeValue::S(actual)), types::AttributeValue::S(prefix)) => {
                actual.starts_with(prefix.as_str())
            }
            _ => false,
        };
    }
    for operator in [" <> ", " <= ", " >= ", " = ", " < ", " > "] {
        if let Some((path, placeholder)) = term.split_once(operator) {
            let Some(actual) = resolve(path, item, names) else {
                return false;
            };
            let ordering = compare(actual, value(placeholder, values));
            return match operator.trim() {
                "=" => ordering == Some(std::cmp::Ordering::Equal),
                "<>" => ordering != Some(std::cmp::Ordering::Equal),
                "<" => ordering == Some(std::cmp::Ordering::Less),
                "<=" => matches!(ordering, Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)),
                ">" => ordering == Some(std::cmp::Ordering::Greater),
                _ => matches!(ordering, Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)),
            };
        }
    }
    panic!("unsupported condition term {term}")
}

/// Evaluate a condition made of terms joined by ` AND ` and ` OR `, without parentheses.
fn evaluate(
    expression: Option<&str>,
    item: Option<&Item>,
    names: &Names,
    values: &Values,
) -> bool {
    let Some(expression) = expression else {
        return true;
    };
    let empty = Item::new();
    let item = item.unwrap_or(&empty);
    expression.split(" OR ").any(|conjunction| {
        conjunction
            .split(" AND ")
            .all(|term| holds(term, item, names, values))
    })
}

/// Apply `SET` (assign, increment, decrement, if_not_exists) and `REMOVE` clauses.
fn apply_update(item: &mut Item, expression: &str, names: &Names, values: &Values) {
    let (set, remove) = match expression.split_once(" REMOVE ") {
        Some((set, remove)) => (Some(set), Some(remove)),
        None if expression.starts_with("REMOVE ") => (None, expression.strip_prefix("REMOVE ")),
        None => (Some(expression), None),
    };
    if let Some(set) = set {
        let set = set.strip_prefix("SET ").expect("only SET and REMOVE are supported");
        for assignment in set.split(", ") {
            let (path, right) = assignment.split_once(" = ").unwrap();
            let name = names.as_ref().unwrap()[path.trim()].clone();
            let new_value = if let Some((_, placeholder)) = right.split_once(" + ") {
                let current = item.get(&name).and_then(number).unwrap_or(0.0);
                let delta = number(value(placeholder, values)).unwrap();
                types::AttributeValue::N((current + delta).to_string())
            } else if let Some((_, placeholder)) = right.split_once(" - ") {
                let current = item.get(&name).and_then(number).unwrap_or(0.0);
                let delta = number(value(placeholder, values)).unwrap();
                types::AttributeValue::N((current - delta).to_string())
            } else if let Some(inner) = right
                .strip_prefix("if_not_exists(")
                .and_then(|rest| rest.strip_suffix(')'))
            {
                let (_, placeholder) = inner.split_once(", ").unwrap();
                match item.get(&name) {
                    Some(current) => current.clone(),
                    None => value(placeholder, values).clone(),
                }
            } else {
                value(right, values).clone()
            };
            item.insert(name, new_value);
        }
    }
    if let Some(remove) = remove {
        for path in remove.split(", ") {
            let name = &names.as_ref().unwrap()[path.trim()];
            item.remove(name);
        }
    }
}

/// Split the candidates into one page: `(examined, last evaluated key)`.
fn page(
    table: &Table,
    candidates: Vec<Item>,
    start: Option<&Item>,
    limit: Option<i32>,
) -> (Vec<Item>, Option<Item>) {
    let begin = start
        .and_then(|start| candidates.iter().position(|item| &table.key_of(item) == start))
        .map_or(0, |position| position + 1);
    let end = match limit {
        Some(limit) => (begin + limit as usize).min(candidates.len()),
        None => candidates.len(),
    };
    let examined = candidates[begin..end].to_vec();
    let last_evaluated_key = (end < candidates.len())
        .then(|| examined.last().map(|item| table.key_of(item)))
        .flatten();
    (examined, last_evaluated_key)
}

fn cancellation_reason(failed: bool) -> CancellationReason {
    CancellationReason {
        code: Some(if failed { "ConditionalCheckFailed" } else { "None" }.to_string()),
        message: failed.then(|| "The conditional request failed".to_string()),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_item(
        &self,
        input: operation::get_item::GetItemInput,
    ) -> Result<operation::get_item::GetItemOutput> {
        self.enter("get_item").await?;
        let table_name = input.table_name.unwrap_or_default();
        let tables = self.tables.lock().unwrap();
        let table = tables.get(&table_name).ok_or_else(|| not_found(&table_name))?;
        let item = table.get(&input.key.unwrap_or_default()).cloned();
        Ok(operation::get_item::GetItemOutput::builder()
            .set_item(item)
            .build())
    }

    async fn put_item(
        &self,
        input: operation::put_item::PutItemInput,
    ) -> Result<operation::put_item::PutItemOutput> {
        self.enter("put_item").await?;
        let table_name = input.table_name.unwrap_or_default();
        self.with_table_mut(&table_name, |table| {
            let item = input.item.unwrap_or_default();
            let existing = table.get(&table.key_of(&item));
            if !evaluate(
                input.condition_expression.as_deref(),
                existing,
                &input.expression_attribute_names,
                &input.expression_attribute_values,
            ) {
                return Err(Error::ConditionFailed(
                    "The conditional request failed".to_string(),
                ));
            }
            table.upsert(item);
            Ok(operation::put_item::PutItemOutput::builder().build())
        })
    }

    async fn delete_item(
        &self,
        input: operation::delete_item::DeleteItemInput,
    ) -> Result<operation::delete_item::DeleteItemOutput> {
        self.enter("delete_item").await?;
        let table_name = input.table_name.unwrap_or_default();
        self.with_table_mut(&table_name, |table| {
            let key = input.key.unwrap_or_default();
            if !evaluate(
                input.condition_expression.as_deref(),
                table.get(&key),
                &input.expression_attribute_names,
                &input.expression_attribute_values,
            ) {
                return Err(Error::ConditionFailed(
                    "The conditional request failed".to_string(),
                ));
            }
            let removed = table.remove(&key);
            Ok(operation::delete_item::DeleteItemOutput::builder()
                .set_attributes(removed)
                .build())
        })
    }

    async fn update_item(
        &self,
        input: operation::update_item::UpdateItemInput,
    ) -> Result<operation::update_item::UpdateItemOutput> {
        self.enter("update_item").await?;
        let table_name = input.table_name.unwrap_or_default();
        self.with_table_mut(&table_name, |table| {
            let key = input.key.unwrap_or_default();
            if !evaluate(
                input.condition_expression.as_deref(),
                table.get(&key),
                &input.expression_attribute_names,
                &input.expression_attribute_values,
            ) {
                return Err(Error::ConditionFailed(
                    "The conditional request failed".to_string(),
                ));
            }
            let mut item = table.get(&key).cloned().unwrap_or_else(|| key.clone());
            apply_update(
                &mut item,
                input.update_expression.as_deref().unwrap_or_default(),
                &input.expression_attribute_names,
                &input.expression_attribute_values,
            );
            table.upsert(item.clone());
            Ok(operation::update_item::UpdateItemOutput::builder()
                .set_attributes(Some(item))
                .build())
        })
    }

    async fn scan(&self, input: operation::scan::ScanInput) -> Result<operation::scan::ScanOutput> {
        self.enter("scan").await?;
        *self.last_scan.lock().unwrap() = Some(input.clone());
        let table_name = input.table_name.clone().unwrap_or_default();
        let tables = self.tables.lock().unwrap();
        let table = tables.get(&table_name).ok_or_else(|| not_found(&table_name))?;
        let (examined, last_evaluated_key) = page(
            table,
            table.items.clone(),
            input.exclusive_start_key.as_ref(),
            input.limit,
        );
        let scanned_count = examined.len() as i32;
        let items: Vec<_> = examined
            .into_iter()
            .filter(|item| {
                evaluate(
                    input.filter_expression.as_deref(),
                    Some(item),
                    &input.expression_attribute_names,
                    &input.expression_attribute_values,
                )
            })
            .collect();
        Ok(operation::scan::ScanOutput::builder()
            .count(items.len() as i32)
            .scanned_count(scanned_count)
            .set_items(Some(items))
            .set_last_evaluated_key(last_evaluated_key)
            .build())
    }

    async fn query(
        &self,
        input: operation::query::QueryInput,
    ) -> Result<operation::query::QueryOutput> {
        self.enter("query").await?;
        let table_name = input.table_name.clone().unwrap_or_default();
        let tables = self.tables.lock().unwrap();
        let table = tables.get(&table_name).ok_or_else(|| not_found(&table_name))?;
        let mut candidates: Vec<_> = table
            .items
            .iter()
            .filter(|item| {
                evaluate(
                    input.key_condition_expression.as_deref(),
                    Some(item),
                    &input.expression_attribute_names,
                    &input.expression_attribute_values,
                )
            })
            .cloned()
            .collect();
        if input.scan_index_forward == Some(false) {
            candidates.reverse();
        }
        let (examined, last_evaluated_key) = page(
            table,
            candidates,
            input.exclusive_start_key.as_ref(),
            input.limit,
        );
        let scanned_count = examined.len() as i32;
        let items: Vec<_> = examined
            .into_iter()
            .filter(|item| {
                evaluate(
                    input.filter_expression.as_deref(),
                    Some(item),
                    &input.expression_attribute_names,
                    &input.expression_attribute_values,
                )
            })
            .collect();
        Ok(operation::query::QueryOutput::builder()
            .count(items.len() as i32)
            .scanned_count(scanned_count)
            .set_items(Some(items))
            .set_last_evaluated_key(last_evaluated_key)
            .build())
    }

    async fn create_table(
        &self,
        input: operation::create_table::CreateTableInput,
    ) -> Result<operation::create_table::CreateTableOutput> {
        self.enter("create_table").await?;
        let table_name = input.table_name.unwrap_or_default();
        let mut tables = self.tables.lock().unwrap();
        if tables.contains_key(&table_name) {
            return Err(Error::ResourceInUse(format!("table {table_name}")));
        }
        let mut table = Table {
            key_names: input
                .key_schema
                .unwrap_or_default()
                .into_iter()
                .map(|element| element.attribute_name)
                .collect(),
            statuses: VecDeque::from(["CREATING".to_string(), "ACTIVE".to_string()]),
            ..Default::default()
        };
        for index in input.global_secondary_indexes.unwrap_or_default() {
            table.index_statuses.insert(
                index.index_name,
                VecDeque::from(["CREATING".to_string(), "ACTIVE".to_string()]),
            );
        }
        let description = table.description(&table_name);
        tables.insert(table_name, table);
        Ok(operation::create_table::CreateTableOutput::builder()
            .table_description(description)
            .build())
    }

    async fn describe_table(
        &self,
        input: operation::describe_table::DescribeTableInput,
    ) -> Result<operation::describe_table::DescribeTableOutput> {
        self.enter("describe_table").await?;
        let table_name = input.table_name.unwrap_or_default();
        self.with_table_mut(&table_name, |table| {
            Ok(operation::describe_table::DescribeTableOutput::builder()
                .table(table.description(&table_name))
                .build())
        })
    }

    async fn update_table(
        &self,
        input: operation::update_table::UpdateTableInput,
    ) -> Result<operation::update_table::UpdateTableOutput> {
        self.enter("update_table").await?;
        let table_name = input.table_name.unwrap_or_default();
        self.with_table_mut(&table_name, |table| {
            table.statuses = VecDeque::from(["UPDATING".to_string(), "ACTIVE".to_string()]);
            Ok(operation::update_table::UpdateTableOutput::builder()
                .table_description(table.description(&table_name))
                .build())
        })
    }

    async fn delete_table(
        &self,
        input: operation::delete_table::DeleteTableInput,
    ) -> Result<operation::delete_table::DeleteTableOutput> {
        self.enter("delete_table").await?;
        let table_name = input.table_name.unwrap_or_default();
        let mut table = self
            .tables
            .lock()
            .unwrap()
            .remove(&table_name)
            .ok_or_else(|| not_found(&table_name))?;
        table.statuses = VecDeque::from(["DELETING".to_string()]);
        Ok(operation::delete_table::DeleteTableOutput::builder()
            .table_description(table.description(&table_name))
            .build())
    }

    async fn transact_write_items(
        &self,
        input: operation::transact_write_items::TransactWriteItemsInput,
    ) -> Result<operation::transact_write_items::TransactWriteItemsOutput> {
        self.enter("transact_write_items").await?;
        let items = input.transact_items.unwrap_or_default();
        let mut tables = self.tables.lock().unwrap();
        let mut reasons = Vec::with_capacity(items.len());
        for item in &items {
            let (table_name, key, condition, names, values) = if let Some(put) = &item.put {
                let table = tables.get(&put.table_name).ok_or_else(|| not_found(&put.table_name))?;
                (
                    &put.table_name,
                    table.key_of(&put.item),
                    put.condition_expression.as_deref(),
                    &put.expression_attribute_names,
                    &put.expression_attribute_values,
                )
            } else if let Some(delete) = &item.delete {
                (
                    &delete.table_name,
                    delete.key.clone(),
                    delete.condition_expression.as_deref(),
                    &delete.expression_attribute_names,
                    &delete.expression_attribute_values,
                )
            } else if let Some(update) = &item.update {
                (
                    &update.table_name,
                    update.key.clone(),
                    update.condition_expression.as_deref(),
                    &update.expression_attribute_names,
                    &update.expression_attribute_values,
                )
            } else if let Some(check) = &item.condition_check {
                (
                    &check.table_name,
                    check.key.clone(),
                    Some(check.condition_expression.as_str()),
                    &check.expression_attribute_names,
                    &check.expression_attribute_values,
                )
            } else {
                panic!("empty transaction item");
            };
            let table = tables.get(table_name).ok_or_else(|| not_found(table_name))?;
            reasons.push(cancellation_reason(!evaluate(
                condition,
                table.get(&key),
                names,
                values,
            )));
        }
        if reasons.iter().any(CancellationReason::is_cause) {
            return Err(Error::TransactionCancelled {
                reasons,
                message: "Transaction cancelled".to_string(),
            });
        }
        for item in items {
            if let Some(put) = item.put {
                tables.get_mut(&put.table_name).unwrap().upsert(put.item);
            } else if let Some(delete) = item.delete {
                tables.get_mut(&delete.table_name).unwrap().remove(&delete.key);
            } else if let Some(update) = item.update {
                let table = tables.get_mut(&update.table_name).unwrap();
                let mut current = table
                    .get(&update.key)
                    .cloned()
                    .unwrap_or_else(|| update.key.clone());
                apply_update(
                    &mut current,
                    &update.update_expression,
                    &update.expression_attribute_names,
                    &update.expression_attribute_values,
                );
                table.upsert(current);
            }
        }
        Ok(operation::transact_write_items::TransactWriteItemsOutput::builder().build())
    }

    async fn transact_get_items(
        &self,
        input: operation::transact_get_items::TransactGetItemsInput,
    ) -> Result<operation::transact_get_items::TransactGetItemsOutput> {
        self.enter("transact_get_items").await?;
        let tables = self.tables.lock().unwrap();
        let mut responses = Vec::new();
        for item in input.transact_items.unwrap_or_default() {
            let get = item.get.expect("get item");
            let table = tables.get(&get.table_name).ok_or_else(|| not_found(&get.table_name))?;
            responses.push(
                types::ItemResponse::builder()
                    .set_item(table.get(&get.key).cloned())
                    .build(),
            );
        }
        Ok(operation::transact_get_items::TransactGetItemsOutput::builder()
            .set_responses(Some(responses))
            .build())
    }
}

/// Sink keeping every record.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<(String, OperationRecord)>>,
}

impl RecordingSink {
    pub fn records(&self) -> Vec<(String, OperationRecord)> {
        self.records.lock().unwrap().clone()
    }
}

impl MetricsSink for RecordingSink {
    fn record(&self, category: &str, record: OperationRecord) {
        self.records
            .lock()
            .unwrap()
            .push((category.to_string(), record));
    }
}

pub fn s(value: &str) -> types::AttributeValue {
    types::AttributeValue::S(value.to_string())
}

pub fn n(value: i64) -> types::AttributeValue {
    types::AttributeValue::N(value.to_string())
}

pub fn item<const N: usize>(attributes: [(&str, types::AttributeValue); N]) -> Item {
    attributes
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}
