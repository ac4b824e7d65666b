use crate::{
    common::{self, codec},
    error::{Error, Result},
};

use serde::Serialize;

/// Key component.
///
/// ```rust
/// use dynamodb_access::common::key;
///
/// let key = key::Key {
///     name: "id".to_string(),
///     value: "1".to_string(),
/// };
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Key<T> {
    /// The attribute name of the key.
    pub name: String,
    /// The value of the key.
    pub value: T,
}

/// Primary key (partition key and optional sort key).
///
/// ```rust
/// use dynamodb_access::common::key;
///
/// let keys = key::Keys {
///     partition_key: key::Key {
///         name: "id".to_string(),
///         value: "1".to_string(),
///     },
///     ..Default::default()
/// };
/// assert_eq!(keys.names(), vec!["id".to_string()]);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Keys<T> {
    /// The partition key (required).
    pub partition_key: Key<T>,
    /// The sort key (optional, only for tables with composite primary keys).
    pub sort_key: Option<Key<T>>,
}

impl<T> Keys<T> {
    /// The attribute names making up the key, partition key first.
    pub fn names(&self) -> Vec<String> {
        let mut names = vec![self.partition_key.name.clone()];
        if let Some(sort_key) = &self.sort_key {
            names.push(sort_key.name.clone());
        }
        names
    }
}

impl<T: Serialize> TryFrom<Keys<T>> for common::Item {
    type Error = Error;

    fn try_from(key: Keys<T>) -> Result<Self> {
        if key.partition_key.name.is_empty() {
            return Err(Error::Argument("missing partition key name".to_string()));
        }
        let partition_key_value = codec::encode(key.partition_key.value)?;
        let mut keys = Self::from([(key.partition_key.name, partition_key_value)]);
        if let Some(sort_key) = key.sort_key {
            let sort_key_value = codec::encode(sort_key.value)?;
            keys.insert(sort_key.name, sort_key_value);
        }
        Ok(keys)
    }
}
