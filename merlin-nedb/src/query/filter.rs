use crate::common::{
    Document, Pattern, Value, OPERATOR_MARKER, OP_EQ, OP_EXISTS, OP_GT, OP_GTE, OP_IN, OP_LT,
    OP_LTE, OP_NE, OP_NIN, OP_NOT, OP_NOT_IN, OP_REGEX,
};
use crate::errors::{AdapterError, AdapterResult, ErrorKind};
use indexmap::IndexMap;
use std::fmt::{Display, Formatter};

/// A comparison operator of the abstract filter vocabulary.
///
/// `Not` and `NotIn` are the ORM's spelling of "not equal" and "not
/// contained in"; the datastore spells them `$ne` and `$nin`, which are
/// also accepted here and pass through untouched. Tags the adapter has no
/// special knowledge of are carried as [Operator::Custom].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Not,
    NotIn,
    Exists,
    Regex,
    Custom(String),
}

impl Operator {
    /// Parses an operator tag such as `$gt`.
    ///
    /// Fails with [ErrorKind::InvalidQuery] if the tag does not start with `$`.
    pub fn from_tag(tag: &str) -> AdapterResult<Operator> {
        if !tag.starts_with(OPERATOR_MARKER) || tag.len() < 2 {
            log::error!("Invalid operator tag {:?}", tag);
            return Err(AdapterError::new(
                &format!("Operator tag '{}' must start with '{}'", tag, OPERATOR_MARKER),
                ErrorKind::InvalidQuery,
            ));
        }

        Ok(match tag {
            OP_EQ => Operator::Eq,
            OP_NE => Operator::Ne,
            OP_GT => Operator::Gt,
            OP_GTE => Operator::Gte,
            OP_LT => Operator::Lt,
            OP_LTE => Operator::Lte,
            OP_IN => Operator::In,
            OP_NIN => Operator::Nin,
            OP_NOT => Operator::Not,
            OP_NOT_IN => Operator::NotIn,
            OP_EXISTS => Operator::Exists,
            OP_REGEX => Operator::Regex,
            other => Operator::Custom(other.to_string()),
        })
    }

    pub fn tag(&self) -> &str {
        match self {
            Operator::Eq => OP_EQ,
            Operator::Ne => OP_NE,
            Operator::Gt => OP_GT,
            Operator::Gte => OP_GTE,
            Operator::Lt => OP_LT,
            Operator::Lte => OP_LTE,
            Operator::In => OP_IN,
            Operator::Nin => OP_NIN,
            Operator::Not => OP_NOT,
            Operator::NotIn => OP_NOT_IN,
            Operator::Exists => OP_EXISTS,
            Operator::Regex => OP_REGEX,
            Operator::Custom(tag) => tag,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Operators applied to one field, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperatorSet {
    operators: IndexMap<Operator, Value>,
}

impl OperatorSet {
    pub fn new() -> Self {
        OperatorSet {
            operators: IndexMap::new(),
        }
    }

    /// Adds an operator, replacing the operand of an existing one.
    pub fn with<T: Into<Value>>(mut self, operator: Operator, operand: T) -> Self {
        self.operators.insert(operator, operand.into());
        self
    }

    pub fn insert<T: Into<Value>>(&mut self, operator: Operator, operand: T) -> Option<Value> {
        self.operators.insert(operator, operand.into())
    }

    pub fn get(&self, operator: &Operator) -> Option<&Value> {
        self.operators.get(operator)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Operator, &Value)> {
        self.operators.iter()
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    fn merge(&mut self, other: OperatorSet) {
        self.operators.extend(other.operators);
    }
}

/// The condition attached to one field path of a [FilterTree].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// Equality with a literal value.
    Literal(Value),
    /// One or more comparison operators.
    Operator(OperatorSet),
    /// Regular expression match.
    Regex(Pattern),
    /// Implicit equality on the fields of an embedded document.
    SubTree(FilterTree),
}

/// A mapping from field path to [FilterNode]; all entries must hold.
///
/// Field paths are unique per level. Inserting a path twice replaces the
/// earlier node, except that two operator nodes are merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterTree {
    fields: IndexMap<String, FilterNode>,
}

impl FilterTree {
    /// An empty tree, matching every record.
    pub fn new() -> Self {
        FilterTree {
            fields: IndexMap::new(),
        }
    }

    pub fn insert<K: Into<String>>(&mut self, path: K, node: FilterNode) {
        let path = path.into();
        if let FilterNode::Operator(incoming) = node {
            if let Some(FilterNode::Operator(existing)) = self.fields.get_mut(&path) {
                existing.merge(incoming);
                return;
            }
            self.fields.insert(path, FilterNode::Operator(incoming));
            return;
        }
        self.fields.insert(path, node);
    }

    /// Combines two trees; both sets of conditions must hold.
    pub fn and(mut self, other: FilterTree) -> FilterTree {
        for (path, node) in other.fields {
            self.insert(path, node);
        }
        self
    }

    pub fn get(&self, path: &str) -> Option<&FilterNode> {
        self.fields.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterNode)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builds a tree of implicit equalities from a plain document.
///
/// Embedded documents become [FilterNode::SubTree]s, regex values become
/// [FilterNode::Regex] and everything else a [FilterNode::Literal]. Operator
/// nodes are never inferred from keys; build them explicitly.
impl From<Document> for FilterTree {
    fn from(document: Document) -> Self {
        let mut tree = FilterTree::new();
        for (key, value) in document {
            let node = match value {
                Value::Document(doc) => FilterNode::SubTree(FilterTree::from(doc)),
                Value::Regex(pattern) => FilterNode::Regex(pattern),
                other => FilterNode::Literal(other),
            };
            tree.insert(key, node);
        }
        tree
    }
}
