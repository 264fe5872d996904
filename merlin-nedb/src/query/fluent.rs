use crate::common::{Pattern, Value};
use crate::errors::AdapterResult;
use crate::query::{FilterNode, FilterTree, Operator, OperatorSet};

/// Creates a fluent filter builder for the specified field path.
///
/// Every terminal method returns a single-entry [FilterTree]; combine trees
/// with [FilterTree::and]. Operators on the same field are merged.
///
/// ```rust,ignore
/// let filter = field("age").gte(18).and(field("age").lt(65)).and(field("name").eq("test"));
/// ```
pub fn field(field_path: &str) -> FluentFilter {
    FluentFilter {
        field_path: field_path.to_string(),
    }
}

/// A fluent builder for conditions on one field path.
pub struct FluentFilter {
    field_path: String,
}

impl FluentFilter {
    /// Literal equality.
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> FilterTree {
        self.node(FilterNode::Literal(value.into()))
    }

    /// Not equal, in the ORM's `$not` spelling.
    #[inline]
    pub fn not<T: Into<Value>>(self, value: T) -> FilterTree {
        self.operator(Operator::Not, value)
    }

    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> FilterTree {
        self.operator(Operator::Gt, value)
    }

    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> FilterTree {
        self.operator(Operator::Gte, value)
    }

    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> FilterTree {
        self.operator(Operator::Lt, value)
    }

    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> FilterTree {
        self.operator(Operator::Lte, value)
    }

    /// Inclusive range, `lower <= field <= upper`.
    pub fn between<L: Into<Value>, U: Into<Value>>(self, lower: L, upper: U) -> FilterTree {
        let set = OperatorSet::new()
            .with(Operator::Gte, lower)
            .with(Operator::Lte, upper);
        self.node(FilterNode::Operator(set))
    }

    /// The field value is one of `values`.
    #[inline]
    pub fn in_array<T: Into<Value>>(self, values: Vec<T>) -> FilterTree {
        self.operator(Operator::In, Value::from_vec(values))
    }

    /// The field value is none of `values`, in the ORM's `$notIn` spelling.
    #[inline]
    pub fn not_in<T: Into<Value>>(self, values: Vec<T>) -> FilterTree {
        self.operator(Operator::NotIn, Value::from_vec(values))
    }

    #[inline]
    pub fn exists(self, exists: bool) -> FilterTree {
        self.operator(Operator::Exists, exists)
    }

    /// Regular expression match; fails if `pattern` does not compile.
    pub fn regex(self, pattern: &str) -> AdapterResult<FilterTree> {
        let pattern = Pattern::new(pattern)?;
        Ok(self.node(FilterNode::Regex(pattern)))
    }

    /// Implicit equality on the fields of an embedded document.
    #[inline]
    pub fn matches(self, sub_tree: FilterTree) -> FilterTree {
        self.node(FilterNode::SubTree(sub_tree))
    }

    /// Any operator tag, including ones the adapter does not know.
    pub fn op<T: Into<Value>>(self, tag: &str, operand: T) -> AdapterResult<FilterTree> {
        let operator = Operator::from_tag(tag)?;
        Ok(self.operator(operator, operand))
    }

    fn operator<T: Into<Value>>(self, operator: Operator, operand: T) -> FilterTree {
        self.node(FilterNode::Operator(OperatorSet::new().with(operator, operand)))
    }

    fn node(self, node: FilterNode) -> FilterTree {
        let mut tree = FilterTree::new();
        tree.insert(self.field_path, node);
        tree
    }
}
