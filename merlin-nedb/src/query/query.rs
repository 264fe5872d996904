use crate::common::{Document, DOC_ID};
use crate::query::{FilterTree, SortSpec};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Transform applied to the complete `find` result batch before streaming.
pub type PostFilter = Arc<dyn Fn(Vec<Document>) -> Vec<Document> + Send + Sync>;

/// Pagination and ordering of an [AbstractQuery].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub(crate) offset: Option<u64>,
    pub(crate) limit: Option<u64>,
    pub(crate) sort: Option<SortSpec>,
}

impl QueryOptions {
    pub fn new() -> Self {
        QueryOptions::default()
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }
}

/// A backend-agnostic query: what to match, and how to page and order it.
///
/// # Examples
///
/// ```rust,ignore
/// let query = AbstractQuery::new(field("name").eq("test"))
///     .offset(5)
///     .limit(10)
///     .sort(SortSpec::new().then(desc("created")))
///     .project(vec!["name"]);
/// ```
#[derive(Clone, Default)]
pub struct AbstractQuery {
    filter: FilterTree,
    options: QueryOptions,
    post_filter: Option<PostFilter>,
}

impl AbstractQuery {
    pub fn new(filter: FilterTree) -> Self {
        AbstractQuery {
            filter,
            options: QueryOptions::default(),
            post_filter: None,
        }
    }

    /// A query matching every record.
    pub fn all() -> Self {
        AbstractQuery::new(FilterTree::new())
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.options.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.options.limit = Some(limit);
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.options.sort = Some(sort);
        self
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    /// Installs the transform run over the `find` batch. Replaces any earlier one.
    pub fn post_filter<F>(mut self, post_filter: F) -> Self
    where
        F: Fn(Vec<Document>) -> Vec<Document> + Send + Sync + 'static,
    {
        self.post_filter = Some(Arc::new(post_filter));
        self
    }

    /// Keeps only the named top-level fields (and `_id`) of every found record.
    pub fn project(self, fields: Vec<&str>) -> Self {
        let mut keep: Vec<String> = fields.into_iter().map(str::to_string).collect();
        if !keep.iter().any(|f| f == DOC_ID) {
            keep.push(DOC_ID.to_string());
        }

        self.post_filter(move |records| {
            records
                .into_iter()
                .map(|record| {
                    record
                        .into_iter()
                        .filter(|(key, _)| keep.contains(key))
                        .collect::<Document>()
                })
                .collect()
        })
    }

    pub fn filter(&self) -> &FilterTree {
        &self.filter
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Runs the post-filter over `records`; identity when none is installed.
    pub fn apply_post_filter(&self, records: Vec<Document>) -> Vec<Document> {
        match &self.post_filter {
            Some(post_filter) => post_filter(records),
            None => records,
        }
    }
}

impl Debug for AbstractQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbstractQuery")
            .field("filter", &self.filter)
            .field("options", &self.options)
            .field("post_filter", &self.post_filter.is_some())
            .finish()
    }
}

impl From<FilterTree> for AbstractQuery {
    fn from(filter: FilterTree) -> Self {
        AbstractQuery::new(filter)
    }
}
