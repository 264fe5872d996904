use crate::adapter::{AdapterConfig, NedbAdapter};
use crate::errors::AdapterResult;
use indexmap::IndexMap;

/// What the adapter needs to know about one ORM model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    collection_name: String,
}

impl ModelDescriptor {
    pub fn new(collection_name: &str) -> Self {
        ModelDescriptor {
            collection_name: collection_name.to_string(),
        }
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }
}

/// The ORM side of the adapter: its registered models.
///
/// # Examples
///
/// ```rust,ignore
/// let orm = Orm::new()
///     .model("User", "users")
///     .model("Post", "posts");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Orm {
    models: IndexMap<String, ModelDescriptor>,
}

impl Orm {
    pub fn new() -> Self {
        Orm::default()
    }

    /// Registers a model stored in `collection_name`.
    pub fn model(mut self, model_name: &str, collection_name: &str) -> Self {
        self.register_model(model_name, ModelDescriptor::new(collection_name));
        self
    }

    pub fn register_model(&mut self, model_name: &str, descriptor: ModelDescriptor) {
        self.models.insert(model_name.to_string(), descriptor);
    }

    pub fn models(&self) -> impl Iterator<Item = (&String, &ModelDescriptor)> {
        self.models.iter()
    }

    /// Distinct collection names, in model registration order.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(self.models.len());
        for descriptor in self.models.values() {
            if !names.iter().any(|name| name == descriptor.collection_name()) {
                names.push(descriptor.collection_name().to_string());
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// The ORM plugin hook: validates `config` once and returns the function the
/// ORM calls with itself to obtain an adapter.
pub fn adapter_factory(config: AdapterConfig) -> AdapterResult<impl Fn(&Orm) -> NedbAdapter> {
    config.validate()?;
    Ok(move |orm: &Orm| NedbAdapter::new(orm, config.clone()))
}
