/// Identifier field every stored document carries.
pub const DOC_ID: &str = "_id";

/// Field path separator.
pub const FIELD_SEPARATOR: char = '.';

/// First character of every operator tag.
pub const OPERATOR_MARKER: char = '$';

/// Extension of the per-collection datastore file.
pub const DATASTORE_FILE_EXTENSION: &str = "nedb";

/// Foreign key templates handed to the ORM. `{modelName}` is substituted by the ORM.
pub const PLURAL_FOREIGN_KEY_TEMPLATE: &str = "_{modelName}Ids";
pub const SINGULAR_FOREIGN_KEY_TEMPLATE: &str = "_{modelName}Id";

// query operators
pub const OP_EQ: &str = "$eq";
pub const OP_NE: &str = "$ne";
pub const OP_GT: &str = "$gt";
pub const OP_GTE: &str = "$gte";
pub const OP_LT: &str = "$lt";
pub const OP_LTE: &str = "$lte";
pub const OP_IN: &str = "$in";
pub const OP_NIN: &str = "$nin";
pub const OP_NOT: &str = "$not";
pub const OP_NOT_IN: &str = "$notIn";
pub const OP_EXISTS: &str = "$exists";
pub const OP_REGEX: &str = "$regex";
pub const OP_AND: &str = "$and";
pub const OP_OR: &str = "$or";

// update operators
pub const OP_SET: &str = "$set";
pub const OP_UNSET: &str = "$unset";
pub const OP_INC: &str = "$inc";
pub const OP_PUSH: &str = "$push";
pub const OP_PULL: &str = "$pull";

/// Sort direction that yields ascending order. Every other direction sorts descending.
pub const SORT_ASCENDING: &str = "asc";
pub const SORT_DESCENDING: &str = "desc";
