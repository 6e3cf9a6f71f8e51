//! Strongly-typed query identifier.

use crate::identifier::{check_file_safe, define_identifier};

define_identifier! {
    /// Identifier of a catalog query.
    ///
    /// Stamped onto every record as `_query_id` and used to derive output
    /// file names, so it must be safe to embed in a path component.
    pub struct QueryId;
    validate = check_file_safe;
}
