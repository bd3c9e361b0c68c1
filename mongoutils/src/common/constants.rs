// doc constants
pub const DOC_ID: &str = "_id";
pub const FIELD_SEPARATOR: char = '.';
pub const OPERATOR_PREFIX: char = '$';

// logical operators whose operands are nested filters
pub const LOGICAL_OPERATORS: [&str; 3] = ["$and", "$or", "$nor"];

// timeout constants (milliseconds)
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_RESOURCE_TIMEOUT_MS: u64 = 3000;

// driver error codes
pub const NAMESPACE_EXISTS_CODE: i32 = 48;

// database used for connectivity checks
pub const ADMIN_DATABASE: &str = "admin";
