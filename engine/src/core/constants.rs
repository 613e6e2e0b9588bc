// =============================================================================
// Library Identity
// =============================================================================

/// Library name in lowercase (for log filters and identifiers)
pub const APP_NAME_LOWER: &str = "filterkit";

// =============================================================================
// Environment Variables
// =============================================================================

/// Environment variable for the log filter (falls back to RUST_LOG)
pub const ENV_LOG: &str = "FILTERKIT_LOG";

/// Environment variable for the maximum relation depth of field paths
pub const ENV_MAX_DEPTH: &str = "FILTERKIT_MAX_DEPTH";

/// Environment variable for the default page size
pub const ENV_PAGE_SIZE: &str = "FILTERKIT_PAGE_SIZE";

/// Environment variable for the hybrid row-count threshold
pub const ENV_HYBRID_THRESHOLD: &str = "FILTERKIT_HYBRID_THRESHOLD";

/// Environment variable for the minimum input size evaluated in parallel
pub const ENV_PARALLEL_MIN_RECORDS: &str = "FILTERKIT_PARALLEL_MIN_RECORDS";

/// Environment variable that rejects unknown field paths when set to true
pub const ENV_STRICT_FIELDS: &str = "FILTERKIT_STRICT_FIELDS";

// =============================================================================
// Engine Defaults
// =============================================================================

/// Maximum number of segments in a field path
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Page size used when the caller supplies a non-positive one
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Estimated row count at or below which the hybrid selector evaluates in memory
pub const DEFAULT_HYBRID_THRESHOLD: u64 = 10_000;

/// Inputs smaller than this are filtered on the calling thread
pub const DEFAULT_PARALLEL_MIN_RECORDS: usize = 4_096;

// =============================================================================
// Specification Limits
// =============================================================================

/// Maximum size of a filter specification JSON document in bytes (64KB)
pub const MAX_SPEC_JSON_SIZE: usize = 64 * 1024;

/// Maximum number of filters in one specification
pub const MAX_FILTERS: usize = 50;

// =============================================================================
// SQL Generation
// =============================================================================

/// Alias prefix for joined relation tables
pub const JOIN_ALIAS_PREFIX: &str = "j_";

/// Separator between relation path segments in join and projection aliases
pub const ALIAS_SEPARATOR: &str = "__";

// =============================================================================
// Time
// =============================================================================

/// Microseconds in one day
pub const MICROS_PER_DAY: i64 = 86_400_000_000;
