/// Configuration types for container decoding.
///
/// This module defines the options used to customize a decode: which
/// subsystems to normalize, whether to parallelize page processing, and the
/// fallbacks applied when fragments omit optional fields.
use crate::datamodel::DataType;

/// Name of the implicit group assigned to bookmarks that declare none.
pub const DEFAULT_BOOKMARK_GROUP: &str = "Ungrouped";

/// Largest decompressed size accepted for a single archive entry.
pub const DEFAULT_MAX_ENTRY_SIZE: u64 = 256 * 1024 * 1024;

/// Minimum number of pages to justify parallel page processing.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// Configuration options for a decode.
///
/// # Examples
///
/// ```rust
/// use pbixkit::DecodeOptions;
///
/// // Create with defaults
/// let options = DecodeOptions::default();
///
/// // Or customize
/// let options = DecodeOptions::new()
///     .with_report(false)
///     .with_parallel(false);
/// ```
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Whether to normalize the data model (tables, relationships, calculations, queries)
    pub include_data_model: bool,
    /// Whether to normalize the report layer (pages, visuals, bookmarks, custom visuals)
    pub include_report: bool,
    /// Whether to process pages and sub-models on the rayon thread pool
    pub use_parallel: bool,
    /// Minimum page count before page processing is parallelized
    pub parallel_threshold: usize,
    /// Column type assumed when a column declares none
    pub default_column_type: DataType,
    /// Group name given to bookmarks outside any explicit group
    pub default_bookmark_group: String,
    /// Entries decompressing to more bytes than this are skipped with a warning
    pub max_entry_size: u64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            include_data_model: true,
            include_report: true,
            use_parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            default_column_type: DataType::String,
            default_bookmark_group: DEFAULT_BOOKMARK_GROUP.to_string(),
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
        }
    }
}

impl DecodeOptions {
    /// Create a new `DecodeOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to normalize the data model.
    #[inline]
    pub fn with_data_model(mut self, include: bool) -> Self {
        self.include_data_model = include;
        self
    }

    /// Set whether to normalize the report layer.
    #[inline]
    pub fn with_report(mut self, include: bool) -> Self {
        self.include_report = include;
        self
    }

    /// Set whether to use parallel processing.
    ///
    /// Output is identical either way; only scheduling changes.
    #[inline]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.use_parallel = parallel;
        self
    }

    /// Set the page count from which page processing is parallelized.
    #[inline]
    pub fn with_parallel_threshold(mut self, pages: usize) -> Self {
        self.parallel_threshold = pages;
        self
    }

    /// Set the column type assumed when none is declared.
    #[inline]
    pub fn with_default_column_type(mut self, data_type: DataType) -> Self {
        self.default_column_type = data_type;
        self
    }

    /// Set the name of the implicit bookmark group.
    #[inline]
    pub fn with_default_bookmark_group(mut self, name: impl Into<String>) -> Self {
        self.default_bookmark_group = name.into();
        self
    }

    /// Set the largest decompressed size accepted for one entry.
    #[inline]
    pub fn with_max_entry_size(mut self, bytes: u64) -> Self {
        self.max_entry_size = bytes;
        self
    }

    /// Returns true if `items` work units should be processed in parallel.
    #[inline]
    pub(crate) fn parallel_for(&self, items: usize) -> bool {
        self.use_parallel && items >= self.parallel_threshold.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DecodeOptions::default();
        assert!(options.include_data_model);
        assert!(options.include_report);
        assert_eq!(options.default_column_type, DataType::String);
        assert_eq!(options.default_bookmark_group, "Ungrouped");
        assert_eq!(options.max_entry_size, DEFAULT_MAX_ENTRY_SIZE);
        assert_eq!(DecodeOptions::new().with_max_entry_size(10).max_entry_size, 10);
    }

    #[test]
    fn test_parallel_for() {
        let options = DecodeOptions::new().with_parallel_threshold(3);
        assert!(!options.parallel_for(2));
        assert!(options.parallel_for(3));
        assert!(!options.with_parallel(false).parallel_for(100));
    }
}
