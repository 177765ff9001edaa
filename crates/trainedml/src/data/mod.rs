//! Dataset loading, caching, splitting and task detection.
pub mod cache;
pub mod loader;
pub mod split;
pub mod table;
pub mod task;

pub use loader::{DataSource, Dataset, DatasetLoader, KnownDataset};
pub use split::{train_test_split, Split};
pub use table::{Column, Series, Table};
pub use task::{detect_task, detect_task_with_threshold, DEFAULT_MAX_CLASSES};
