pub mod factory;
pub mod knn;
pub mod linear;
pub mod logistic;
pub mod model_trait;
pub mod random_forest;
pub mod utils;

pub use model_trait::{Model, Target};
pub use utils::LabelEncoder;
