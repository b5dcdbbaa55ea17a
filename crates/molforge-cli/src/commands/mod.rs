pub mod complete;
pub mod formula;
pub mod pairs;
pub mod place;
pub mod validate;
