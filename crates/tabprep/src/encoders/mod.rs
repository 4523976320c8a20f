//! Categorical encoding module.

mod one_hot;

pub use one_hot::{EncodedColumn, OneHotEncoder};
