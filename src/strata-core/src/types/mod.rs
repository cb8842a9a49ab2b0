//! Type system for Strata values.
//!
//! `Value` carries runtime literals; `DataType` describes the logical type
//! of a column or expression.

mod data_type;
mod value;

pub use data_type::DataType;
pub use value::Value;
