//! Rules for code that has a clearer equivalent

pub mod inline_single_use_out_variable;
pub mod negated_ternary_condition;
pub mod trailing_binary_operator;
pub mod verbose_linq_chain;
