//! Rules for code that allocates or iterates more than it needs to

pub mod discard_unused_out_variable;
pub mod materialize_before_linq;
pub mod redundant_spread_element;
pub mod redundant_to_array;
pub mod single_element_concat;
pub mod to_list_for_each;
pub mod unique_non_set_collection;
