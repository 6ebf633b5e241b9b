//! Iteration-qualified reference names.
//!
//! Tasks created for iteration `k` of a loop body are stored as
//! `<reference>__<k>`. Nested loops stack suffixes, the enclosing loop's
//! iteration last (`T1__<inner>__<outer>`), and [`decode`] always recovers
//! the authored name from the first delimiter.

/// Separator between an authored reference name and its iteration.
/// Not allowed in authored names.
pub const LOOP_TASK_DELIMITER: &str = "__";

/// Authored reference name for a possibly qualified runtime name.
pub fn decode(name: &str) -> &str {
    name.split_once(LOOP_TASK_DELIMITER)
        .map_or(name, |(head, _)| head)
}

pub fn qualify(name: &str, iteration: u32) -> String {
    format!("{}{}{}", name, LOOP_TASK_DELIMITER, iteration)
}

/// Last iteration suffix, if the name carries one.
pub fn iteration_of(name: &str) -> Option<u32> {
    name.rsplit_once(LOOP_TASK_DELIMITER)
        .and_then(|(_, tail)| tail.parse().ok())
}
