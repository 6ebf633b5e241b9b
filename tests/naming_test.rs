use unfold::expanders::naming::{LOOP_TASK_DELIMITER, decode, iteration_of, qualify};

#[test]
fn test_decode_strips_iteration_suffix() {
    assert_eq!(decode("T1__3"), "T1");
    assert_eq!(decode("T1"), "T1");
    assert_eq!(decode("__1"), "");
}

#[test]
fn test_decode_nested_name_keeps_first_segment() {
    assert_eq!(decode("T1__2__5"), "T1");
}

#[test]
fn test_qualify_appends_delimiter_and_iteration() {
    assert_eq!(LOOP_TASK_DELIMITER, "__");
    assert_eq!(qualify("T1", 1), "T1__1");
    assert_eq!(qualify("T1__2", 5), "T1__2__5");
}

#[test]
fn test_decode_recovers_authored_names() {
    for name in ["T1", "fetch_page", "a_b_c", "x"] {
        for iteration in [1, 2, 17, 1000] {
            assert_eq!(decode(&qualify(name, iteration)), name);
            assert_eq!(decode(&qualify(&qualify(name, iteration), iteration + 1)), name);
        }
    }
}

#[test]
fn test_iteration_of_reads_last_suffix() {
    assert_eq!(iteration_of("T1__3"), Some(3));
    assert_eq!(iteration_of("T1__2__5"), Some(5));
    assert_eq!(iteration_of("T1"), None);
    assert_eq!(iteration_of("T1__abc"), None);
}
