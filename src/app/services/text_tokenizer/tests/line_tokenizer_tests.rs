//! Tests for line tokenization, blank-line policy and windowing

use super::*;

#[test]
fn test_internal_blank_dropped_by_default() {
    let lines = collect_lines("line1\n\nline3\n", LineOptions::default());
    assert_eq!(texts(&lines), vec![("line1", 0), ("line3", 2)]);
}

#[test]
fn test_internal_blank_kept() {
    let options = LineOptions::default().with_drop_internal_blank(false);
    let lines = collect_lines("line1\n\nline3\n", options);
    assert_eq!(texts(&lines), vec![("line1", 0), ("", 1), ("line3", 2)]);
}

#[test]
fn test_mixed_line_endings() {
    let lines = collect_lines("a\r\nb\rc\nd", LineOptions::default());
    assert_eq!(texts(&lines), vec![("a", 0), ("b", 1), ("c", 2), ("d", 3)]);
}

#[test]
fn test_trailing_terminator_is_not_a_line() {
    let options = LineOptions::default().with_drop_final_blank(false);

    let lines = collect_lines("a\n", options.clone());
    assert_eq!(texts(&lines), vec![("a", 0)]);

    let lines = collect_lines("a\r", options.clone());
    assert_eq!(texts(&lines), vec![("a", 0)]);

    // The second terminator closes a real blank line
    let lines = collect_lines("a\n\n", options);
    assert_eq!(texts(&lines), vec![("a", 0), ("", 1)]);
}

#[test]
fn test_final_blanks_dropped_by_default() {
    let lines = collect_lines("a\n\n\n", LineOptions::default());
    assert_eq!(texts(&lines), vec![("a", 0)]);
}

#[test]
fn test_final_blanks_kept() {
    let options = LineOptions::default().with_drop_final_blank(false);
    let lines = collect_lines("a\n\n\n", options);
    assert_eq!(texts(&lines), vec![("a", 0), ("", 1), ("", 2)]);
}

#[test]
fn test_all_blank_stream_is_not_internal() {
    let options = LineOptions::default()
        .with_drop_internal_blank(true)
        .with_drop_final_blank(false);
    let lines = collect_lines("\n\n\n", options);
    assert_eq!(texts(&lines), vec![("", 0), ("", 1), ("", 2)]);

    let lines = collect_lines("\n\n\n", LineOptions::default());
    assert!(lines.is_empty());
}

#[test]
fn test_leading_blanks_precede_first_content() {
    let lines = collect_lines("\n\nfirst\n", LineOptions::default());
    assert_eq!(texts(&lines), vec![("", 0), ("", 1), ("first", 2)]);
}

#[test]
fn test_window_selects_half_open_range() {
    let options = LineOptions::default().with_window(1, Some(3));
    let lines = collect_lines("l0\nl1\nl2\nl3\n", options);
    assert_eq!(texts(&lines), vec![("l1", 1), ("l2", 2)]);
}

#[test]
fn test_empty_window_emits_nothing() {
    let options = LineOptions::default()
        .with_window(2, Some(2))
        .with_drop_final_blank(false);
    assert!(collect_lines("l0\n\n\nl3\n", options).is_empty());
}

#[test]
fn test_window_end_closes_blank_buffer() {
    let input = "l0\n\nl2\n\nl4\n";

    let keep_final = LineOptions::default()
        .with_window(0, Some(4))
        .with_drop_final_blank(false);
    let lines = collect_lines(input, keep_final);
    assert_eq!(texts(&lines), vec![("l0", 0), ("l2", 2), ("", 3)]);

    let drop_final = LineOptions::default().with_window(0, Some(4));
    let lines = collect_lines(input, drop_final);
    assert_eq!(texts(&lines), vec![("l0", 0), ("l2", 2)]);
}

#[test]
fn test_window_start_skips_blank_evaluation() {
    // Line 1 is blank but outside the window, so line 2 is the first content
    let options = LineOptions::default().with_window(2, None);
    let lines = collect_lines("l0\n\nl2\nl3\n", options);
    assert_eq!(texts(&lines), vec![("l2", 2), ("l3", 3)]);
}

#[test]
fn test_chunk_boundaries_inside_crlf() {
    let lines = collect_lines_chunked("a\r\nb\r\n\r\nc", LineOptions::default());
    assert_eq!(texts(&lines), vec![("a", 0), ("b", 1), ("c", 3)]);
}

#[test]
fn test_empty_input() {
    assert!(collect_lines("", LineOptions::default()).is_empty());
}

#[test]
fn test_invalid_utf8_is_an_error() {
    let input = Cursor::new(vec![b'o', b'k', b'\n', 0xff, b'\n']);
    let mut tokenizer = LineTokenizer::new(input, LineOptions::default());

    assert_eq!(tokenizer.next().unwrap().unwrap().text, "ok");
    assert!(tokenizer.next().unwrap().is_err());
    assert!(tokenizer.next().is_none());
}

#[test]
fn test_counters() {
    let mut tokenizer = LineTokenizer::new(Cursor::new("a\n\nb\n\n"), LineOptions::default());
    let emitted = tokenizer.by_ref().count();

    assert_eq!(emitted, 2);
    assert_eq!(tokenizer.lines_read(), 4);
    assert_eq!(tokenizer.blank_lines_dropped(), 2);
}
