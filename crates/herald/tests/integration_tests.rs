use herald::*;

#[test]
fn test_basic_logging_functions() {
  info("Test info message");
  warn("Test warning message");
  error("Test error message");
  success("Test success message");
}

#[test]
fn test_multiline_messages() {
  let multiline_msg = "First line\nSecond line\nThird line";
  info(multiline_msg);
  warn(multiline_msg);
  error(multiline_msg);
  success(multiline_msg);
}

#[test]
fn test_banners() {
  announce("Starting a run");
  flourish(&format!("Run {}", "complete"));
}

#[test]
fn test_as_banner_calls_log_fn_three_times() {
  use std::cell::RefCell;

  let lines = RefCell::new(Vec::new());
  as_banner(|line| lines.borrow_mut().push(line.to_string()), "middle", Some(5), Some('#'));

  let lines = lines.into_inner();
  assert_eq!(lines, vec!["#####", "middle", "#####"]);
}
