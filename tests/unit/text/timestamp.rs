use super::*;

#[test]
fn clock_format_expands_to_digits() {
    let fmt = TimestampFormat::parse("%H:%M:%S").unwrap();
    let label = fmt.now().unwrap();
    assert_eq!(label.len(), 8);
    let bytes = label.as_bytes();
    assert_eq!(bytes[2], b':');
    assert_eq!(bytes[5], b':');
    assert!(
        label
            .chars()
            .all(|c| c.is_ascii_digit() || c == ':'),
        "unexpected label {label:?}"
    );
}

#[test]
fn date_format_expands() {
    let fmt = TimestampFormat::parse("%Y-%m-%d").unwrap();
    let label = fmt.now().unwrap();
    assert_eq!(label.len(), 10);
    assert!(label.starts_with('2'));
}

#[test]
fn percent_escape_is_literal() {
    let fmt = TimestampFormat::parse("%%S").unwrap();
    assert_eq!(fmt.now().unwrap(), "%S");
}

#[test]
fn unknown_specifiers_survive_as_literals() {
    let fmt = TimestampFormat::parse("%H %Q").unwrap();
    let label = fmt.now().unwrap();
    assert!(label.ends_with(" %Q"), "unexpected label {label:?}");
}

#[test]
fn literal_brackets_are_escaped() {
    let fmt = TimestampFormat::parse("[%H]").unwrap();
    let label = fmt.now().unwrap();
    assert!(label.starts_with('[') && label.ends_with(']'));
    assert_eq!(label.len(), 4);
}

#[test]
fn seconds_change_across_a_tick() {
    let fmt = TimestampFormat::parse("%H:%M:%S").unwrap();
    let first = fmt.now().unwrap();
    std::thread::sleep(std::time::Duration::from_millis(1100));
    let second = fmt.now().unwrap();
    assert_ne!(first, second);
}

#[test]
fn raw_is_preserved() {
    let fmt = TimestampFormat::parse("%H:%M").unwrap();
    assert_eq!(fmt.raw(), "%H:%M");
}
