use std::sync::OnceLock;
use std::time::Instant;

/// Collapses error text to one printable line so it fits a table cell.
pub fn single_line(text: &str) -> String {
    let printable: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '.',
            c => c,
        })
        .collect();
    printable.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn now_millis() -> u128 {
    static START: OnceLock<Instant> = OnceLock::new();
    let start = START.get_or_init(Instant::now);
    Instant::now().duration_since(*start).as_millis()
}
