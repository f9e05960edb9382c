// End-to-end tests over the public API.
// Run with `cargo test --test scanner_test`

use std::sync::Arc;

use descan::{Match, Pattern, PatternId, Scanner, ScannerCtxt};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn ssn() -> Pattern {
    Pattern::new(
        PatternId::new(1, 1),
        "ssn",
        "[[:digit:]]{3}[ -][[:digit:]]{2}[ -][[:digit:]]{4}",
    )
}

fn visa() -> Pattern {
    Pattern::new(
        PatternId::new(2, 1),
        "visa",
        "4[[:digit:]]{3}([ -]?[[:digit:]]{4}){3}",
    )
}

fn ssn_unformatted() -> Pattern {
    Pattern::new(PatternId::new(3, 1), "ssn_unformatted", "[[:digit:]]{9}")
}

fn digit_rule() -> Pattern {
    Pattern::new(PatternId::new(4, 1), "digit", "1[^13]")
}

fn scan(patterns: Vec<Pattern>, input: &str) -> Vec<Match> {
    let ctxt = Arc::new(ScannerCtxt::new(patterns));
    let mut scanner = Scanner::new(ctxt);
    let mut matches = scanner.update(input);
    matches.extend(scanner.complete());
    matches
}

fn expect(matches: &[Match], expected: &[(PatternId, &str, usize, &str)]) {
    let actual: Vec<(PatternId, &str, usize, &str)> = matches
        .iter()
        .map(|m| (m.id(), m.name(), m.pos(), m.text()))
        .collect();
    assert_eq!(actual, expected);
}

#[test]
fn digit_rule_matches_at_start() {
    init();
    let matches = scan(vec![digit_rule()], "12 ");
    expect(&matches, &[(PatternId::new(4, 1), "digit", 0, "12")]);
}

#[test]
fn ssn_in_running_text() {
    init();
    let matches = scan(
        vec![ssn(), visa()],
        "Hi, here is my social security number 444-42-1234",
    );
    expect(&matches, &[(PatternId::new(1, 1), "ssn", 38, "444-42-1234")]);
}

#[test]
fn visa_number_without_separators() {
    init();
    let matches = scan(
        vec![ssn(), visa()],
        "Hi, here is my visa number 4045124442700008, don't give it to anyone",
    );
    expect(
        &matches,
        &[(PatternId::new(2, 1), "visa", 27, "4045124442700008")],
    );
}

#[test]
fn visa_number_with_spaces() {
    init();
    let matches = scan(
        vec![ssn(), visa()],
        "Hi, here is my visa number 4045 1244 4270 0008, don't give it to anyone",
    );
    expect(
        &matches,
        &[(PatternId::new(2, 1), "visa", 27, "4045 1244 4270 0008")],
    );
}

#[test]
fn longest_match_beats_earlier_shorter_pattern() {
    init();
    // The unformatted SSN accepts after nine digits, but the visa number keeps going; the
    // longest candidate must win.
    let matches = scan(
        vec![ssn(), ssn_unformatted(), visa()],
        "Hi, here is my visa number 4045124442700008, don't give it to anyone",
    );
    expect(
        &matches,
        &[(PatternId::new(2, 1), "visa", 27, "4045124442700008")],
    );
}

#[test]
fn multiple_matches_in_one_stream() {
    init();
    let matches = scan(
        vec![ssn(), visa()],
        "Hi, here is my SSN is 444-42-1234 and  visa number is #4045124442700008, don't give it to anyone",
    );
    expect(
        &matches,
        &[
            (PatternId::new(1, 1), "ssn", 22, "444-42-1234"),
            (PatternId::new(2, 1), "visa", 55, "4045124442700008"),
        ],
    );
}

#[test]
fn chunked_updates_are_deterministic() {
    init();
    let input = "SSN 444-42-1234 and visa 4045124442700008.";
    let ctxt = Arc::new(ScannerCtxt::new(vec![ssn(), visa()]));

    let mut whole = Scanner::new(ctxt.clone());
    let mut expected = whole.update(input);
    expected.extend(whole.complete());
    assert_eq!(expected.len(), 2);

    for split in 0..=input.len() {
        let mut scanner = Scanner::new(ctxt.clone());
        let mut matches = scanner.update(&input[..split]);
        matches.extend(scanner.update(&input[split..]));
        matches.extend(scanner.complete());
        assert_eq!(matches, expected, "split at {}", split);
    }
}

#[test]
fn serialized_context_produces_identical_matches() {
    init();
    let input = "my visa is 4045 1244 4270 0008 thanks";
    let ctxt = ScannerCtxt::new(vec![ssn(), visa()]);
    let bytes = ctxt.to_bytes().unwrap();
    let restored = ScannerCtxt::from_bytes(&bytes).unwrap();

    let mut original = Scanner::new(Arc::new(ctxt));
    let mut from_original = original.update(input);
    from_original.extend(original.complete());

    let mut reloaded = Scanner::new(Arc::new(restored));
    let mut from_restored = reloaded.update(input);
    from_restored.extend(reloaded.complete());

    assert_eq!(from_original, from_restored);
    assert_eq!(from_original.len(), 1);
}

#[test]
fn scanners_share_one_context() {
    init();
    let ctxt = Arc::new(ScannerCtxt::new(vec![digit_rule()]));
    let mut first = Scanner::new(ctxt.clone());
    let mut second = Scanner::new(ctxt);
    first.update("1");
    // The second scanner is unaffected by the first one's buffered state.
    let mut matches = second.update("12 ");
    matches.extend(second.complete());
    expect(&matches, &[(PatternId::new(4, 1), "digit", 0, "12")]);
}

#[test]
fn patterns_from_definition_file() {
    init();
    let patterns = descan::parse_patterns(
        r#"{ "patterns": [
            { "id": 4, "name": "digit", "regexes": ["1[^13]"] },
            { "id": 9, "name": "masked", "regexes": ["zz+"], "disabled": true }
        ] }"#,
    )
    .unwrap();
    let matches = scan(patterns, "12 zzz");
    expect(&matches, &[(PatternId::new(4, 0), "digit", 0, "12")]);
}
