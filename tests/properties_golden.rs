use config_patcher::{ConfigurationFile, Format, ReplaceValue, Replacement, Selector};

fn rule(selector: &str, value: ReplaceValue) -> Replacement {
    Replacement::new(Selector::parse(selector).expect("selector"), value)
}

fn properties_file(replacements: Vec<Replacement>) -> ConfigurationFile {
    ConfigurationFile::new("server.properties", Format::Properties, replacements)
}

const SERVER_PROPERTIES: &[u8] = b"#Minecraft server properties\n#Mon Jan 01 00:00:00 UTC 2024\nenable-jmx-monitoring=false\nlevel-seed=\ngamemode=survival\nmotd=A Minecraft Server\nmax-players=20\n";

#[test]
fn test_update_properties_preserving_structure() {
    let file = properties_file(vec![
        rule("motd", ReplaceValue::string("Pelican hosted Server")),
        rule("max-players", ReplaceValue::numeric("50").unwrap()),
    ]);

    let output = file
        .update_properties_preserving_structure(SERVER_PROPERTIES)
        .unwrap();
    assert_eq!(
        output,
        &b"#Minecraft server properties\n#Mon Jan 01 00:00:00 UTC 2024\nenable-jmx-monitoring=false\nlevel-seed=\ngamemode=survival\nmotd=Pelican hosted Server\nmax-players=50\n"[..]
    );
}

#[test]
fn test_empty_value_slot_gets_filled() {
    let file = properties_file(vec![rule("level-seed", ReplaceValue::string("12345"))]);
    let output = file
        .update_properties_preserving_structure(SERVER_PROPERTIES)
        .unwrap();
    assert!(output.windows(17).any(|w| w == b"level-seed=12345\n"));
}

#[test]
fn test_separator_style_is_preserved() {
    let input = b"a = 1\nb: 2\nc 3\n";
    let file = properties_file(vec![
        rule("a", ReplaceValue::numeric("10").unwrap()),
        rule("b", ReplaceValue::numeric("20").unwrap()),
        rule("c", ReplaceValue::numeric("30").unwrap()),
    ]);
    let output = file.update_properties_preserving_structure(input).unwrap();
    assert_eq!(output, &b"a = 10\nb: 20\nc 30\n"[..]);
}

#[test]
fn test_string_values_escape_line_structure() {
    let input = b"motd=old\n";
    let file = properties_file(vec![rule("motd", ReplaceValue::string("two\nlines"))]);
    let output = file.update_properties_preserving_structure(input).unwrap();
    assert_eq!(output, &b"motd=two\\nlines\n"[..]);
}

#[test]
fn test_continuation_value_is_replaced_whole() {
    let input = b"motd=part one \\\n  part two\nnext=1\n";
    let file = properties_file(vec![rule("motd", ReplaceValue::string("single"))]);
    let output = file.update_properties_preserving_structure(input).unwrap();
    assert_eq!(output, &b"motd=single\nnext=1\n"[..]);
}

#[test]
fn test_dotted_keys_and_wildcards() {
    let input = b"log.level.root=info\nlog.level.net=warn\nlog.format=plain\n";
    let file = properties_file(vec![rule("log.level.*", ReplaceValue::string("debug"))]);
    let output = file.update_properties_preserving_structure(input).unwrap();
    assert_eq!(
        output,
        &b"log.level.root=debug\nlog.level.net=debug\nlog.format=plain\n"[..]
    );
}

#[test]
fn test_bare_key_gains_separator_when_patched() {
    // "flag" with no separator is a legal entry with an empty value;
    // patching it must not fuse the new value onto the key.
    let input = b"flag\nnext=1\n";
    let file = properties_file(vec![rule("flag", ReplaceValue::string("on"))]);
    let output = file.update_properties_preserving_structure(input).unwrap();
    assert_eq!(output, &b"flag=on\nnext=1\n"[..]);

    // Left unmatched, the bare key survives byte-for-byte.
    let inert = properties_file(vec![rule("absent", ReplaceValue::string("x"))]);
    let untouched = inert.update_properties_preserving_structure(input).unwrap();
    assert_eq!(untouched, input);
}

#[test]
fn test_comments_and_unmatched_keys_untouched() {
    let file = properties_file(vec![rule("absent-key", ReplaceValue::string("x"))]);
    let output = file
        .update_properties_preserving_structure(SERVER_PROPERTIES)
        .unwrap();
    assert_eq!(output, SERVER_PROPERTIES);
}
