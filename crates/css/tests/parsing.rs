#![cfg(test)]

use std::collections::HashMap;
use std::error::Error;

use css::{EngineConfig, ErrorKind, StyleEngine, Stylesheet};
use url::Url;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn comments_strings_and_brackets_are_opaque() -> TestResult {
    let sheet = Stylesheet::parse(
        "/* p { x: y } */ a[title=\"}{;\"] { content: \"/* kept */\"; background: url(a;b.png) } \
         div { color: red } /* unterminated",
        &EngineConfig::default(),
    );
    let usable: Vec<&str> = sheet
        .usable()
        .map(|descriptor| descriptor.selector_text.as_str())
        .collect();
    assert_eq!(usable, vec!["a[title=\"}{;\"]", "div"]);
    let first = sheet.usable().next().ok_or("no rules")?;
    let content = first.declarations.get("content").ok_or("no content")?;
    assert_eq!(content.value, "/* kept */");
    let background = first.declarations.get("background").ok_or("no background")?;
    assert_eq!(background.raw_value, "url(a;b.png)");
    Ok(())
}

#[test]
fn errors_stay_with_their_rule() -> TestResult {
    let sheet = Stylesheet::parse(
        "p:hover:link { a: b } \
         div > { a: b } \
         q { a { b: c } } \
         em:before span { a: b } \
         ::selection { a: b } \
         @page { margin: 0 } \
         @media (bogus-feature) { x { a: b } } \
         strong { font-weight: bold } \
         b { nonsense }",
        &EngineConfig::default(),
    );
    let errors: Vec<(String, Option<ErrorKind>)> = sheet
        .descriptors()
        .iter()
        .map(|descriptor| (descriptor.selector_text.clone(), descriptor.error))
        .collect();
    let error_of = |selector: &str| {
        errors
            .iter()
            .find(|(text, _)| text == selector)
            .and_then(|(_, error)| *error)
    };
    assert_eq!(error_of("p:hover:link"), Some(ErrorKind::TagLink));
    assert_eq!(error_of("div >"), Some(ErrorKind::EmptySelector));
    assert_eq!(error_of("q"), Some(ErrorKind::Nested));
    assert_eq!(error_of("em:before span"), Some(ErrorKind::InjectHigh));
    assert_eq!(error_of("@page"), Some(ErrorKind::NotMedia));
    assert_eq!(error_of("@media (bogus-feature)"), Some(ErrorKind::BadMedia));
    assert_eq!(error_of("strong"), None);
    assert_eq!(error_of("b"), Some(ErrorKind::RuleColon));
    assert_eq!(sheet.usable().count(), 1);
    Ok(())
}

#[test]
fn imports_resolve_against_the_base() -> TestResult {
    let base = Url::parse("https://example.com/styles/site.css")?;
    let mut fetched: HashMap<String, String> = HashMap::new();
    fetched.insert(
        "https://example.com/styles/theme/colors.css".to_owned(),
        "@import \"../reset.css\"; .brand { color: teal }".to_owned(),
    );
    fetched.insert(
        "https://example.com/styles/reset.css".to_owned(),
        "* { margin: 0 }".to_owned(),
    );
    let mut engine = StyleEngine::default();
    let stats = engine.add_stylesheet_from(
        "@import url(theme/colors.css) screen; @import 'missing.css'; p { top: 0 }",
        &base,
        &mut fetched,
    );
    assert_eq!(stats.imports, 2);
    assert_eq!(stats.count(ErrorKind::AtProcessed), 4);
    let usable: Vec<&str> = engine
        .stylesheet()
        .usable()
        .map(|descriptor| descriptor.selector_text.as_str())
        .collect();
    assert_eq!(usable, vec!["*", ".brand", "p"]);
    Ok(())
}

#[test]
fn stats_serialize() -> TestResult {
    let mut engine = StyleEngine::default();
    let stats = engine.add_stylesheet("p { a: b } a:focus { c: d } @font-face { e: f }");
    let json = serde_json::to_value(stats)?;
    assert_eq!(json["descriptors"], 3);
    assert_eq!(json["errors"]["dynamic"], 1);
    assert_eq!(json["errors"]["not-media"], 1);
    Ok(())
}
