#![cfg(test)]

use std::error::Error;

use css::{EngineConfig, MediaEnvironment, PseudoElement, StyleEngine, StyleMap, StyleTarget as _};
use html::Document;
use indextree::NodeId;

type TestResult = Result<(), Box<dyn Error>>;

/// `<html><body><div id="main" class="box"><p class="note">..</p></div></body></html>`
fn page() -> Result<(Document, NodeId, NodeId), Box<dyn Error>> {
    let mut doc = Document::new();
    let html = doc.append_element(doc.root(), "html", &[])?;
    let body = doc.append_element(html, "body", &[])?;
    let div = doc.append_element(body, "div", &[("id", "main"), ("class", "box")])?;
    let note = doc.append_element(div, "p", &[("class", "note")])?;
    doc.append_text(note, "hello")?;
    Ok((doc, div, note))
}

fn styled(css: &str, config: EngineConfig) -> Result<(Document, NodeId, NodeId), Box<dyn Error>> {
    let _logger = env_logger::builder().is_test(true).try_init();
    let (mut doc, div, note) = page()?;
    let mut engine = StyleEngine::new(config);
    engine.add_stylesheet(css);
    let root = doc.root();
    engine.run_bulk_pass(&mut doc, root);
    Ok((doc, div, note))
}

#[test]
fn id_beats_class_beats_tag() -> TestResult {
    let (doc, div, _) = styled(
        "#main { color: blue } .box { color: green; width: 10px } div { color: red; height: 1px }",
        EngineConfig::default(),
    )?;
    assert_eq!(doc.style_property(div, "color"), Some("blue"));
    assert_eq!(doc.style_property(div, "width"), Some("10px"));
    assert_eq!(doc.style_property(div, "height"), Some("1px"));
    Ok(())
}

#[test]
fn media_blocks_follow_the_screen() -> TestResult {
    let css = "@media (max-width: 2000px) { p { color: red } } \
               @media (min-width: 2000px) { p { background-color: black } } \
               p { color: green }";
    let (doc, _, note) = styled(css, EngineConfig::default())?;
    assert_eq!(doc.style_property(note, "color"), Some("red"));
    assert_eq!(doc.style_property(note, "backgroundColor"), None);

    let wide = EngineConfig {
        media: MediaEnvironment {
            width: 2400.0,
            ..MediaEnvironment::default()
        },
        ..EngineConfig::default()
    };
    let (doc, _, note) = styled(css, wide)?;
    assert_eq!(doc.style_property(note, "color"), Some("green"));
    assert_eq!(doc.style_property(note, "backgroundColor"), Some("black"));
    Ok(())
}

#[test]
fn first_declaration_wins() -> TestResult {
    let (doc, _, note) = styled(
        "p { color: red; color: blue; margin: 0; margin: 1px !important } .note { margin: 2px }",
        EngineConfig::default(),
    )?;
    assert_eq!(doc.style_property(note, "color"), Some("red"));
    assert_eq!(doc.style_property(note, "margin"), Some("1px"));
    Ok(())
}

#[test]
fn equal_specificity_keeps_the_earlier_rule() -> TestResult {
    let (doc, _, note) = styled("p { color: red } p { color: blue }", EngineConfig::default())?;
    assert_eq!(doc.style_property(note, "color"), Some("red"));
    Ok(())
}

#[test]
fn generated_content_and_values() -> TestResult {
    let (doc, div, note) = styled(
        ".note:after { content: \"!\" } \
         div:before { content: attr(id) \": \" } \
         p { font-family: \"Times New Roman\" }",
        EngineConfig::default(),
    )?;
    assert_eq!(doc.generated_text(note, PseudoElement::After), Some("!"));
    assert_eq!(doc.generated_text(div, PseudoElement::Before), Some("main: "));
    assert_eq!(doc.style_property(note, "fontFamily"), Some("Times New Roman"));
    assert_eq!(doc.style_property(note, "content"), None);
    Ok(())
}

#[test]
fn computed_style_matches_bulk_pass() -> TestResult {
    let css = "div p { color: red } .box > .note { color: blue; top: 1px } p { left: 2px }";
    let (doc, _, note) = styled(css, EngineConfig::default())?;
    let mut engine = StyleEngine::default();
    engine.add_stylesheet(css);
    let mut computed = StyleMap::default();
    engine.apply_computed_style(&doc, note, &mut computed);
    let bulk: Vec<(&str, &str)> = doc
        .style(note)
        .map(|style| style.properties().collect())
        .unwrap_or_default();
    let lookup: Vec<(&str, &str)> = computed.properties().collect();
    assert_eq!(bulk, lookup);
    assert_eq!(computed.property("color"), Some("blue"));
    Ok(())
}

#[test]
fn style_attributes_can_be_disabled() -> TestResult {
    let mut doc = Document::new();
    let div = doc.append_element(doc.root(), "div", &[("style", "color: red")])?;
    let config = EngineConfig {
        apply_style_attributes: false,
        ..EngineConfig::default()
    };
    let engine = StyleEngine::new(config);
    let root = doc.root();
    engine.run_bulk_pass(&mut doc, root);
    assert_eq!(doc.style_property(div, "color"), None);

    StyleEngine::default().run_bulk_pass(&mut doc, root);
    assert_eq!(doc.style_property(div, "color"), Some("red"));
    Ok(())
}
