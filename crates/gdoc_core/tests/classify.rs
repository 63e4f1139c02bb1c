use gdoc_core::{Run, SourceDocument, StructuralElement};
use pretty_assertions::assert_eq;
use serde_json::json;

fn init_logging() {
    import_logging::initialize_for_tests();
}

fn decode(value: serde_json::Value) -> SourceDocument {
    SourceDocument::from_json(value.to_string().as_bytes()).expect("valid document json")
}

fn single(element: serde_json::Value) -> StructuralElement {
    let doc = decode(json!({
        "documentId": "doc-1",
        "title": "T",
        "body": { "content": [element] }
    }));
    doc.elements.into_iter().next().expect("one element")
}

#[test]
fn heading_style_prefix_wins_over_inline_object() {
    init_logging();
    let element = single(json!({
        "paragraph": {
            "paragraphStyle": { "namedStyleType": "HEADING_2" },
            "elements": [
                { "inlineObjectElement": { "inlineObjectId": "kix.1" } },
                { "textRun": { "content": "Intro\n" } }
            ]
        }
    }));

    match element {
        StructuralElement::Heading { level, runs } => {
            assert_eq!(level, "2");
            assert_eq!(runs.len(), 2);
            assert_eq!(runs[0].inline_object_id.as_deref(), Some("kix.1"));
        }
        other => panic!("expected heading, got {other:?}"),
    }
}

#[test]
fn heading_level_is_opaque_suffix() {
    let element = single(json!({
        "paragraph": {
            "paragraphStyle": { "namedStyleType": "HEADING_banana" },
            "elements": [{ "textRun": { "content": "x" } }]
        }
    }));
    assert_eq!(
        element,
        StructuralElement::Heading {
            level: "banana".to_string(),
            runs: vec![Run::text("x")],
        }
    );
}

#[test]
fn first_inline_object_makes_an_image() {
    let element = single(json!({
        "paragraph": {
            "paragraphStyle": { "namedStyleType": "NORMAL_TEXT" },
            "elements": [{ "inlineObjectElement": { "inlineObjectId": "kix.img" } }]
        }
    }));
    assert!(matches!(
        element,
        StructuralElement::Image { ref inline_object_id, .. } if inline_object_id == "kix.img"
    ));
}

#[test]
fn inline_object_after_text_stays_a_paragraph() {
    let element = single(json!({
        "paragraph": {
            "elements": [
                { "textRun": { "content": "before " } },
                { "inlineObjectElement": { "inlineObjectId": "kix.img" } }
            ]
        }
    }));
    assert!(matches!(element, StructuralElement::Paragraph { .. }));
}

#[test]
fn links_are_taken_from_text_style() {
    let element = single(json!({
        "paragraph": {
            "elements": [
                { "textRun": { "content": "see " } },
                { "textRun": {
                    "content": "docs",
                    "textStyle": { "link": { "url": "https://example.com/a?b=c" } }
                } },
                { "textRun": {
                    "content": "bookmark",
                    "textStyle": { "link": { "bookmarkId": "id.x" } }
                } }
            ]
        }
    }));
    assert_eq!(
        element,
        StructuralElement::Paragraph {
            runs: vec![
                Run::text("see "),
                Run::link("docs", "https://example.com/a?b=c"),
                Run::text("bookmark"),
            ],
        }
    );
}

#[test]
fn table_rows_and_cells_keep_source_order() {
    let cell = |text: &str| json!({ "content": [{ "paragraph": { "elements": [{ "textRun": { "content": text } }] } }] });
    let element = single(json!({
        "table": {
            "rows": 2,
            "columns": 2,
            "tableRows": [
                { "tableCells": [cell("a"), cell("b")] },
                { "tableCells": [cell("c"), cell("d")] }
            ]
        }
    }));

    let StructuralElement::Table { rows } = element else {
        panic!("expected table");
    };
    let texts: Vec<_> = rows
        .iter()
        .flat_map(|row| row.cells.iter())
        .map(|cell| cell.paragraphs[0][0].text.clone())
        .collect();
    assert_eq!(texts, vec!["a", "b", "c", "d"]);
}

#[test]
fn unrecognized_elements_are_labelled() {
    assert_eq!(
        single(json!({ "sectionBreak": { "sectionStyle": {} } })),
        StructuralElement::Unknown {
            kind: "sectionBreak".to_string()
        }
    );
    assert_eq!(
        single(json!({ "tableOfContents": { "content": [] } })),
        StructuralElement::Unknown {
            kind: "tableOfContents".to_string()
        }
    );
    assert_eq!(
        single(json!({ "startIndex": 1 })).kind_name(),
        "unrecognized"
    );
}

#[test]
fn inline_objects_expose_content_uri() {
    let doc = decode(json!({
        "documentId": "doc-1",
        "title": "Images",
        "body": { "content": [] },
        "inlineObjects": {
            "kix.1": {
                "objectId": "kix.1",
                "inlineObjectProperties": {
                    "embeddedObject": {
                        "imageProperties": { "contentUri": "https://img.example/1" }
                    }
                }
            },
            "kix.2": { "objectId": "kix.2", "inlineObjectProperties": {} }
        }
    }));

    assert_eq!(doc.id, "doc-1");
    assert_eq!(doc.title, "Images");
    assert_eq!(
        doc.inline_object("kix.1").and_then(|o| o.content_uri.as_deref()),
        Some("https://img.example/1")
    );
    assert_eq!(doc.inline_object("kix.2").unwrap().content_uri, None);
    assert!(doc.inline_object("kix.3").is_none());
}

#[test]
fn malformed_json_is_a_decode_error() {
    assert!(SourceDocument::from_json(b"{ not json").is_err());
}
