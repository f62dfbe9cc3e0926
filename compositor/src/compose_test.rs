#![allow(clippy::float_cmp)]

use editor::model::{ElementKind, ElementRef, Template};
use editor::viewport::Point;
use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use super::*;

// =============================================================
// Helpers
// =============================================================

fn blank_doc(page_count: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();
    for _ in 0..page_count {
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            Content { operations: vec![] }.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }
    #[allow(clippy::cast_possible_wrap)]
    let count = page_count as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn page_ops(doc: &Document, page_number: u32) -> Vec<lopdf::content::Operation> {
    let page_id = doc.get_pages()[&page_number];
    let data = doc.get_page_content(page_id).unwrap();
    Content::decode(&data).unwrap().operations
}

fn page_texts(doc: &Document, page_number: u32) -> Vec<String> {
    page_ops(doc, page_number)
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

fn bound_field_template() -> Template {
    let mut t = Template::new();
    let r = t.add_element(ElementKind::Field);
    if let ElementRef::Field(id) = r {
        let f = t.field_mut(id).unwrap();
        f.label = "Customer".to_owned();
        f.binding_key = "customer".to_owned();
        f.position = Point::new(40.0, 100.0);
    }
    t
}

fn data_with(key: &str, value: &str) -> TemplateData {
    let mut data = TemplateData::default();
    data.values.insert(key.to_owned(), value.to_owned());
    data
}

// =============================================================
// apply_template
// =============================================================

#[test]
fn empty_template_adds_no_operations() {
    let mut doc = blank_doc(1);
    apply_template(&mut doc, &Template::new(), &TemplateData::default(), &[0]).unwrap();
    assert!(page_ops(&doc, 1).is_empty());
}

#[test]
fn title_is_stamped_with_flipped_y() {
    let mut doc = blank_doc(1);
    let mut t = Template::new();
    t.add_element(ElementKind::Title);
    apply_template(&mut doc, &t, &TemplateData::default(), &[0]).unwrap();

    assert_eq!(page_texts(&doc, 1), vec!["Title".to_owned()]);
    let ops = page_ops(&doc, 1);
    let td = ops.iter().find(|op| op.operator == "Td").unwrap();
    // Default title y is 60 in editor space, so 842 - 60 in PDF space.
    assert_eq!(td.operands[1].as_float().unwrap(), 782.0);
}

#[test]
fn field_renders_label_and_bound_value() {
    let mut doc = blank_doc(1);
    let t = bound_field_template();
    apply_template(&mut doc, &t, &data_with("customer", "ACME"), &[0]).unwrap();
    assert_eq!(page_texts(&doc, 1), vec!["Customer: ACME".to_owned()]);
}

#[test]
fn field_without_bound_value_keeps_its_label() {
    let mut doc = blank_doc(1);
    let t = bound_field_template();
    apply_template(&mut doc, &t, &TemplateData::default(), &[0]).unwrap();
    assert_eq!(page_texts(&doc, 1), vec!["Customer".to_owned()]);
}

#[test]
fn field_underline_flips_with_the_text() {
    let mut doc = blank_doc(1);
    let t = bound_field_template();
    apply_template(&mut doc, &t, &TemplateData::default(), &[0]).unwrap();
    let ops = page_ops(&doc, 1);
    let m = ops.iter().find(|op| op.operator == "m").unwrap();
    // Field at editor y 100, underline 3 below: 842 - 103.
    assert_eq!(m.operands[0].as_float().unwrap(), 40.0);
    assert_eq!(m.operands[1].as_float().unwrap(), 739.0);
    let l = ops.iter().find(|op| op.operator == "l").unwrap();
    assert_eq!(l.operands[0].as_float().unwrap(), 190.0);
}

#[test]
fn table_stamps_header_labels_and_rows() {
    let mut doc = blank_doc(1);
    let mut t = Template::new();
    t.add_element(ElementKind::Table);
    let data = TemplateData {
        values: std::collections::HashMap::new(),
        rows: vec![
            vec!["a1".to_owned(), "a2".to_owned(), "a3".to_owned()],
            vec!["b1".to_owned(), "b2".to_owned(), "b3".to_owned()],
        ],
    };
    apply_template(&mut doc, &t, &data, &[0]).unwrap();

    let texts = page_texts(&doc, 1);
    assert!(texts.contains(&"Column 1".to_owned()));
    assert!(texts.contains(&"a2".to_owned()));
    assert!(texts.contains(&"b3".to_owned()));
}

#[test]
fn table_rows_beyond_row_count_are_cropped() {
    let mut doc = blank_doc(1);
    let mut t = Template::new();
    t.add_element(ElementKind::Table);
    t.table.row_count = 1;
    let data = TemplateData {
        values: std::collections::HashMap::new(),
        rows: vec![
            vec!["kept".to_owned()],
            vec!["dropped".to_owned()],
        ],
    };
    apply_template(&mut doc, &t, &data, &[0]).unwrap();
    let texts = page_texts(&doc, 1);
    assert!(texts.contains(&"kept".to_owned()));
    assert!(!texts.contains(&"dropped".to_owned()));
}

#[test]
fn signature_block_stamps_each_field_label() {
    let mut doc = blank_doc(1);
    let mut t = Template::new();
    t.add_element(ElementKind::SignatureField);
    apply_template(&mut doc, &t, &TemplateData::default(), &[0]).unwrap();
    let texts = page_texts(&doc, 1);
    let labels: Vec<String> = t.signature.fields.iter().map(|f| f.label.clone()).collect();
    for label in labels {
        assert!(texts.contains(&label));
    }
}

#[test]
fn stamps_every_requested_page() {
    let mut doc = blank_doc(3);
    let mut t = Template::new();
    t.add_element(ElementKind::Title);
    apply_template(&mut doc, &t, &TemplateData::default(), &[0, 2]).unwrap();
    assert_eq!(page_texts(&doc, 1), vec!["Title".to_owned()]);
    assert!(page_texts(&doc, 2).is_empty());
    assert_eq!(page_texts(&doc, 3), vec!["Title".to_owned()]);
}

#[test]
fn bad_page_index_leaves_document_untouched() {
    let mut doc = blank_doc(2);
    let mut t = Template::new();
    t.add_element(ElementKind::Title);
    let err = apply_template(&mut doc, &t, &TemplateData::default(), &[0, 7]).unwrap_err();
    assert!(matches!(
        err,
        ComposeError::PageOutOfRange { index: 7, page_count: 2 }
    ));
    assert!(page_ops(&doc, 1).is_empty());
    assert!(page_ops(&doc, 2).is_empty());
}

#[test]
fn bad_template_color_fails_before_drawing() {
    let mut doc = blank_doc(1);
    let mut t = Template::new();
    t.add_element(ElementKind::Title);
    t.title.as_mut().unwrap().color = "blue".to_owned();
    let err = apply_template(&mut doc, &t, &TemplateData::default(), &[0]).unwrap_err();
    assert!(matches!(err, ComposeError::InvalidColor(_)));
    assert!(page_ops(&doc, 1).is_empty());
}

// =============================================================
// Helpers under test
// =============================================================

#[test]
fn aligned_x_shifts_by_estimated_width() {
    assert_eq!(aligned_x(100.0, "ab", 10.0, Align::Left), 100.0);
    assert_eq!(aligned_x(100.0, "ab", 10.0, Align::Center), 94.0);
    assert_eq!(aligned_x(100.0, "ab", 10.0, Align::Right), 88.0);
}

#[test]
fn template_data_deserializes_with_defaults() {
    let data: TemplateData = serde_json::from_str("{}").unwrap();
    assert!(data.values.is_empty());
    assert!(data.rows.is_empty());
}
