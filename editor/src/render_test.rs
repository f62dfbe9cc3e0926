#![allow(clippy::float_cmp)]

use super::*;
use crate::model::ElementKind;

// =============================================================
// Helpers
// =============================================================

fn viewport() -> Viewport {
    Viewport::new(0.8)
}

fn texts(out: &RenderOutput) -> Vec<&str> {
    out.commands
        .iter()
        .filter_map(|c| match c {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn count<F>(out: &RenderOutput, pred: F) -> usize
where
    F: Fn(&DrawCmd) -> bool,
{
    out.commands.iter().filter(|c| pred(c)).count()
}

fn template_with_image(path: &str) -> Template {
    let mut t = Template::new();
    let r = t.add_element(ElementKind::Image);
    if let ElementRef::Image(id) = r {
        t.image_mut(id).unwrap().path = path.to_owned();
    }
    t
}

// =============================================================
// Determinism
// =============================================================

#[test]
fn same_inputs_produce_identical_commands() {
    let mut t = Template::new();
    t.add_element(ElementKind::Title);
    t.add_element(ElementKind::Field);
    t.add_element(ElementKind::Table);
    t.add_element(ElementKind::SignatureField);
    let store = ImageStore::new();
    let vp = viewport();

    let a = render(&t, Some(ElementRef::Table), &vp, &store);
    let b = render(&t, Some(ElementRef::Table), &vp, &store);
    assert_eq!(a.commands, b.commands);
    assert_eq!(a.image_requests, b.image_requests);
}

// =============================================================
// Page chrome
// =============================================================

#[test]
fn empty_template_still_draws_page_and_margin_guide() {
    let t = Template::new();
    let out = render(&t, None, &viewport(), &ImageStore::new());

    let DrawCmd::Rect { width, height, .. } = &out.commands[0] else {
        panic!("first command must be the page background");
    };
    assert_eq!(*width, 595.0 * 0.8);
    assert_eq!(*height, 842.0 * 0.8);

    let DrawCmd::DashedRect { x, y, width, .. } = &out.commands[1] else {
        panic!("second command must be the margin guide");
    };
    assert_eq!(*x, 40.0 * 0.8);
    assert_eq!(*y, 40.0 * 0.8);
    assert_eq!(*width, (595.0 - 80.0) * 0.8);

    assert_eq!(out.commands.len(), 2);
    assert!(out.image_requests.is_empty());
}

// =============================================================
// Elements
// =============================================================

#[test]
fn title_text_is_scaled_and_styled() {
    let mut t = Template::new();
    t.add_element(ElementKind::Title);
    let out = render(&t, None, &viewport(), &ImageStore::new());

    let cmd = out
        .commands
        .iter()
        .find_map(|c| match c {
            DrawCmd::Text { text, x, size, align, .. } if text == "Title" => {
                Some((*x, *size, *align))
            }
            _ => None,
        })
        .expect("title text command");
    assert_eq!(cmd.0, 297.5 * 0.8);
    assert_eq!(cmd.1, 18.0 * 0.8);
    assert_eq!(cmd.2, Align::Center);
}

#[test]
fn field_draws_label_and_underline() {
    let mut t = Template::new();
    t.add_element(ElementKind::Field);
    let out = render(&t, None, &viewport(), &ImageStore::new());

    assert!(texts(&out).contains(&"Label"));
    let line = out
        .commands
        .iter()
        .find_map(|c| match c {
            DrawCmd::Line { x1, y1, x2, .. } => Some((*x1, *y1, *x2)),
            _ => None,
        })
        .expect("underline command");
    // Default field at (40, 100), line length 150, drop 3.
    assert_eq!(line.0, 40.0 * 0.8);
    assert_eq!(line.1, 103.0 * 0.8);
    assert_eq!(line.2, 190.0 * 0.8);
}

#[test]
fn field_without_line_skips_underline() {
    let mut t = Template::new();
    let r = t.add_element(ElementKind::Field);
    if let ElementRef::Field(id) = r {
        t.field_mut(id).unwrap().show_line = false;
    }
    let out = render(&t, None, &viewport(), &ImageStore::new());
    assert_eq!(count(&out, |c| matches!(c, DrawCmd::Line { .. })), 0);
}

#[test]
fn disabled_table_draws_nothing() {
    let mut t = Template::new();
    t.table.row_count = 5;
    let out = render(&t, None, &viewport(), &ImageStore::new());
    assert_eq!(out.commands.len(), 2); // page chrome only
}

#[test]
fn table_draws_header_labels_and_grid() {
    let mut t = Template::new();
    t.add_element(ElementKind::Table);
    let out = render(&t, None, &viewport(), &ImageStore::new());

    let labels = texts(&out);
    assert!(labels.contains(&"Column 1"));
    assert!(labels.contains(&"Column 3"));
    // 2 interior column separators + 3 horizontal rules for 3 rows.
    assert_eq!(count(&out, |c| matches!(c, DrawCmd::Line { .. })), 5);
}

#[test]
fn signature_block_draws_line_and_label_per_field() {
    let mut t = Template::new();
    t.add_element(ElementKind::SignatureField);
    let n = t.signature.fields.len();
    let out = render(&t, None, &viewport(), &ImageStore::new());
    assert_eq!(count(&out, |c| matches!(c, DrawCmd::Line { .. })), n);
    // Line spans 75% of the field width.
    let span = out
        .commands
        .iter()
        .find_map(|c| match c {
            DrawCmd::Line { x1, x2, .. } => Some(x2 - x1),
            _ => None,
        })
        .unwrap();
    assert_eq!(span, 150.0 * 0.8);
}

// =============================================================
// Image resolution states
// =============================================================

#[test]
fn unknown_image_draws_placeholder_and_requests_content() {
    let t = template_with_image("logo.png");
    let out = render(&t, None, &viewport(), &ImageStore::new());
    assert_eq!(count(&out, |c| matches!(c, DrawCmd::Placeholder { .. })), 1);
    assert_eq!(out.image_requests, vec!["logo.png".to_owned()]);
}

#[test]
fn empty_path_never_requests_content() {
    let t = template_with_image("");
    let out = render(&t, None, &viewport(), &ImageStore::new());
    assert_eq!(count(&out, |c| matches!(c, DrawCmd::Placeholder { .. })), 1);
    assert!(out.image_requests.is_empty());
}

#[test]
fn pending_image_draws_placeholder_without_rerequest() {
    let t = template_with_image("logo.png");
    let mut store = ImageStore::new();
    store.mark_pending("logo.png");
    let out = render(&t, None, &viewport(), &store);
    assert_eq!(count(&out, |c| matches!(c, DrawCmd::Placeholder { .. })), 1);
    assert!(out.image_requests.is_empty());
}

#[test]
fn failed_image_keeps_placeholder() {
    let t = template_with_image("missing.png");
    let mut store = ImageStore::new();
    store.mark_failed("missing.png");
    let out = render(&t, None, &viewport(), &store);
    assert_eq!(count(&out, |c| matches!(c, DrawCmd::Placeholder { .. })), 1);
    assert!(out.image_requests.is_empty());
}

#[test]
fn ready_image_draws_content_at_element_bounds() {
    let t = template_with_image("logo.png");
    let mut store = ImageStore::new();
    store.mark_ready("logo.png", 640.0, 480.0);
    let out = render(&t, None, &viewport(), &store);

    let cmd = out
        .commands
        .iter()
        .find_map(|c| match c {
            DrawCmd::Image { key, x, y, width, height } => {
                Some((key.clone(), *x, *y, *width, *height))
            }
            _ => None,
        })
        .expect("image command");
    assert_eq!(cmd.0, "logo.png");
    // Element bounds win over intrinsic size: default 100x100 at (40, 160).
    assert_eq!((cmd.1, cmd.2), (40.0 * 0.8, 160.0 * 0.8));
    assert_eq!((cmd.3, cmd.4), (100.0 * 0.8, 100.0 * 0.8));
}

#[test]
fn duplicate_references_request_content_once() {
    let mut t = template_with_image("logo.png");
    let r = t.add_element(ElementKind::Image);
    if let ElementRef::Image(id) = r {
        t.image_mut(id).unwrap().path = "logo.png".to_owned();
    }
    let out = render(&t, None, &viewport(), &ImageStore::new());
    assert_eq!(out.image_requests, vec!["logo.png".to_owned()]);
    assert_eq!(count(&out, |c| matches!(c, DrawCmd::Placeholder { .. })), 2);
}

// =============================================================
// Selection affordance
// =============================================================

#[test]
fn no_selection_emits_no_affordance() {
    let mut t = Template::new();
    t.add_element(ElementKind::Field);
    let out = render(&t, None, &viewport(), &ImageStore::new());
    assert_eq!(count(&out, |c| matches!(c, DrawCmd::Handle { .. })), 0);
    // Only the margin guide is dashed.
    assert_eq!(count(&out, |c| matches!(c, DrawCmd::DashedRect { .. })), 1);
}

#[test]
fn selected_field_gets_border_but_no_handles() {
    let mut t = Template::new();
    let r = t.add_element(ElementKind::Field);
    let out = render(&t, Some(r), &viewport(), &ImageStore::new());
    assert_eq!(count(&out, |c| matches!(c, DrawCmd::DashedRect { .. })), 2);
    assert_eq!(count(&out, |c| matches!(c, DrawCmd::Handle { .. })), 0);
}

#[test]
fn selected_image_gets_four_handles() {
    let mut t = Template::new();
    let r = t.add_element(ElementKind::Image);
    let out = render(&t, Some(r), &viewport(), &ImageStore::new());
    assert_eq!(count(&out, |c| matches!(c, DrawCmd::Handle { .. })), 4);
}

#[test]
fn selection_handles_keep_fixed_screen_size() {
    let mut t = Template::new();
    let r = t.add_element(ElementKind::Image);
    for scale in [0.5, 0.8, 2.0] {
        let out = render(&t, Some(r), &Viewport::new(scale), &ImageStore::new());
        for cmd in &out.commands {
            if let DrawCmd::Handle { size, .. } = cmd {
                assert_eq!(*size, 16.0);
            }
        }
    }
}

#[test]
fn selected_table_gets_handles_only_when_enabled() {
    let mut t = Template::new();
    t.add_element(ElementKind::Table);
    let out = render(&t, Some(ElementRef::Table), &viewport(), &ImageStore::new());
    assert_eq!(count(&out, |c| matches!(c, DrawCmd::Handle { .. })), 4);

    t.table.enabled = false;
    let out = render(&t, Some(ElementRef::Table), &viewport(), &ImageStore::new());
    assert_eq!(count(&out, |c| matches!(c, DrawCmd::Handle { .. })), 0);
}

#[test]
fn stale_selection_is_ignored() {
    let mut t = Template::new();
    let r = t.add_element(ElementKind::Field);
    t.remove_element(r);
    let out = render(&t, Some(r), &viewport(), &ImageStore::new());
    assert_eq!(count(&out, |c| matches!(c, DrawCmd::DashedRect { .. })), 1);
}

#[test]
fn selection_draws_on_top() {
    let mut t = Template::new();
    let r = t.add_element(ElementKind::Image);
    let out = render(&t, Some(r), &viewport(), &ImageStore::new());
    let last = out.commands.last().unwrap();
    assert!(matches!(last, DrawCmd::Handle { .. }));
}
