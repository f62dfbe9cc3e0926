//! Template model: the serializable description of one printable page.
//!
//! A [`Template`] owns every element placed on the page: an optional title,
//! labeled text fields, images, a tabular grid, and a signature block. All
//! geometry is stored in document points (origin top-left); the model never
//! sees screen coordinates. Elements held in collections carry a stable
//! [`ElementId`] assigned at creation, so deleting one element never
//! invalidates references to the others.
//!
//! Data flows into this layer from persisted JSON (serde) and from the
//! interaction engine (mutations). The preview renderer and the output
//! compositor both read the same model, which is what keeps the two
//! renderers geometrically consistent.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{PAGE_HEIGHT, PAGE_WIDTH, TABLE_HEADER_HEIGHT, TABLE_ROW_HEIGHT};
use crate::viewport::Point;

/// Stable identifier for an element held in a collection.
pub type ElementId = Uuid;

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// The page title, at most one per template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
    pub position: Point,
    pub font_size: f64,
    pub font_family: String,
    pub align: Align,
    pub color: String,
}

impl Default for Title {
    fn default() -> Self {
        Self {
            text: "Title".to_owned(),
            position: Point::new(297.5, 60.0),
            font_size: 18.0,
            font_family: "Helvetica".to_owned(),
            align: Align::Center,
            color: "#000000".to_owned(),
        }
    }
}

/// A labeled text field bound to a data key at generation time.
///
/// The field stores only the binding key; concrete values are supplied by
/// the data-binding source when the template is composed into final output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: ElementId,
    pub label: String,
    pub binding_key: String,
    pub position: Point,
    pub font_size: f64,
    pub font_family: String,
    pub show_line: bool,
    pub line_length: f64,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            label: "Label".to_owned(),
            binding_key: String::new(),
            position: Point::new(40.0, 100.0),
            font_size: 12.0,
            font_family: "Helvetica".to_owned(),
            show_line: true,
            line_length: 150.0,
        }
    }
}

/// An image placed on the page. `path` is a reference resolved by the
/// external content service; the model never holds image bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: ElementId,
    pub path: String,
    pub position: Point,
    pub width: f64,
    pub height: f64,
}

impl Default for Image {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            path: String::new(),
            position: Point::new(40.0, 160.0),
            width: 100.0,
            height: 100.0,
        }
    }
}

/// One column of the table grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    pub name: String,
    pub width: f64,
    #[serde(default)]
    pub align: Align,
}

/// Text styling for a table band (header or body rows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStyle {
    pub font_size: f64,
    pub text_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

impl TableStyle {
    fn header() -> Self {
        Self {
            font_size: 11.0,
            text_color: "#000000".to_owned(),
            fill: Some("#E8E8E8".to_owned()),
        }
    }

    fn row() -> Self {
        Self { font_size: 10.0, text_color: "#000000".to_owned(), fill: None }
    }
}

/// The tabular grid, at most one per template.
///
/// The bounding box is derived: width is the sum of column widths, height is
/// the header band plus `row_count` body rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub enabled: bool,
    pub position: Point,
    pub columns: Vec<TableColumn>,
    pub row_count: u32,
    pub header_style: TableStyle,
    pub row_style: TableStyle,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            enabled: false,
            position: Point::new(40.0, 300.0),
            columns: (1..=3)
                .map(|n| TableColumn {
                    name: format!("Column {n}"),
                    width: 100.0,
                    align: Align::Left,
                })
                .collect(),
            row_count: 3,
            header_style: TableStyle::header(),
            row_style: TableStyle::row(),
        }
    }
}

impl Table {
    /// Derived width: sum of column widths.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// Derived height: header band plus body rows.
    #[must_use]
    pub fn height(&self) -> f64 {
        TABLE_HEADER_HEIGHT + f64::from(self.row_count) * TABLE_ROW_HEIGHT
    }
}

/// One labeled slot inside the signature block. Its absolute position is
/// `block.base_position + relative_position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureField {
    pub id: ElementId,
    pub label: String,
    pub relative_position: Point,
}

/// The signature block, at most one per template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureBlock {
    pub enabled: bool,
    pub base_position: Point,
    pub fields: Vec<SignatureField>,
}

impl Default for SignatureBlock {
    fn default() -> Self {
        Self {
            enabled: false,
            base_position: Point::new(40.0, 720.0),
            fields: vec![
                SignatureField {
                    id: Uuid::new_v4(),
                    label: "Signature".to_owned(),
                    relative_position: Point::new(0.0, 0.0),
                },
                SignatureField {
                    id: Uuid::new_v4(),
                    label: "Date".to_owned(),
                    relative_position: Point::new(280.0, 0.0),
                },
            ],
        }
    }
}

impl SignatureBlock {
    /// Absolute document position of one signature field.
    #[must_use]
    pub fn absolute(&self, field: &SignatureField) -> Point {
        Point::new(
            self.base_position.x + field.relative_position.x,
            self.base_position.y + field.relative_position.y,
        )
    }
}

/// Advisory page margins. Drawn as a guide rectangle in the preview; not
/// enforced on element placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self { top: 40.0, bottom: 40.0, left: 40.0, right: 40.0 }
    }
}

/// Reference to one element in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ElementRef {
    Title,
    Field(ElementId),
    Image(ElementId),
    Table,
    SignatureField(ElementId),
}

/// Element kind used by the add-element command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Title,
    Field,
    Image,
    Table,
    SignatureField,
}

/// The full template: every element on one page, plus page geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub page_width: f64,
    pub page_height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub table: Table,
    #[serde(default)]
    pub signature: SignatureBlock,
    #[serde(default)]
    pub margins: Margins,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            page_width: PAGE_WIDTH,
            page_height: PAGE_HEIGHT,
            title: None,
            fields: Vec::new(),
            images: Vec::new(),
            table: Table::default(),
            signature: SignatureBlock::default(),
            margins: Margins::default(),
        }
    }
}

impl Template {
    /// Create an empty template on a default A4 page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(&self, id: ElementId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_mut(&mut self, id: ElementId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    #[must_use]
    pub fn image(&self, id: ElementId) -> Option<&Image> {
        self.images.iter().find(|i| i.id == id)
    }

    pub fn image_mut(&mut self, id: ElementId) -> Option<&mut Image> {
        self.images.iter_mut().find(|i| i.id == id)
    }

    #[must_use]
    pub fn signature_field(&self, id: ElementId) -> Option<&SignatureField> {
        self.signature.fields.iter().find(|f| f.id == id)
    }

    pub fn signature_field_mut(&mut self, id: ElementId) -> Option<&mut SignatureField> {
        self.signature.fields.iter_mut().find(|f| f.id == id)
    }

    /// Whether `target` currently resolves to a live element.
    #[must_use]
    pub fn contains(&self, target: ElementRef) -> bool {
        match target {
            ElementRef::Title => self.title.is_some(),
            ElementRef::Field(id) => self.field(id).is_some(),
            ElementRef::Image(id) => self.image(id).is_some(),
            ElementRef::Table => self.table.enabled,
            ElementRef::SignatureField(id) => {
                self.signature.enabled && self.signature_field(id).is_some()
            }
        }
    }

    /// Add an element of the given kind with default geometry.
    ///
    /// Singleton kinds (title, table) are created or enabled in place;
    /// adding them twice is idempotent. Adding a signature field enables
    /// the block if it was disabled.
    pub fn add_element(&mut self, kind: ElementKind) -> ElementRef {
        match kind {
            ElementKind::Title => {
                if self.title.is_none() {
                    self.title = Some(Title::default());
                }
                ElementRef::Title
            }
            ElementKind::Field => {
                let field = Field::default();
                let id = field.id;
                self.fields.push(field);
                ElementRef::Field(id)
            }
            ElementKind::Image => {
                let image = Image::default();
                let id = image.id;
                self.images.push(image);
                ElementRef::Image(id)
            }
            ElementKind::Table => {
                self.table.enabled = true;
                ElementRef::Table
            }
            ElementKind::SignatureField => {
                self.signature.enabled = true;
                let field = SignatureField {
                    id: Uuid::new_v4(),
                    label: "Signature".to_owned(),
                    relative_position: Point::new(0.0, 0.0),
                };
                let id = field.id;
                self.signature.fields.push(field);
                ElementRef::SignatureField(id)
            }
        }
    }

    /// Remove an element. Returns `false` if it did not exist.
    ///
    /// Removing the table or a lone title clears/disables the singleton;
    /// other elements are dropped from their collection without disturbing
    /// sibling ids.
    pub fn remove_element(&mut self, target: ElementRef) -> bool {
        match target {
            ElementRef::Title => self.title.take().is_some(),
            ElementRef::Field(id) => {
                let before = self.fields.len();
                self.fields.retain(|f| f.id != id);
                self.fields.len() != before
            }
            ElementRef::Image(id) => {
                let before = self.images.len();
                self.images.retain(|i| i.id != id);
                self.images.len() != before
            }
            ElementRef::Table => {
                let was = self.table.enabled;
                self.table.enabled = false;
                was
            }
            ElementRef::SignatureField(id) => {
                let before = self.signature.fields.len();
                self.signature.fields.retain(|f| f.id != id);
                self.signature.fields.len() != before
            }
        }
    }
}
