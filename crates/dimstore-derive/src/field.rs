//! Per-field annotation parsing: darling turns `#[dimension(...)]` into a
//! small struct per field, `FieldPlan` turns that struct into the shape
//! [`record`](crate::record) actually needs to generate code.

use std::collections::BTreeMap;

use darling::{FromDeriveInput, FromField};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{Error, Type};

#[derive(Debug, FromField)]
#[darling(attributes(dimension))]
pub struct FieldArgs {
    pub ident: Option<Ident>,
    pub ty: Type,
    #[darling(default)]
    pub values: Option<String>,
    #[darling(default)]
    pub default: Option<String>,
    #[darling(default)]
    pub prefix: Option<String>,
    #[darling(default)]
    pub ref_field: Option<String>,
    #[darling(default)]
    pub exclude: bool,
}

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(dimension), supports(struct_named))]
pub struct RecordArgs {
    pub ident: Ident,
    pub data: darling::ast::Data<darling::util::Ignored, FieldArgs>,
}

/// The handful of scalar shapes a field may hold (§4.9: "reject containers,
/// maps, and non-time structs"). Anything else is a derive-time error.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Str,
    Bool,
    I64,
    F64,
    Timestamp,
    OptStr,
    OptBool,
    OptI64,
    OptF64,
    OptTimestamp,
    OptUuid,
}

impl Shape {
    fn from_type(ty: &Type) -> Option<Self> {
        let text = quote!(#ty).to_string().replace(' ', "");
        Some(match text.as_str() {
            "String" => Self::Str,
            "bool" => Self::Bool,
            "i64" => Self::I64,
            "f64" => Self::F64,
            "DateTime<Utc>" | "chrono::DateTime<Utc>" | "chrono::DateTime<chrono::Utc>" => {
                Self::Timestamp
            }
            "Option<String>" => Self::OptStr,
            "Option<bool>" => Self::OptBool,
            "Option<i64>" => Self::OptI64,
            "Option<f64>" => Self::OptF64,
            "Option<DateTime<Utc>>"
            | "Option<chrono::DateTime<Utc>>"
            | "Option<chrono::DateTime<chrono::Utc>>" => Self::OptTimestamp,
            "Option<Uuid>" | "Option<uuid::Uuid>" => Self::OptUuid,
            _ => return None,
        })
    }
}

/// What a single struct field means to the typed reflection layer, derived
/// from its `#[dimension(...)]` attribute (or lack of one).
pub enum FieldKind {
    /// The embedded `dimstore::Document` every record composes (§4.9, §9).
    Document,
    /// `values:"a,b,c"` (+ optional `default`/`prefix`) — an enumerated
    /// dimension, stored under its own (lower-cased) field name.
    Enumerated {
        dim_name: String,
        values: Vec<String>,
        default: Option<String>,
        prefixes: BTreeMap<String, char>,
    },
    /// `ref:"parent_uuid"` — the hierarchical dimension, whose value lives
    /// under the dimensions-map key `ref_field` rather than the field's own
    /// name (matching `Dimension::Hierarchical::ref_field`).
    Hierarchical { ref_field: String },
    /// Unannotated — marshalled under `_data.<FieldName>`.
    Data,
    /// `exclude` — not marshalled at all; rebuilt via `Default::default()`.
    Excluded,
}

pub struct FieldPlan {
    pub ident: Ident,
    pub shape: Shape,
    pub kind: FieldKind,
}

impl FieldPlan {
    pub fn new(field: &FieldArgs) -> Result<Self, TokenStream> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| Error::new_spanned(&field.ty, "tuple fields are not supported").to_compile_error())?;

        if is_document_type(&field.ty) {
            return Ok(Self {
                ident,
                shape: Shape::Str, // unused for Document fields
                kind: FieldKind::Document,
            });
        }

        if field.exclude {
            // Excluded fields are rebuilt via `Default::default()` on
            // unmarshal, so their type is unconstrained (§4.9 "exclude from
            // dimensions").
            return Ok(Self {
                ident,
                shape: Shape::Str, // unused for excluded fields
                kind: FieldKind::Excluded,
            });
        }

        let shape = Shape::from_type(&field.ty).ok_or_else(|| {
            Error::new_spanned(
                &field.ty,
                "Record fields must be String, bool, i64, f64, DateTime<Utc>, Uuid, \
                 or Option<...> of those",
            )
            .to_compile_error()
        })?;

        let kind = if let Some(ref_field) = &field.ref_field {
            if !matches!(shape, Shape::OptUuid | Shape::OptStr) {
                return Err(Error::new_spanned(
                    &field.ty,
                    "a `ref` dimension field must be Option<Uuid> or Option<String>",
                )
                .to_compile_error());
            }
            FieldKind::Hierarchical {
                ref_field: ref_field.clone(),
            }
        } else if field.values.is_some() || field.default.is_some() || field.prefix.is_some() {
            if shape != Shape::Str {
                return Err(Error::new_spanned(
                    &field.ty,
                    "an enumerated dimension field (`values`/`default`/`prefix`) must be String",
                )
                .to_compile_error());
            }
            let values: Vec<String> = field
                .values
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
            if values.is_empty() {
                return Err(Error::new_spanned(
                    &field.ty,
                    "a dimension field needs `values:\"a,b,c\"`",
                )
                .to_compile_error());
            }
            let prefixes = parse_prefix_map(field.prefix.as_deref().unwrap_or_default());
            FieldKind::Enumerated {
                dim_name: ident.to_string(),
                values,
                default: field.default.clone(),
                prefixes,
            }
        } else {
            FieldKind::Data
        };

        Ok(Self { ident, shape, kind })
    }
}

fn is_document_type(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "Document")
}

fn parse_prefix_map(spec: &str) -> BTreeMap<String, char> {
    spec.split(',')
        .filter_map(|pair| {
            let (value, letter) = pair.split_once('=')?;
            let value = value.trim();
            let letter = letter.trim().chars().next()?;
            if value.is_empty() {
                return None;
            }
            Some((value.to_owned(), letter))
        })
        .collect()
}
