//! `#[derive(Record)]` (§4.9): parses field annotations into a [`FieldPlan`]
//! per field, then emits the `dimstore::typed::Record` impl directly —
//! there's only one struct shape to support, so unlike a schema-wide derive
//! there's no need for a `Strategy`-per-node-kind dispatcher.

use darling::{ast::Data, FromDeriveInput};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{DeriveInput, Error};

use crate::field::{FieldKind, FieldPlan, RecordArgs, Shape};

pub fn derive_record(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let args = match RecordArgs::from_derive_input(&input) {
        Ok(args) => args,
        Err(err) => return err.write_errors(),
    };

    let ident = args.ident.clone();

    let Data::Struct(fields) = args.data else {
        return Error::new_spanned(&ident, "Record can only be derived for structs")
            .to_compile_error();
    };

    let plans: Vec<FieldPlan> = match fields.fields.iter().map(FieldPlan::new).collect() {
        Ok(plans) => plans,
        Err(err) => return err,
    };

    let Some(document_field) = plans.iter().find_map(|p| match p.kind {
        FieldKind::Document => Some(p.ident.clone()),
        _ => None,
    }) else {
        return Error::new_spanned(
            &ident,
            "Record requires exactly one field of type `dimstore::Document`",
        )
        .to_compile_error();
    };

    let schema = dimension_schema(&plans);
    let marshal = marshal_fields(&plans, &document_field);
    let unmarshal = unmarshal_fields(&plans);
    let field_idents: Vec<&Ident> = plans.iter().map(|p| &p.ident).collect();

    quote! {
        impl ::dimstore::typed::Record for #ident {
            fn dimension_schema() -> ::std::vec::Vec<::dimstore::Dimension> {
                #schema
            }

            fn into_document(self) -> ::dimstore::Document {
                let Self { #(#field_idents),* } = self;
                let mut document = #document_field;
                #(#marshal)*
                document
            }

            fn from_document(
                document: ::dimstore::Document,
            ) -> ::std::result::Result<Self, ::dimstore::typed::TypedError> {
                #(#unmarshal)*
                Ok(Self { #(#field_idents),* })
            }

            fn document(&self) -> &::dimstore::Document {
                &self.#document_field
            }
        }
    }
}

fn dimension_schema(plans: &[FieldPlan]) -> TokenStream {
    let entries = plans.iter().filter_map(|plan| match &plan.kind {
        FieldKind::Enumerated {
            dim_name,
            values,
            default,
            prefixes,
        } => {
            let default_tokens = match default {
                Some(d) => quote! { Some(#d.to_owned()) },
                None => quote! { None },
            };
            let (prefix_values, prefix_letters): (Vec<_>, Vec<_>) =
                prefixes.iter().map(|(v, l)| (v.clone(), *l)).unzip();
            Some(quote! {
                ::dimstore::Dimension::Enumerated {
                    name: #dim_name.to_owned(),
                    values: vec![#(#values.to_owned()),*],
                    default_value: #default_tokens,
                    prefixes: ::std::collections::BTreeMap::from([
                        #((#prefix_values.to_owned(), #prefix_letters)),*
                    ]),
                }
            })
        }
        FieldKind::Hierarchical { ref_field } => {
            let name = plan.ident.to_string();
            Some(quote! {
                ::dimstore::Dimension::Hierarchical {
                    name: #name.to_owned(),
                    ref_field: #ref_field.to_owned(),
                }
            })
        }
        FieldKind::Document | FieldKind::Data | FieldKind::Excluded => None,
    });
    quote! { vec![#(#entries),*] }
}

fn marshal_fields(plans: &[FieldPlan], document_field: &Ident) -> Vec<TokenStream> {
    plans
        .iter()
        .filter(|p| &p.ident != document_field)
        .filter_map(|plan| {
            let ident = &plan.ident;
            match &plan.kind {
                FieldKind::Document => None,
                FieldKind::Excluded => None,
                FieldKind::Enumerated { dim_name, .. } => {
                    let to_scalar = to_scalar_tokens(plan.shape, ident);
                    Some(quote! {
                        if let Some(value) = #to_scalar {
                            document.set_dimension(#dim_name, value);
                        }
                    })
                }
                FieldKind::Hierarchical { ref_field } => {
                    let to_scalar = to_scalar_tokens(plan.shape, ident);
                    Some(quote! {
                        if let Some(value) = #to_scalar {
                            document.set_dimension(#ref_field, value);
                        }
                    })
                }
                FieldKind::Data => {
                    let name = ident.to_string();
                    let to_scalar = to_scalar_tokens(plan.shape, ident);
                    Some(quote! {
                        if let Some(value) = #to_scalar {
                            document.set_data_field(#name, value);
                        }
                    })
                }
            }
        })
        .collect()
}

fn unmarshal_fields(plans: &[FieldPlan]) -> Vec<TokenStream> {
    plans
        .iter()
        .map(|plan| {
            let ident = &plan.ident;
            match &plan.kind {
                FieldKind::Document => quote! { let #ident = document.clone(); },
                FieldKind::Excluded => quote! { let #ident = ::std::default::Default::default(); },
                FieldKind::Enumerated { dim_name, default, .. } => {
                    let source = quote! { document.dimension(#dim_name) };
                    let default_lit = default.clone().unwrap_or_default();
                    from_scalar_tokens(plan.shape, ident, &source, &default_lit, dim_name)
                }
                FieldKind::Hierarchical { ref_field } => {
                    let source = quote! { document.dimension(#ref_field) };
                    from_scalar_tokens(plan.shape, ident, &source, "", ref_field)
                }
                FieldKind::Data => {
                    let name = ident.to_string();
                    let source = quote! { document.data_fields().get(#name) };
                    from_scalar_tokens(plan.shape, ident, &source, "", &name)
                }
            }
        })
        .collect()
}

/// `&T -> Option<ScalarValue>`, `None` meaning "skip" (§4.9: zero values are
/// not written, but `bool` is never skipped).
fn to_scalar_tokens(shape: Shape, ident: &Ident) -> TokenStream {
    match shape {
        Shape::Str => quote! {
            if #ident.is_empty() { None } else { Some(::dimstore::ScalarValue::from(#ident)) }
        },
        Shape::Bool => quote! { Some(::dimstore::ScalarValue::from(#ident)) },
        Shape::I64 => quote! {
            if #ident == 0 { None } else { Some(::dimstore::ScalarValue::from(#ident)) }
        },
        Shape::F64 => quote! {
            if #ident == 0.0 { None } else { Some(::dimstore::ScalarValue::from(#ident)) }
        },
        Shape::Timestamp => quote! { Some(::dimstore::ScalarValue::from(#ident)) },
        Shape::OptStr => quote! {
            #ident.filter(|v| !v.is_empty()).map(::dimstore::ScalarValue::from)
        },
        Shape::OptBool => quote! { #ident.map(::dimstore::ScalarValue::from) },
        Shape::OptI64 => quote! { #ident.filter(|v| *v != 0).map(::dimstore::ScalarValue::from) },
        Shape::OptF64 => quote! { #ident.filter(|v| *v != 0.0).map(::dimstore::ScalarValue::from) },
        Shape::OptTimestamp => quote! { #ident.map(::dimstore::ScalarValue::from) },
        Shape::OptUuid => quote! { #ident.map(|v| ::dimstore::ScalarValue::from(v.to_string())) },
    }
}

/// `Option<&ScalarValue> -> Result<FieldType, TypedError>`, delegating the
/// actual coercion to `dimstore::typed::coerce` so the generated code stays
/// a single function call per field.
fn from_scalar_tokens(
    shape: Shape,
    ident: &Ident,
    source: &TokenStream,
    default_lit: &str,
    field_name: &str,
) -> TokenStream {
    let coerce = quote! { ::dimstore::typed::coerce };
    let body = match shape {
        Shape::Str => quote! { #coerce::str_value(#source, #field_name, #default_lit)? },
        Shape::Bool => quote! { #coerce::bool_value(#source, #field_name)? },
        Shape::I64 => quote! { #coerce::i64_value(#source, #field_name)? },
        Shape::F64 => quote! { #coerce::f64_value(#source, #field_name)? },
        Shape::Timestamp => quote! { #coerce::timestamp_value(#source, #field_name)? },
        Shape::OptStr => quote! { #coerce::opt_str_value(#source, #field_name)? },
        Shape::OptBool => quote! { #coerce::opt_bool_value(#source, #field_name)? },
        Shape::OptI64 => quote! { #coerce::opt_i64_value(#source, #field_name)? },
        Shape::OptF64 => quote! { #coerce::opt_f64_value(#source, #field_name)? },
        Shape::OptTimestamp => quote! { #coerce::opt_timestamp_value(#source, #field_name)? },
        Shape::OptUuid => quote! { #coerce::opt_uuid_value(#source, #field_name)? },
    };
    quote! { let #ident = #body; }
}
