//! `#[derive(Record)]`, the typed reflection layer's entry point (§4.9).
//! Field annotations are parsed in [`field`]; the impl itself is built in
//! [`record`].

use proc_macro::TokenStream;

mod field;
mod record;

#[proc_macro_derive(Record, attributes(dimension))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input.into()).into()
}
