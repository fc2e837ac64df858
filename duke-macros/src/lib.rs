//! Crate for compile time checked strings of class names and the like.
//!
//! Each macro takes a string literal, checks it at compile time and expands to a `&'static` slice type of `duke`:
//! ```
//! use duke::tree::class::ClassNameSlice;
//! use duke_macros::class_name;
//!
//! let object: &ClassNameSlice = class_name!("java/lang/Object");
//! assert_eq!(object.as_inner(), "java/lang/Object");
//! ```
//! An invalid literal, like `class_name!("a.b")`, is a compile error.

use proc_macro::TokenStream;
use quote::quote;
use syn::__private::TokenStream2;
use syn::parse_macro_input;
use crate::names::{is_valid_class_name, is_valid_field_descriptor, is_valid_method_descriptor, is_valid_method_name, is_valid_unqualified_name};

mod names;

fn check(tokens: TokenStream, checker: impl Fn(&str) -> Result<(), String>, path: TokenStream2) -> TokenStream {
	let input: syn::LitStr = parse_macro_input!(tokens);

	match checker(&input.value()) {
		Ok(()) => quote!{{
			let string: &'static str = #input;
			// SAFETY: We checked that `string` is valid for `#path` because of the `checker` call on `#input` above.
			unsafe { #path::from_inner_unchecked(string) }
		}},
		Err(msg) => syn::Error::new(input.span(), msg).into_compile_error(),
	}.into()
}

#[proc_macro]
pub fn class_name(tokens: TokenStream) -> TokenStream {
	check(tokens, is_valid_class_name, quote!{duke::tree::class::ClassNameSlice})
}

#[proc_macro]
pub fn field_name(tokens: TokenStream) -> TokenStream {
	check(tokens, |x| is_valid_unqualified_name(x, "field"), quote!{duke::tree::field::FieldNameSlice})
}

#[proc_macro]
pub fn field_descriptor(tokens: TokenStream) -> TokenStream {
	check(tokens, is_valid_field_descriptor, quote!{duke::tree::field::FieldDescriptorSlice})
}

#[proc_macro]
pub fn method_name(tokens: TokenStream) -> TokenStream {
	check(tokens, is_valid_method_name, quote!{duke::tree::method::MethodNameSlice})
}

#[proc_macro]
pub fn method_descriptor(tokens: TokenStream) -> TokenStream {
	check(tokens, is_valid_method_descriptor, quote!{duke::tree::method::MethodDescriptorSlice})
}

#[proc_macro]
pub fn local_variable(tokens: TokenStream) -> TokenStream {
	check(tokens, |x| is_valid_unqualified_name(x, "local variable"), quote!{duke::tree::method::code::LocalVariableNameSlice})
}
