//! Literal decoding and source printing for a small expression language.
//!
//! # Literals
//!
//! String and bytes literals are written between single (`'`) or double (`"`)
//! quotes, or between tripled quotes (`'''` or `"""`) when the literal contains
//! the quote character itself. [`escape::decode`] turns such a token into its
//! runtime value. The recognized escape sequences are:
//!
//! - `\a`, `\b`, `\f`, `\n`, `\r`, `\t`, `\v` for control characters.
//! - `\'`, `\"`, `\\` and `\?` for the character itself.
//! - `\ddd` with up to three octal digits and `\xHH` with two hexadecimal
//!   digits, for a single byte or a code point below 256.
//! - `\uHHHH` and `\UHHHHHHHH` for any unicode code point. These are not
//!   allowed in bytes literals.
//!
//! # Printing
//!
//! [`printer::to_string`] prints a parsed [`ast::Expr`] back into source text.
//! Operators are printed infix with the parentheses their precedence requires,
//! and the original spacing and line breaks are approximated from the node
//! offsets in a [`source::SourceInfo`].

pub mod ast;
pub mod escape;
pub mod operators;
pub mod printer;
pub mod source;

pub use escape::{decode, DecodeError, DecodeMode, Decoded};
pub use printer::{to_string, to_string_with, RenderError, RenderOptions};
