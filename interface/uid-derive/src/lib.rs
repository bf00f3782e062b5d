/*!
# UID

A derive macro that implements the [UniqueIdentifier] trait.

The data type associated with the identifier is set with the `uid` attribute:
```ignore
use interface::UID;

#[derive(UID)]
#[uid(data = Point2D)]
pub enum ParticlePosition {}
```

[UniqueIdentifier]: ../interface/trait.UniqueIdentifier.html
*/

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod uid;

#[proc_macro_derive(UID, attributes(uid))]
pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    uid::Attributes::from_input(&input)
        .map_or_else(syn::Error::into_compile_error, |attrs| attrs.expand(&input))
        .into()
}
