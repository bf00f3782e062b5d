use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    DeriveInput, Ident, Token, Type,
};

/// UID attributes
///
/// #[uid(data = <type>)]
pub struct Attributes {
    data: Type,
}

impl Parse for Attributes {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let key = input.parse::<Ident>()?;
        if key != "data" {
            return Err(syn::Error::new(
                key.span(),
                format!("unknown uid attribute `{key}`, expected `data`"),
            ));
        }
        input.parse::<Token!(=)>()?;
        let data = input.parse::<Type>()?;
        let _ = input.parse::<Option<Token!(,)>>()?;
        Ok(Self { data })
    }
}

impl Attributes {
    pub fn from_input(input: &DeriveInput) -> syn::Result<Self> {
        input
            .attrs
            .iter()
            .find(|attr| attr.path().is_ident("uid"))
            .ok_or_else(|| {
                syn::Error::new_spanned(
                    &input.ident,
                    "UID derive requires a `#[uid(data = <type>)]` attribute",
                )
            })?
            .parse_args()
    }
    pub fn expand(&self, input: &DeriveInput) -> proc_macro2::TokenStream {
        let DeriveInput {
            ident, generics, ..
        } = input;
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
        let data = &self.data;
        quote! {
            impl #impl_generics ::interface::UniqueIdentifier for #ident #ty_generics #where_clause {
                type DataType = #data;
            }
        }
    }
}
