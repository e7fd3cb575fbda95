use proc_macro::TokenStream;
use quote::ToTokens;
use syn::parse_macro_input;

/// Restricts a method of the `Game` struct to a single phase of the game.
///
/// `#[allowed_phase(PlaceBets)]` prepends a guard to the method body that
/// returns an `EngineError::WrongPhase` carrying the method name and the
/// actual phase whenever the game is not in the `PlaceBets` phase.
#[proc_macro_attribute]
pub fn allowed_phase(attr: TokenStream, item: TokenStream) -> TokenStream {
    let phase = parse_macro_input!(attr as syn::Ident);
    let mut method = parse_macro_input!(item as syn::ImplItemFn);
    let operation = method.sig.ident.to_string();

    let guard: syn::Stmt = syn::parse_quote! {
        if self.current_game_phase != GamePhase::#phase {
            return Err(crate::EngineError::WrongPhase {
                operation: #operation,
                phase: self.current_game_phase,
            });
        }
    };
    method.block.stmts.insert(0, guard);
    method.into_token_stream().into()
}
