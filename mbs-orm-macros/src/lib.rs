mod model;

use model::derive_database_model;
use proc_macro::TokenStream;
use proc_macro_error2::proc_macro_error;

/// Derive the entity description of a model struct.
///
/// ```ignore
/// #[derive(DatabaseModel)]
/// #[mbs_orm(table = "Student", identity = student_id, extends = super::user::Entity)]
/// pub struct Model {
///     pub user_id: i64,
///     #[mbs_orm(column = "name_")]
///     pub name: String,
///     pub student_id: i64,
/// }
/// ```
#[proc_macro_error]
#[proc_macro_derive(DatabaseModel, attributes(mbs_orm))]
pub fn database_model(input: TokenStream) -> TokenStream {
    derive_database_model(input.into()).into()
}
