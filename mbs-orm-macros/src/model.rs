use convert_case::{Case, Casing};
use darling::{FromDeriveInput, FromField, ast::Data};
use proc_macro_error2::{abort, emit_error};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Ident, Path, Type, parse2};

#[derive(FromField, Debug, Clone)]
#[darling(attributes(mbs_orm))]
struct DeriveModelField {
    ident: Option<Ident>,
    ty: Type,
    column: Option<String>,
}

#[derive(FromDeriveInput)]
#[darling(attributes(mbs_orm))]
struct DeriveModelTarget {
    ident: Ident,
    table: Option<String>,
    identity: Ident,
    extends: Option<Path>,
    data: Data<(), DeriveModelField>,
}

#[derive(Clone)]
struct TargetColumn {
    field_ident: Ident,
    db_name: String,
    struct_name: Ident,
    ty: Type,
}

pub fn derive_database_model(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match parse2(input) {
        Ok(r) => r,
        Err(e) => return e.to_compile_error(),
    };

    let target = match DeriveModelTarget::from_derive_input(&input) {
        Ok(r) => r,
        Err(e) => return e.write_errors(),
    };

    let Some(struct_data) = target.data.take_struct() else {
        abort! {
            input, "Target is not a struct.";
            note = "This macro must be run on a struct.";
        };
    };

    let columns = struct_data
        .fields
        .iter()
        .map(|e| {
            let Some(ident) = &e.ident else {
                abort! {
                    e.ty, "Field has no ident.";
                    note = "This macro cannot be run on tuple structs.";
                };
            };

            TargetColumn {
                field_ident: ident.clone(),
                db_name: e.column.clone().unwrap_or_else(|| ident.to_string()),
                struct_name: Ident::new(
                    ident.to_string().to_case(Case::Pascal).as_str(),
                    ident.span(),
                ),
                ty: e.ty.clone(),
            }
        })
        .collect::<Vec<_>>();

    // Make sure all columns have unique names.
    if let Some(duplicate) = columns
        .iter()
        .find(|e| columns.iter().filter(|o| e.db_name.eq(&o.db_name)).count() > 1)
    {
        columns.iter().for_each(|e| {
            if columns.iter().filter(|o| e.db_name.eq(&o.db_name)).count() > 1 {
                emit_error! {
                    e.field_ident.span(), "Clashing occurrence of \"{}\" here.", e.db_name
                };
            }
        });

        abort! {
            duplicate.field_ident.span(), "Duplicate column definition \"{}\"", duplicate.db_name;
            note = "Columns must have unique names, if necessary use the #[mbs_orm(column = \"my_column_name\")] attribute to specify a unique name.";
        }
    }

    let Some(identity) = columns
        .iter()
        .find(|e| e.field_ident.eq(&target.identity))
    else {
        abort! {
            target.identity, "Missing identity field \"{}\".", target.identity;
            note = "The identity must name one of the struct's fields, e.g. #[mbs_orm(identity = field_name)]";
        }
    };

    let model_ident = &target.ident;
    let table_name = target
        .table
        .clone()
        .unwrap_or_else(|| target.ident.to_string());
    let field_count = columns.len();

    let columns_module = {
        let column_impls = columns.iter().map(|e| {
            let struct_name = &e.struct_name;
            let field_ident = &e.field_ident;
            let db_name = &e.db_name;
            let ty = &e.ty;

            quote! {
                #[derive(Debug, Clone, Copy)]
                pub struct #struct_name;

                impl ::mbs_orm::entity::column::Column for #struct_name {
                    type Type = #ty;
                    type Entity = super::Entity;
                    const NAME: &'static str = #db_name;

                    fn get(model: &super::#model_ident) -> &Self::Type {
                        &model.#field_ident
                    }

                    fn get_mut(model: &mut super::#model_ident) -> &mut Self::Type {
                        &mut model.#field_ident
                    }
                }
            }
        });

        quote! {
            pub mod columns {
                #(
                    #column_impls
                )*
            }
        }
    };

    let entity_impl = {
        let identity_name = &identity.db_name;
        let column_names_decl = columns.iter().map(|e| &e.db_name);
        let parent = target.extends.as_ref().map_or_else(
            || quote! { None },
            |path| quote! { Some(<#path as ::mbs_orm::entity::Entity>::descriptor) },
        );

        quote! {
            #[derive(Debug, Clone, Copy, Default)]
            pub struct Entity;

            impl ::mbs_orm::entity::Entity for Entity {
                type Model = #model_ident;

                fn descriptor() -> &'static ::mbs_orm::entity::EntityDescriptor {
                    static DESCRIPTOR: ::mbs_orm::entity::EntityDescriptor =
                        ::mbs_orm::entity::EntityDescriptor {
                            table: #table_name,
                            identity: #identity_name,
                            fields: &[
                                #(#column_names_decl),*
                            ],
                            parent: #parent,
                        };

                    &DESCRIPTOR
                }
            }
        }
    };

    let model_impl = {
        let from_values_assignments = columns.iter().enumerate().map(|(position, e)| {
            let field_ident = &e.field_ident;
            let db_name = &e.db_name;

            quote! {
                #field_ident: ::mbs_orm::entity::value::next_field(
                    &mut values,
                    #db_name,
                    #field_count,
                    #position,
                )?,
            }
        });

        let value_of_arms = columns.iter().map(|e| {
            let field_ident = &e.field_ident;
            let db_name = &e.db_name;

            quote! {
                #db_name => Some(::mbs_orm::Value::from(
                    ::std::clone::Clone::clone(&self.#field_ident),
                )),
            }
        });

        let assign_arms = columns.iter().map(|e| {
            let field_ident = &e.field_ident;
            let db_name = &e.db_name;

            quote! {
                #db_name => {
                    self.#field_ident = ::mbs_orm::entity::value::FromValue::from_value(value)
                        .map_err(|e| e.for_field(#db_name))?;
                }
            }
        });

        quote! {
            impl ::mbs_orm::entity::model::Model for #model_ident {
                fn from_values(
                    values: ::std::vec::Vec<::mbs_orm::Value>,
                ) -> ::mbs_orm::Result<Self> {
                    if values.len() != #field_count {
                        return Err(::mbs_orm::Error::FieldCount {
                            expected: #field_count,
                            found: values.len(),
                        });
                    }

                    let mut values = values.into_iter();

                    Ok(Self {
                        #(
                            #from_values_assignments
                        )*
                    })
                }

                fn value_of(&self, field: &str) -> ::std::option::Option<::mbs_orm::Value> {
                    match field {
                        #(
                            #value_of_arms
                        )*
                        _ => None,
                    }
                }

                fn assign(&mut self, field: &str, value: ::mbs_orm::Value) -> ::mbs_orm::Result<()> {
                    match field {
                        #(
                            #assign_arms
                        )*
                        _ => {
                            return Err(::mbs_orm::Error::UnknownField {
                                entity: #table_name,
                                field: field.to_string(),
                            });
                        }
                    }

                    Ok(())
                }
            }
        }
    };

    quote! {
        #model_impl

        #entity_impl

        #columns_module
    }
}
