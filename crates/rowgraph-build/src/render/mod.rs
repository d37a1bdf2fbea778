//! Renders mapping plans as Rust functions over `::rowgraph` runtime types.

use crate::{
    BuildError,
    plan::{Expr, MappingFn, Stmt, Var},
};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use rowgraph_config_build::Lookup;
use rowgraph_schema::types::TypeRef;
use syn::{Path, parse_str};

// render_all
pub fn render_all(plans: &[MappingFn]) -> Result<TokenStream, BuildError> {
    let mut tokens = quote!();
    for plan in plans {
        tokens.extend(render_fn(plan)?);
    }

    Ok(tokens)
}

// render_fn
/// The mapping function for one plan, plus its list companion if any.
pub fn render_fn(plan: &MappingFn) -> Result<TokenStream, BuildError> {
    let renderer = Renderer { plan };

    let name = ident(&plan.name)?;
    let entity = path(&plan.entity)?;
    let key = plan.key.as_type();
    let rows = var(&plan.rows)?;
    let body = renderer.block(&plan.body)?;
    let doc = format!(" Maps flat rows to `{}` roots keyed by id.", plan.entity);

    let mut tokens = quote! {
        #[doc = #doc]
        #[allow(
            clippy::clone_on_copy,
            clippy::needless_return,
            clippy::redundant_clone,
            unused_mut
        )]
        pub fn #name<R: ::rowgraph::Row>(#rows: &[R]) -> ::rowgraph::RootMap<#key, #entity> {
            #body
        }
    };

    if let Some(list_name) = &plan.list_name {
        let list_name = ident(list_name)?;
        tokens.extend(quote! {
            pub fn #list_name<R: ::rowgraph::Row>(rows: &[R]) -> ::std::vec::Vec<#entity> {
                #name(rows).into_values().collect()
            }
        });
    }

    Ok(tokens)
}

///
/// Renderer
///

struct Renderer<'a> {
    plan: &'a MappingFn,
}

impl Renderer<'_> {
    fn block(&self, stmts: &[Stmt]) -> Result<TokenStream, BuildError> {
        let mut tokens = quote!();
        for stmt in stmts {
            tokens.extend(self.stmt(stmt)?);
        }

        Ok(tokens)
    }

    fn stmt(&self, stmt: &Stmt) -> Result<TokenStream, BuildError> {
        let tokens = match stmt {
            Stmt::Let { var: v, value } => {
                let v = var(v)?;
                let value = self.expr(value)?;
                quote!(let mut #v = #value;)
            }

            Stmt::LetOrSkip { var: v, value } => {
                let v = var(v)?;
                let value = self.expr(value)?;
                quote! {
                    let ::core::option::Option::Some(#v) = #value else {
                        continue;
                    };
                }
            }

            Stmt::IfSome {
                var: v,
                value,
                body,
            } => {
                let v = var(v)?;
                let value = self.expr(value)?;
                let body = self.block(body)?;
                quote! {
                    if let ::core::option::Option::Some(#v) = #value {
                        #body
                    }
                }
            }

            Stmt::ForEachRow { row, body } => {
                let row = var(row)?;
                let rows = var(&self.plan.rows)?;
                let body = self.block(body)?;
                quote! {
                    for #row in #rows.iter() {
                        #body
                    }
                }
            }

            Stmt::ForEachRoot {
                map,
                key,
                value,
                body,
            } => {
                let map = var(map)?;
                let key = var(key)?;
                let value = var(value)?;
                let body = self.block(body)?;
                quote! {
                    for (#key, #value) in #map.iter_mut() {
                        let #key = ::core::clone::Clone::clone(#key);
                        #body
                    }
                }
            }

            Stmt::Insert { map, key, value } => {
                let map = var(map)?;
                let key = var(key)?;
                let value = self.expr(value)?;
                quote!(#map.insert(::core::clone::Clone::clone(&#key), #value);)
            }

            Stmt::Union { acc, key, items } => {
                let acc = var(acc)?;
                let key = var(key)?;
                let items = self.expr(items)?;
                quote! {
                    #acc.entry(::core::clone::Clone::clone(&#key))
                        .or_default()
                        .extend(#items);
                }
            }

            Stmt::Extend {
                target,
                field,
                items,
            } => {
                let target = var(target)?;
                let field = ident(field)?;
                let items = self.expr(items)?;
                quote!(#target.#field.extend(#items);)
            }

            Stmt::Return(v) => {
                let v = var(v)?;
                quote!(return #v;)
            }
        };

        Ok(tokens)
    }

    fn expr(&self, expr: &Expr) -> Result<TokenStream, BuildError> {
        let tokens = match expr {
            Expr::Var(v) => {
                let v = var(v)?;
                quote!(#v)
            }

            Expr::NewRootMap { key, entity } => {
                let key = key.as_type();
                let entity = path(entity)?;
                quote!(::rowgraph::RootMap::<#key, #entity>::new())
            }

            Expr::NewAccumulator {
                key,
                target_key,
                target,
            } => {
                let key = key.as_type();
                let target_key = target_key.as_type();
                let target = path(target)?;
                quote! {
                    ::std::collections::BTreeMap::<#key, ::rowgraph::RootMap<#target_key, #target>>::new()
                }
            }

            Expr::CallMapping { function, rows, .. } => {
                let function = ident(function)?;
                let rows = var(rows)?;
                quote!(#function(#rows))
            }

            Expr::ReadId { row, column, ty } => {
                let row = var(row)?;
                let ty = ty.as_type();
                let table = column.table.as_str();
                let column = column.column.as_str();
                quote!(::rowgraph::Row::get::<#ty>(#row, #table, #column))
            }

            Expr::Decode { row, entity } => {
                let row = var(row)?;
                let entity = path(entity)?;
                quote!(<#entity as ::rowgraph::FromRow>::from_row(#row))
            }

            Expr::GetRoot { map, key } => {
                let map = var(map)?;
                let key = var(key)?;
                quote!(#map.get(&#key).cloned())
            }

            Expr::UnwrapOrElse { value, fallback } => {
                let value = self.expr(value)?;
                let fallback = self.expr(fallback)?;
                quote!(#value.unwrap_or_else(|| #fallback))
            }

            Expr::IsPresent(inner) => {
                let inner = self.expr(inner)?;
                quote!(#inner.is_some())
            }

            Expr::IfElse {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.expr(cond)?;
                let then = self.expr(then)?;
                let otherwise = self.expr(otherwise)?;
                quote!(if #cond { #then } else { #otherwise })
            }

            Expr::Some(inner) => {
                let inner = self.expr(inner)?;
                quote!(::core::option::Option::Some(#inner))
            }

            Expr::None => quote!(::core::option::Option::None),

            Expr::Into(inner) => {
                let inner = self.expr(inner)?;
                quote!(::core::convert::Into::into(#inner))
            }

            Expr::Embed {
                entity,
                base,
                fields,
            } => {
                let entity = path(entity)?;
                let base = var(base)?;
                let names = fields
                    .iter()
                    .map(|(field, _)| ident(field))
                    .collect::<Result<Vec<_>, _>>()?;
                let values = fields
                    .iter()
                    .map(|(_, value)| var(value))
                    .collect::<Result<Vec<_>, _>>()?;
                quote!(#entity { #(#names: #values,)* ..#base })
            }

            Expr::Select { map, key, lookup } => {
                let map = var(map)?;
                let key = var(key)?;
                match lookup {
                    Lookup::Indexed => quote! {
                        #map.get(&#key)
                            .cloned()
                            .map(|item| (::core::clone::Clone::clone(&#key), item))
                            .into_iter()
                            .collect::<::std::vec::Vec<_>>()
                    },
                    Lookup::Scan => quote! {
                        #map.iter()
                            .filter(|(id, _)| **id == #key)
                            .map(|(id, item)| {
                                (::core::clone::Clone::clone(id), ::core::clone::Clone::clone(item))
                            })
                            .collect::<::std::vec::Vec<_>>()
                    },
                }
            }

            Expr::BackRef {
                items,
                field,
                nullable,
                value,
            } => {
                let items = self.expr(items)?;
                let field = ident(field)?;
                let value = var(value)?;
                let owner = quote! {
                    ::core::convert::Into::into(::core::clone::Clone::clone(&#value))
                };
                let owner = if *nullable {
                    quote!(::core::option::Option::Some(#owner))
                } else {
                    owner
                };
                quote! {
                    #items
                        .into_iter()
                        .map(|(id, mut item)| {
                            item.#field = #owner;
                            (id, item)
                        })
                        .collect::<::std::vec::Vec<_>>()
                }
            }

            Expr::Take { acc, key } => {
                let acc = var(acc)?;
                let key = var(key)?;
                quote!(#acc.remove(&#key))
            }

            Expr::Values(v) => {
                let v = var(v)?;
                quote!(#v.into_values())
            }
        };

        Ok(tokens)
    }
}

fn ident(name: &str) -> Result<Ident, BuildError> {
    parse_str::<Ident>(name).map_err(|_| BuildError::InvalidPath(name.to_string()))
}

fn var(var: &Var) -> Result<Ident, BuildError> {
    ident(var.as_str())
}

fn path(ty: &TypeRef) -> Result<Path, BuildError> {
    parse_str::<Path>(ty.path()).map_err(|_| BuildError::InvalidPath(ty.to_string()))
}
