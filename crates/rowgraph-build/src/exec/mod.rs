//! Reference interpreter for mapping plans.
//!
//! Runs a plan directly over in-memory rows, producing `Record`s instead of
//! generated structs. Rendered functions and the interpreter share one plan,
//! so behaviour checked here is the behaviour the generated code has.

mod record;

pub use record::{Record, Slot};

use crate::plan::{Expr, MappingFn, Stmt, Var};
use record::typed;
use rowgraph_config_build::Lookup;
use rowgraph_core::{RootMap, Row, Value};
use rowgraph_schema::{node::EntityGraphs, types::TypeRef};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

type Roots = RootMap<Value, Record>;

///
/// ExecError
///

#[derive(Debug, ThisError)]
pub enum ExecError {
    #[error(transparent)]
    Schema(#[from] rowgraph_schema::Error),

    #[error("no mapping plan for '{0}'")]
    MissingPlan(TypeRef),

    #[error("no mapping function named '{0}'")]
    MissingFunction(String),

    #[error("variable '{0}' is not bound")]
    Unbound(Var),

    #[error("expected {expected} for {what}")]
    Mismatch { what: String, expected: &'static str },

    #[error("mapping '{0}' calls itself")]
    Recursion(String),

    #[error("mapping '{0}' finished without returning")]
    NoReturn(String),
}

///
/// Executor
///

pub struct Executor<'a> {
    graphs: &'a EntityGraphs,
    plans: BTreeMap<&'a str, &'a MappingFn>,
}

impl<'a> Executor<'a> {
    #[must_use]
    pub fn new(graphs: &'a EntityGraphs, plans: &'a [MappingFn]) -> Self {
        Self {
            graphs,
            plans: plans.iter().map(|plan| (plan.name.as_str(), plan)).collect(),
        }
    }

    /// Run `entity`'s mapping over `rows`.
    pub fn run<R: Row>(&self, entity: &TypeRef, rows: &[R]) -> Result<Roots, ExecError> {
        let plan = self
            .plans
            .values()
            .find(|plan| plan.entity == *entity)
            .ok_or_else(|| ExecError::MissingPlan(entity.clone()))?;

        self.call(plan, rows, &mut Vec::new())
    }

    /// Roots of `entity` in first-seen order.
    pub fn run_list<R: Row>(&self, entity: &TypeRef, rows: &[R]) -> Result<Vec<Record>, ExecError> {
        Ok(self.run(entity, rows)?.into_values().collect())
    }

    fn call<R: Row>(
        &self,
        plan: &MappingFn,
        rows: &[R],
        stack: &mut Vec<String>,
    ) -> Result<Roots, ExecError> {
        if stack.contains(&plan.name) {
            return Err(ExecError::Recursion(plan.name.clone()));
        }
        stack.push(plan.name.clone());

        let mut frame = Frame {
            rows,
            env: BTreeMap::new(),
        };
        let flow = self.block(&mut frame, &plan.body, stack)?;
        stack.pop();

        match flow {
            Flow::Return(roots) => Ok(roots),
            Flow::Next | Flow::Skip => Err(ExecError::NoReturn(plan.name.clone())),
        }
    }

    fn block<R: Row>(
        &self,
        frame: &mut Frame<'_, R>,
        stmts: &[Stmt],
        stack: &mut Vec<String>,
    ) -> Result<Flow, ExecError> {
        for stmt in stmts {
            match self.stmt(frame, stmt, stack)? {
                Flow::Next => {}
                flow => return Ok(flow),
            }
        }

        Ok(Flow::Next)
    }

    fn stmt<R: Row>(
        &self,
        frame: &mut Frame<'_, R>,
        stmt: &Stmt,
        stack: &mut Vec<String>,
    ) -> Result<Flow, ExecError> {
        match stmt {
            Stmt::Let { var, value } => {
                let value = self.expr(frame, value, stack)?;
                frame.env.insert(var.clone(), value);
            }

            Stmt::LetOrSkip { var, value } => match self.expr(frame, value, stack)? {
                Val::Opt(Some(value)) => {
                    frame.env.insert(var.clone(), *value);
                }
                Val::Opt(None) => return Ok(Flow::Skip),
                _ => return Err(mismatch(var, "an optional value")),
            },

            Stmt::IfSome { var, value, body } => match self.expr(frame, value, stack)? {
                Val::Opt(Some(value)) => {
                    frame.env.insert(var.clone(), *value);
                    match self.block(frame, body, stack)? {
                        Flow::Next => {}
                        flow => return Ok(flow),
                    }
                }
                Val::Opt(None) => {}
                _ => return Err(mismatch(var, "an optional value")),
            },

            Stmt::ForEachRow { row, body } => {
                for index in 0..frame.rows.len() {
                    frame.env.insert(row.clone(), Val::Row(index));
                    if let Flow::Return(roots) = self.block(frame, body, stack)? {
                        return Ok(Flow::Return(roots));
                    }
                }
            }

            Stmt::ForEachRoot {
                map,
                key,
                value,
                body,
            } => {
                let mut roots = match frame.take(map)? {
                    Val::Roots(roots) => roots,
                    _ => return Err(mismatch(map, "a root map")),
                };

                for (id, root) in roots.iter_mut() {
                    frame.env.insert(key.clone(), Val::Key(id.clone()));
                    frame.env.insert(value.clone(), Val::Record(root.clone()));

                    let flow = self.block(frame, body, stack)?;
                    *root = frame.take_record(value)?;

                    if let Flow::Return(_) = flow {
                        return Ok(flow);
                    }
                }

                frame.env.insert(map.clone(), Val::Roots(roots));
            }

            Stmt::Insert { map, key, value } => {
                let Val::Record(record) = self.expr(frame, value, stack)? else {
                    return Err(mismatch(map, "an entity to insert"));
                };
                let key = frame.key(key)?.clone();
                frame.roots_mut(map)?.insert(key, record);
            }

            Stmt::Union { acc, key, items } => {
                let items = self.items(frame, items, stack)?;
                let key = frame.key(key)?.clone();
                frame.acc_mut(acc)?.entry(key).or_default().extend(items);
            }

            Stmt::Extend {
                target,
                field,
                items,
            } => {
                let items = self.items(frame, items, stack)?;
                frame
                    .record_mut(target)?
                    .extend_many(field, items.into_iter().map(|(_, record)| record));
            }

            Stmt::Return(var) => match frame.take(var)? {
                Val::Roots(roots) => return Ok(Flow::Return(roots)),
                _ => return Err(mismatch(var, "a root map")),
            },
        }

        Ok(Flow::Next)
    }

    fn items<R: Row>(
        &self,
        frame: &mut Frame<'_, R>,
        expr: &Expr,
        stack: &mut Vec<String>,
    ) -> Result<Vec<(Value, Record)>, ExecError> {
        match self.expr(frame, expr, stack)? {
            Val::Items(items) => Ok(items),
            _ => Err(ExecError::Mismatch {
                what: format!("{expr:?}"),
                expected: "keyed entities",
            }),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn expr<R: Row>(
        &self,
        frame: &mut Frame<'_, R>,
        expr: &Expr,
        stack: &mut Vec<String>,
    ) -> Result<Val, ExecError> {
        let val = match expr {
            Expr::Var(var) => frame.get(var)?.clone(),

            Expr::NewRootMap { .. } => Val::Roots(RootMap::new()),
            Expr::NewAccumulator { .. } => Val::Acc(BTreeMap::new()),

            Expr::CallMapping { function, .. } => {
                let plan = self
                    .plans
                    .get(function.as_str())
                    .ok_or_else(|| ExecError::MissingFunction(function.clone()))?;

                Val::Roots(self.call(plan, frame.rows, stack)?)
            }

            Expr::ReadId { row, column, ty } => {
                let row = frame.row(row)?;
                let id = row
                    .value(&column.table, &column.column)
                    .and_then(|value| typed(value, *ty));

                Val::Opt(id.map(|id| Box::new(Val::Key(id))))
            }

            Expr::Decode { row, entity } => {
                let entity = self.graphs.resolve(entity)?;

                Val::Record(Record::decode(entity, frame.row(row)?))
            }

            Expr::GetRoot { map, key } => {
                let root = frame.roots(map)?.get(frame.key(key)?).cloned();

                Val::Opt(root.map(|root| Box::new(Val::Record(root))))
            }

            Expr::UnwrapOrElse { value, fallback } => match self.expr(frame, value, stack)? {
                Val::Opt(Some(value)) => *value,
                Val::Opt(None) => self.expr(frame, fallback, stack)?,
                _ => return Err(expr_mismatch(value, "an optional value")),
            },

            Expr::IsPresent(inner) => match self.expr(frame, inner, stack)? {
                Val::Opt(value) => Val::Bool(value.is_some()),
                _ => return Err(expr_mismatch(inner, "an optional value")),
            },

            Expr::IfElse {
                cond,
                then,
                otherwise,
            } => match self.expr(frame, cond, stack)? {
                Val::Bool(true) => self.expr(frame, then, stack)?,
                Val::Bool(false) => self.expr(frame, otherwise, stack)?,
                _ => return Err(expr_mismatch(cond, "a condition")),
            },

            Expr::Some(inner) => Val::Opt(Some(Box::new(self.expr(frame, inner, stack)?))),
            Expr::None => Val::Opt(None),
            Expr::Into(inner) => self.expr(frame, inner, stack)?,

            Expr::Embed { base, fields, .. } => {
                let mut record = frame.record(base)?.clone();
                for (field, var) in fields {
                    let slot = match frame.get(var)? {
                        Val::Record(target) => Slot::One(Some(Box::new(target.clone()))),
                        Val::Opt(None) => Slot::One(None),
                        Val::Opt(Some(inner)) => match inner.as_ref() {
                            Val::Record(target) => Slot::One(Some(Box::new(target.clone()))),
                            _ => return Err(mismatch(var, "an entity")),
                        },
                        _ => return Err(mismatch(var, "an entity")),
                    };
                    record.set(field, slot);
                }

                Val::Record(record)
            }

            Expr::Select { map, key, lookup } => {
                let roots = frame.roots(map)?;
                let key = frame.key(key)?;
                let items = match lookup {
                    Lookup::Indexed => roots
                        .get(key)
                        .cloned()
                        .map(|item| (key.clone(), item))
                        .into_iter()
                        .collect(),
                    Lookup::Scan => roots
                        .iter()
                        .filter(|(id, _)| *id == key)
                        .map(|(id, item)| (id.clone(), item.clone()))
                        .collect(),
                };

                Val::Items(items)
            }

            Expr::BackRef {
                items,
                field,
                value,
                ..
            } => {
                let mut items = self.items(frame, items, stack)?;
                let owner = frame.record(value)?;
                for (_, item) in &mut items {
                    item.set(field, Slot::One(Some(Box::new(owner.clone()))));
                }

                Val::Items(items)
            }

            Expr::Take { acc, key } => {
                let key = frame.key(key)?.clone();
                let items = frame.acc_mut(acc)?.remove(&key);

                Val::Opt(items.map(|set| Box::new(Val::Items(set.into_iter().collect()))))
            }

            Expr::Values(var) => match frame.get(var)? {
                Val::Items(items) => Val::Items(items.clone()),
                _ => return Err(mismatch(var, "keyed entities")),
            },
        };

        Ok(val)
    }
}

///
/// Flow
///

enum Flow {
    Next,
    Skip,
    Return(Roots),
}

///
/// Val
/// Runtime value of a plan local.
///

#[derive(Clone, Debug)]
enum Val {
    Acc(BTreeMap<Value, Roots>),
    Bool(bool),
    Items(Vec<(Value, Record)>),
    Key(Value),
    Opt(Option<Box<Val>>),
    Record(Record),
    Roots(Roots),
    Row(usize),
}

///
/// Frame
///

struct Frame<'r, R> {
    rows: &'r [R],
    env: BTreeMap<Var, Val>,
}

impl<'r, R: Row> Frame<'r, R> {
    fn get(&self, var: &Var) -> Result<&Val, ExecError> {
        self.env
            .get(var)
            .ok_or_else(|| ExecError::Unbound(var.clone()))
    }

    fn get_mut(&mut self, var: &Var) -> Result<&mut Val, ExecError> {
        self.env
            .get_mut(var)
            .ok_or_else(|| ExecError::Unbound(var.clone()))
    }

    fn take(&mut self, var: &Var) -> Result<Val, ExecError> {
        self.env
            .remove(var)
            .ok_or_else(|| ExecError::Unbound(var.clone()))
    }

    fn take_record(&mut self, var: &Var) -> Result<Record, ExecError> {
        match self.take(var)? {
            Val::Record(record) => Ok(record),
            _ => Err(mismatch(var, "an entity")),
        }
    }

    fn row(&self, var: &Var) -> Result<&'r R, ExecError> {
        match self.get(var)? {
            Val::Row(index) => self
                .rows
                .get(*index)
                .ok_or_else(|| mismatch(var, "a row in range")),
            _ => Err(mismatch(var, "a row")),
        }
    }

    fn key(&self, var: &Var) -> Result<&Value, ExecError> {
        match self.get(var)? {
            Val::Key(key) => Ok(key),
            _ => Err(mismatch(var, "an id")),
        }
    }

    fn record(&self, var: &Var) -> Result<&Record, ExecError> {
        match self.get(var)? {
            Val::Record(record) => Ok(record),
            _ => Err(mismatch(var, "an entity")),
        }
    }

    fn record_mut(&mut self, var: &Var) -> Result<&mut Record, ExecError> {
        match self.get_mut(var)? {
            Val::Record(record) => Ok(record),
            _ => Err(mismatch(var, "an entity")),
        }
    }

    fn roots(&self, var: &Var) -> Result<&Roots, ExecError> {
        match self.get(var)? {
            Val::Roots(roots) => Ok(roots),
            _ => Err(mismatch(var, "a root map")),
        }
    }

    fn roots_mut(&mut self, var: &Var) -> Result<&mut Roots, ExecError> {
        match self.get_mut(var)? {
            Val::Roots(roots) => Ok(roots),
            _ => Err(mismatch(var, "a root map")),
        }
    }

    fn acc_mut(&mut self, var: &Var) -> Result<&mut BTreeMap<Value, Roots>, ExecError> {
        match self.get_mut(var)? {
            Val::Acc(acc) => Ok(acc),
            _ => Err(mismatch(var, "an accumulator")),
        }
    }
}

fn mismatch(var: &Var, expected: &'static str) -> ExecError {
    ExecError::Mismatch {
        what: format!("variable '{var}'"),
        expected,
    }
}

fn expr_mismatch(expr: &Expr, expected: &'static str) -> ExecError {
    ExecError::Mismatch {
        what: format!("{expr:?}"),
        expected,
    }
}
