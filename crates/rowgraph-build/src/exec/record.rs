use rowgraph_core::{FromValue, Row, Value};
use rowgraph_schema::{
    node::EntityDefinition,
    types::{Primitive, TypeRef},
};
use std::collections::BTreeMap;

///
/// Record
///
/// Dynamic stand-in for a generated entity struct: id, plain columns and
/// relation slots by field name.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    pub entity: TypeRef,
    pub id: Value,
    fields: BTreeMap<String, Slot>,
}

///
/// Slot
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Slot {
    Value(Value),
    One(Option<Box<Record>>),
    Many(Vec<Record>),
}

impl Record {
    /// Plain-column decode: relation slots start empty.
    pub fn decode<R: Row + ?Sized>(entity: &EntityDefinition, row: &R) -> Self {
        let read = |column: &str, ty: Primitive| {
            row.value(&entity.table, column)
                .and_then(|value| typed(value, ty))
                .unwrap_or_default()
        };

        let mut fields = BTreeMap::new();
        let id = read(&entity.id.column, entity.id.ty);
        fields.insert(entity.id.name.clone(), Slot::Value(id.clone()));

        for column in &entity.columns {
            fields.insert(
                column.name.clone(),
                Slot::Value(read(&column.column, column.ty)),
            );
        }

        for association in &entity.associations {
            let slot = if association.kind.is_to_many() {
                Slot::Many(Vec::new())
            } else {
                Slot::One(None)
            };
            fields.insert(association.name.clone(), slot);
        }

        Self {
            entity: entity.ty.clone(),
            id,
            fields,
        }
    }

    /// Plain column (or id) value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self.fields.get(field)? {
            Slot::Value(value) => Some(value),
            _ => None,
        }
    }

    /// To-one relation target, if set.
    #[must_use]
    pub fn one(&self, field: &str) -> Option<&Self> {
        match self.fields.get(field)? {
            Slot::One(record) => record.as_deref(),
            _ => None,
        }
    }

    /// To-many relation targets, in insertion order.
    #[must_use]
    pub fn many(&self, field: &str) -> &[Self] {
        match self.fields.get(field) {
            Some(Slot::Many(records)) => records,
            _ => &[],
        }
    }

    /// Ids of a to-many relation's targets.
    #[must_use]
    pub fn many_ids(&self, field: &str) -> Vec<&Value> {
        self.many(field).iter().map(|record| &record.id).collect()
    }

    pub(crate) fn set(&mut self, field: &str, slot: Slot) {
        self.fields.insert(field.to_string(), slot);
    }

    pub(crate) fn extend_many(&mut self, field: &str, records: impl IntoIterator<Item = Self>) {
        match self.fields.get_mut(field) {
            Some(Slot::Many(existing)) => existing.extend(records),
            _ => {
                self.fields
                    .insert(field.to_string(), Slot::Many(records.into_iter().collect()));
            }
        }
    }
}

// typed
// a cell read as `ty`, normalised the way the typed generated getter reads it
pub(crate) fn typed(value: &Value, ty: Primitive) -> Option<Value> {
    if value.is_null() {
        return None;
    }

    match ty {
        Primitive::Blob => Vec::<u8>::from_value(value).map(Value::Blob),
        Primitive::Bool => bool::from_value(value).map(Value::Bool),
        Primitive::Int8 => i8::from_value(value).map(|v| Value::Int(v.into())),
        Primitive::Int16 => i16::from_value(value).map(|v| Value::Int(v.into())),
        Primitive::Int32 => i32::from_value(value).map(|v| Value::Int(v.into())),
        Primitive::Int64 => i64::from_value(value).map(Value::Int),
        Primitive::Nat8 => u8::from_value(value).map(|v| Value::Uint(v.into())),
        Primitive::Nat16 => u16::from_value(value).map(|v| Value::Uint(v.into())),
        Primitive::Nat32 => u32::from_value(value).map(|v| Value::Uint(v.into())),
        Primitive::Nat64 => u64::from_value(value).map(Value::Uint),
        Primitive::Text => String::from_value(value).map(Value::Text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowgraph_core::MemRow;
    use rowgraph_schema::node::{
        AssociationDefinition, AssociationKind, ColumnDefinition, IdDefinition,
    };

    #[test]
    fn decode_reads_own_table_only() {
        let mut entity = EntityDefinition::new(
            TypeRef::new("app::Customer"),
            IdDefinition::new("id", Primitive::Nat32),
        );
        entity.columns.push(ColumnDefinition {
            name: "name".into(),
            column: "name".into(),
            ty: Primitive::Text,
            nullable: false,
        });
        entity.add_association(AssociationDefinition::new(
            "phones",
            AssociationKind::OneToMany,
            TypeRef::new("app::Phone"),
        ));

        let row = MemRow::new()
            .with("customer", "id", 7_i64)
            .with("customer", "name", "Ada")
            .with("phone", "name", "ignored");
        let record = Record::decode(&entity, &row);

        assert_eq!(record.id, Value::Uint(7), "id is read as its declared type");
        assert_eq!(record.get("name"), Some(&Value::from("Ada")));
        assert!(record.many("phones").is_empty());
    }

    #[test]
    fn typed_rejects_out_of_range() {
        assert_eq!(typed(&Value::Int(-1), Primitive::Nat8), None);
        assert_eq!(typed(&Value::Uint(5), Primitive::Int16), Some(Value::Int(5)));
        assert_eq!(typed(&Value::Null, Primitive::Text), None);
    }
}
