//! Metadata environment: the raw descriptor lists handed over by the front
//! end, plus the type queries the processors resolve relation targets with.

use crate::prelude::*;
use derive_more::Display;

///
/// ElementKind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ElementKind {
    #[display("type")]
    Type,
    #[display("field")]
    Field,
}

///
/// Element
///
/// One annotated symbol. The front end lists elements per annotation, so a
/// list meant for fields can still carry a type by mistake; converting with
/// `as_type`/`as_field` catches that.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Type(TypeElement),
    Field(FieldElement),
}

impl Element {
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Type(_) => ElementKind::Type,
            Self::Field(_) => ElementKind::Field,
        }
    }

    /// Human-readable identity used in diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Type(ty) => ty.qualified_name.to_string(),
            Self::Field(field) => format!("{}.{}", field.enclosing, field.name),
        }
    }

    pub fn as_type(&self) -> Result<&TypeElement, Error> {
        match self {
            Self::Type(ty) => Ok(ty),
            Self::Field(_) => Err(self.mismatch(ElementKind::Type)),
        }
    }

    pub fn as_field(&self) -> Result<&FieldElement, Error> {
        match self {
            Self::Field(field) => Ok(field),
            Self::Type(_) => Err(self.mismatch(ElementKind::Field)),
        }
    }

    fn mismatch(&self, expected: ElementKind) -> Error {
        Error::ElementKindMismatch {
            element: self.describe(),
            expected,
            found: self.kind(),
        }
    }
}

///
/// TypeElement
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TypeElement {
    pub qualified_name: TypeRef,

    /// Table name; defaults to the snake_case entity name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Names of the enclosed fields, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

///
/// FieldElement
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FieldElement {
    pub name: String,
    pub enclosing: TypeRef,
    pub ty: TypeDesc,

    #[serde(default)]
    pub annotations: Annotations,
}

impl FieldElement {
    /// Nullability from an explicit annotation, else from an `Option` wrapper.
    #[must_use]
    pub fn nullable(&self) -> bool {
        self.annotations
            .nullable
            .unwrap_or_else(|| self.ty.is_optional())
    }

    /// Column name from the annotation, else the field name.
    #[must_use]
    pub fn column_name(&self) -> &str {
        self.annotations.column.as_deref().unwrap_or(&self.name)
    }
}

///
/// Annotations
///
/// The subset of relational annotations the generator reads.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Annotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    /// Set on the inverse side: names the owning association on the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_table: Option<String>,

    /// Join alias for self-referential relations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

///
/// TypeDesc
///
/// Raw type of a field as written in the source model.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDesc {
    Scalar(Primitive),
    Named(TypeRef),
    Option(Box<TypeDesc>),
    List(Box<TypeDesc>),
    Set(Box<TypeDesc>),
}

impl TypeDesc {
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        matches!(self, Self::Option(_))
    }

    /// Scalar type of a plain column, looking through one `Option`.
    #[must_use]
    pub fn scalar(&self) -> Option<Primitive> {
        match self {
            Self::Scalar(prim) => Some(*prim),
            Self::Option(inner) => match inner.as_ref() {
                Self::Scalar(prim) => Some(*prim),
                _ => None,
            },
            _ => None,
        }
    }

    /// Generic argument of a wrapper type.
    #[must_use]
    pub fn type_argument(&self) -> Option<&Self> {
        match self {
            Self::Option(inner) | Self::List(inner) | Self::Set(inner) => Some(inner),
            Self::Scalar(_) | Self::Named(_) => None,
        }
    }
}

///
/// TypeEnvironment
///
/// Subtype / same-type queries over raw type descriptors.
///

pub trait TypeEnvironment {
    fn is_subtype(&self, ty: &TypeDesc, qualified_name: &str) -> bool;

    fn is_same_type(&self, ty: &TypeDesc, qualified_name: &str) -> bool;

    /// Entity type a relation field points at, following collection and
    /// `Option` wrappers down to a named type.
    fn relation_target<'a>(&self, ty: &'a TypeDesc) -> Option<&'a TypeRef> {
        let mut current = ty;
        loop {
            if self.is_subtype(current, COLLECTION) || self.is_same_type(current, OPTION) {
                current = current.type_argument()?;
                continue;
            }

            return match current {
                TypeDesc::Named(target) => Some(target),
                _ => None,
            };
        }
    }
}

/// Supertype of every collection wrapper.
pub const COLLECTION: &str = "core::iter::IntoIterator";

pub const OPTION: &str = "core::option::Option";
pub const VEC: &str = "std::vec::Vec";
pub const BTREE_SET: &str = "std::collections::BTreeSet";

///
/// StaticTypes
///
/// Type environment for the closed descriptor vocabulary: lists map to
/// `Vec`, sets to `BTreeSet`, and both are collections.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct StaticTypes;

impl TypeEnvironment for StaticTypes {
    fn is_subtype(&self, ty: &TypeDesc, qualified_name: &str) -> bool {
        match qualified_name {
            COLLECTION => matches!(ty, TypeDesc::List(_) | TypeDesc::Set(_)),
            _ => self.is_same_type(ty, qualified_name),
        }
    }

    fn is_same_type(&self, ty: &TypeDesc, qualified_name: &str) -> bool {
        match ty {
            TypeDesc::Option(_) => qualified_name == OPTION,
            TypeDesc::List(_) => qualified_name == VEC,
            TypeDesc::Set(_) => qualified_name == BTREE_SET,
            TypeDesc::Named(name) => name.path() == qualified_name,
            TypeDesc::Scalar(prim) => prim.to_string() == qualified_name,
        }
    }
}

///
/// AnnotationEnvironment
///
/// Everything one processing round reads, grouped by annotation.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotationEnvironment {
    pub entities: Vec<Element>,
    pub ids: Vec<Element>,
    pub gen_values: Vec<Element>,
    pub columns: Vec<Element>,
    pub one_to_one: Vec<Element>,
    pub one_to_many: Vec<Element>,
    pub many_to_one: Vec<Element>,
    pub many_to_many: Vec<Element>,
}

impl AnnotationEnvironment {
    pub fn from_json(source: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(path: &str) -> TypeDesc {
        TypeDesc::Named(TypeRef::new(path))
    }

    #[test]
    fn relation_target_follows_wrappers() {
        let types = StaticTypes;

        let list = TypeDesc::List(Box::new(named("app::Phone")));
        let opt = TypeDesc::Option(Box::new(named("app::Address")));
        let nested = TypeDesc::Option(Box::new(TypeDesc::Set(Box::new(named("app::Tag")))));

        assert_eq!(types.relation_target(&list).map(TypeRef::path), Some("app::Phone"));
        assert_eq!(types.relation_target(&opt).map(TypeRef::path), Some("app::Address"));
        assert_eq!(types.relation_target(&nested).map(TypeRef::path), Some("app::Tag"));
        assert_eq!(types.relation_target(&TypeDesc::Scalar(Primitive::Int64)), None);
    }

    #[test]
    fn collections_are_subtypes_but_not_same_type() {
        let types = StaticTypes;
        let list = TypeDesc::List(Box::new(named("app::Phone")));

        assert!(types.is_subtype(&list, COLLECTION));
        assert!(!types.is_same_type(&list, COLLECTION));
        assert!(types.is_same_type(&list, VEC));
    }

    #[test]
    fn wrong_element_kind_is_reported() {
        let element = Element::Type(TypeElement {
            qualified_name: TypeRef::new("app::Customer"),
            table: None,
            fields: vec![],
        });

        let err = element.as_field().expect_err("type is not a field");
        assert!(matches!(
            err,
            Error::ElementKindMismatch {
                expected: ElementKind::Field,
                found: ElementKind::Type,
                ..
            }
        ));
    }

    #[test]
    fn environment_reads_from_json() {
        let env = AnnotationEnvironment::from_json(
            r#"{
                "entities": [{ "kind": "type", "qualified_name": "app::Customer" }],
                "ids": [{
                    "kind": "field",
                    "name": "id",
                    "enclosing": "app::Customer",
                    "ty": { "scalar": "Int64" }
                }]
            }"#,
        )
        .expect("valid metadata");

        assert_eq!(env.entities.len(), 1);
        assert_eq!(env.ids[0].as_field().map(|f| f.name.as_str()).ok(), Some("id"));
        assert!(env.one_to_many.is_empty());
    }
}
