use rowgraph::{FromRow, Row};

///
/// Label
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Label {
    pub id: i64,
    pub text: String,
}

impl FromRow for Label {
    fn from_row<R: Row + ?Sized>(row: &R) -> Self {
        Self {
            id: row.get("label", "id").unwrap_or_default(),
            text: row.get("label", "text").unwrap_or_default(),
        }
    }
}

///
/// Category
/// Self-referential tree: `children` are read through the
/// `category_children` alias, `parent` is filled from the parent side.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Category {
    pub id: u32,
    pub name: String,
    pub parent: Option<Box<Self>>,
    pub children: Vec<Self>,
}

impl FromRow for Category {
    fn from_row<R: Row + ?Sized>(row: &R) -> Self {
        Self {
            id: row.get("category", "id").unwrap_or_default(),
            name: row.get("category", "name").unwrap_or_default(),
            ..Self::default()
        }
    }
}

pub mod shop {
    use super::*;

    ///
    /// Customer
    ///

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Customer {
        pub id: i64,
        pub name: String,
        pub address: Option<Address>,
        pub phones: Vec<Phone>,
    }

    impl FromRow for Customer {
        fn from_row<R: Row + ?Sized>(row: &R) -> Self {
            Self {
                id: row.get("customer", "id").unwrap_or_default(),
                name: row.get("customer", "name").unwrap_or_default(),
                ..Self::default()
            }
        }
    }

    ///
    /// Address
    ///

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Address {
        pub id: i64,
        pub city: String,
    }

    impl FromRow for Address {
        fn from_row<R: Row + ?Sized>(row: &R) -> Self {
            Self {
                id: row.get("address", "id").unwrap_or_default(),
                city: row.get("address", "city").unwrap_or_default(),
            }
        }
    }

    ///
    /// Phone
    ///

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Phone {
        pub id: i64,
        pub number: String,
        pub customer: Option<Box<Customer>>,
    }

    impl FromRow for Phone {
        fn from_row<R: Row + ?Sized>(row: &R) -> Self {
            Self {
                id: row.get("phone", "id").unwrap_or_default(),
                number: row.get("phone", "number").unwrap_or_default(),
                customer: None,
            }
        }
    }

    ///
    /// Order
    /// Both relations are required, so they are embedded without an id check.
    ///

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Order {
        pub id: i64,
        pub customer: Customer,
        pub receipt: Receipt,
    }

    impl FromRow for Order {
        fn from_row<R: Row + ?Sized>(row: &R) -> Self {
            Self {
                id: row.get("order", "id").unwrap_or_default(),
                ..Self::default()
            }
        }
    }

    ///
    /// Receipt
    ///

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Receipt {
        pub id: i64,
        pub total: i64,
    }

    impl FromRow for Receipt {
        fn from_row<R: Row + ?Sized>(row: &R) -> Self {
            Self {
                id: row.get("receipt", "id").unwrap_or_default(),
                total: row.get("receipt", "total").unwrap_or_default(),
            }
        }
    }
}

pub mod blog {
    use super::*;

    ///
    /// Post
    ///

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Post {
        pub id: i64,
        pub title: String,
        pub tags: Vec<Tag>,
    }

    impl FromRow for Post {
        fn from_row<R: Row + ?Sized>(row: &R) -> Self {
            Self {
                id: row.get("post", "id").unwrap_or_default(),
                title: row.get("post", "title").unwrap_or_default(),
                tags: Vec::new(),
            }
        }
    }

    ///
    /// Tag
    ///

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Tag {
        pub id: i64,
        pub name: String,
    }

    impl FromRow for Tag {
        fn from_row<R: Row + ?Sized>(row: &R) -> Self {
            Self {
                id: row.get("tag", "id").unwrap_or_default(),
                name: row.get("tag", "name").unwrap_or_default(),
            }
        }
    }
}
