//! Entities mapped by the functions `build.rs` generates from
//! `metadata.json`, compiled into this crate and exercised by its tests.

pub mod model;

pub mod mappings {
    include!(concat!(env!("OUT_DIR"), "/mappings.rs"));
}

#[cfg(test)]
mod test;
