#![doc(test(attr(deny(warnings))))]

//! Contains the mutable quad store used while serializing with
//! [Pretty Turtle](https://docs.rs/pretty-turtle/).

pub mod memory;
