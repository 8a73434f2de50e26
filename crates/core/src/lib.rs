#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # DTR Core
//!
//! Element model shared by every DTR crate.
//!
//! ## Key Components
//!
//! - **Kinds**: [`ElementKind`] and its fixed inheritance chain
//! - **Entities**: [`AtomicDataType`], [`TypeProfile`], [`Attribute`], [`Operation`]
//!   and the closed sum type [`VisitableElement`]
//! - **Dispatch**: [`ElementVisitor`] / [`Visitable`] double dispatch
//! - **Identifiers**: [`RuleId`], the validated rule name
//!
//! ## Usage
//!
//! ```rust
//! use dtr_core::{ElementKind, TypeProfile, VisitableElement};
//!
//! let element: VisitableElement = TypeProfile::new("21.T/p1", "Person").into();
//! assert_eq!(element.kind(), ElementKind::TypeProfile);
//! assert!(element.kind().is_subtype_of(ElementKind::DataType));
//! ```

pub mod kind;
pub mod model;
pub mod visit;

mod keys;

pub use keys::{RuleId, RuleIdError};
pub use kind::ElementKind;
pub use model::{AtomicDataType, Attribute, Operation, PrimitiveType, TypeProfile, VisitableElement};
pub use visit::{ElementVisitor, Visitable};
