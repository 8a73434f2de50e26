//! Double dispatch over the closed element variant set.
//!
//! Every visitor must handle every concrete variant: adding a variant to
//! [`VisitableElement`] breaks each implementation until it is handled.

use crate::kind::ElementKind;
use crate::model::{AtomicDataType, Attribute, Operation, TypeProfile, VisitableElement};

/// Variant-specific operation over registry elements.
pub trait ElementVisitor {
    /// Result of visiting one element.
    type Output;

    /// Handle an atomic data type.
    fn visit_atomic_data_type(&self, element: &AtomicDataType) -> Self::Output;

    /// Handle a type profile.
    fn visit_type_profile(&self, element: &TypeProfile) -> Self::Output;

    /// Handle an attribute.
    fn visit_attribute(&self, element: &Attribute) -> Self::Output;

    /// Handle an operation.
    fn visit_operation(&self, element: &Operation) -> Self::Output;
}

/// An element that routes a visitor to its variant-specific method.
pub trait Visitable {
    /// Concrete kind of this element.
    fn element_kind(&self) -> ElementKind;

    /// Dispatch to the matching `visit_*` method of `visitor`.
    fn accept<V: ElementVisitor + ?Sized>(&self, visitor: &V) -> V::Output;
}

impl Visitable for AtomicDataType {
    fn element_kind(&self) -> ElementKind {
        ElementKind::AtomicDataType
    }

    fn accept<V: ElementVisitor + ?Sized>(&self, visitor: &V) -> V::Output {
        visitor.visit_atomic_data_type(self)
    }
}

impl Visitable for TypeProfile {
    fn element_kind(&self) -> ElementKind {
        ElementKind::TypeProfile
    }

    fn accept<V: ElementVisitor + ?Sized>(&self, visitor: &V) -> V::Output {
        visitor.visit_type_profile(self)
    }
}

impl Visitable for Attribute {
    fn element_kind(&self) -> ElementKind {
        ElementKind::Attribute
    }

    fn accept<V: ElementVisitor + ?Sized>(&self, visitor: &V) -> V::Output {
        visitor.visit_attribute(self)
    }
}

impl Visitable for Operation {
    fn element_kind(&self) -> ElementKind {
        ElementKind::Operation
    }

    fn accept<V: ElementVisitor + ?Sized>(&self, visitor: &V) -> V::Output {
        visitor.visit_operation(self)
    }
}

impl Visitable for VisitableElement {
    fn element_kind(&self) -> ElementKind {
        self.kind()
    }

    fn accept<V: ElementVisitor + ?Sized>(&self, visitor: &V) -> V::Output {
        match self {
            Self::AtomicDataType(e) => e.accept(visitor),
            Self::TypeProfile(e) => e.accept(visitor),
            Self::Attribute(e) => e.accept(visitor),
            Self::Operation(e) => e.accept(visitor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PrimitiveType;

    struct Describe;

    impl ElementVisitor for Describe {
        type Output = String;

        fn visit_atomic_data_type(&self, element: &AtomicDataType) -> String {
            format!("atomic {} of {}", element.name, element.base_type)
        }

        fn visit_type_profile(&self, element: &TypeProfile) -> String {
            format!("profile {} with {} attributes", element.name, element.attributes.len())
        }

        fn visit_attribute(&self, element: &Attribute) -> String {
            format!("attribute {}", element.name)
        }

        fn visit_operation(&self, element: &Operation) -> String {
            format!("operation {}", element.name)
        }
    }

    #[test]
    fn dispatches_on_variant() {
        let elements: Vec<VisitableElement> = vec![
            AtomicDataType::new("a", "Age", PrimitiveType::Integer).into(),
            TypeProfile::new("p", "Person")
                .with_attribute(Attribute::new("x", "age", "a"))
                .into(),
            Attribute::new("x", "age", "a").into(),
            Operation::new("o", "Resolve").into(),
        ];

        let described: Vec<String> = elements.iter().map(|e| e.accept(&Describe)).collect();
        assert_eq!(
            described,
            vec![
                "atomic Age of integer",
                "profile Person with 1 attributes",
                "attribute age",
                "operation Resolve",
            ]
        );
    }

    #[test]
    fn element_kind_matches_variant() {
        let profile = TypeProfile::new("p", "P");
        assert_eq!(profile.element_kind(), ElementKind::TypeProfile);
        let element = VisitableElement::from(profile);
        assert_eq!(element.element_kind(), element.kind());
    }

    #[test]
    fn works_through_trait_object() {
        let visitor: &dyn ElementVisitor<Output = String> = &Describe;
        let element: VisitableElement = Operation::new("o", "Run").into();
        assert_eq!(element.accept(visitor), "operation Run");
    }
}
