use crate::error::HandleError;
use std::any::{type_name, Any, TypeId};

/// A container for type-erased values that preserves type information
pub(crate) struct AnyValue {
    type_id: TypeId,
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

impl AnyValue {
    /// Create a new AnyValue from a value of any type that implements Any, Send, and Sync
    pub(crate) fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            value: Box::new(value),
        }
    }

    /// Check if the contained value is of type T
    pub(crate) fn is_type<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub(crate) fn mismatch<T>(&self) -> HandleError {
        HandleError::TypeCast {
            expected: type_name::<T>(),
            found: self.type_name,
        }
    }

    /// Get a reference to the contained value, or a `TypeCast` error
    pub(crate) fn downcast_ref<T: 'static>(&self) -> Result<&T, HandleError> {
        self.value.downcast_ref::<T>().ok_or_else(|| self.mismatch::<T>())
    }

    /// Get a mutable reference to the contained value, or a `TypeCast` error
    pub(crate) fn downcast_mut<T: 'static>(&mut self) -> Result<&mut T, HandleError> {
        let err = self.mismatch::<T>();
        self.value.downcast_mut::<T>().ok_or(err)
    }
}

impl std::fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_matching_type() {
        let mut value = AnyValue::new(42i32);
        assert!(value.is_type::<i32>());
        assert_eq!(value.downcast_ref::<i32>(), Ok(&42));

        *value.downcast_mut::<i32>().unwrap() = 7;
        assert_eq!(value.downcast_ref::<i32>(), Ok(&7));
    }

    #[test]
    fn test_downcast_reports_both_types() {
        let value = AnyValue::new("hello".to_string());
        assert!(!value.is_type::<i32>());

        match value.downcast_ref::<i32>() {
            Err(HandleError::TypeCast { expected, found }) => {
                assert_eq!(expected, "i32");
                assert_eq!(found, type_name::<String>());
            }
            other => panic!("expected TypeCast, got {:?}", other),
        }
    }
}
