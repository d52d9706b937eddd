//! Tests for error types

use prometheus_active_executions::core::{
    AdmissionError, ConcurrencyClass, ExecutionStatus, RegistryError, StoreError,
};

#[test]
fn test_not_found_error() {
    let err = RegistryError::NotFound("e1".to_string());
    assert_eq!(format!("{}", err), "execution not found: e1");
}

#[test]
fn test_invalid_transition_error() {
    let err = RegistryError::InvalidTransition {
        id: "e1".to_string(),
        from: ExecutionStatus::Finished,
        to: ExecutionStatus::Running,
    };
    assert_eq!(
        format!("{}", err),
        "execution e1: invalid status transition finished -> running"
    );
}

#[test]
fn test_duplicate_admission_error() {
    let err = AdmissionError::Duplicate {
        id: "e1".to_string(),
        class: ConcurrencyClass::Manual,
    };
    assert_eq!(
        format!("{}", err),
        "execution e1 is already queued or admitted in class manual"
    );
}

#[test]
fn test_admission_error_is_transparent() {
    let err: RegistryError = AdmissionError::Duplicate {
        id: "e1".to_string(),
        class: ConcurrencyClass::Other,
    }
    .into();
    assert!(matches!(err, RegistryError::Admission(_)));
    assert_eq!(
        format!("{}", err),
        "execution e1 is already queued or admitted in class other"
    );
}

#[test]
fn test_backend_error() {
    let err: StoreError = anyhow::anyhow!("connection failed").into();
    assert_eq!(format!("{}", err), "store backend error: connection failed");
    let err: RegistryError = err.into();
    assert!(matches!(err, RegistryError::Store(StoreError::Backend(_))));
}
